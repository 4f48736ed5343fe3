// Print and export views of a trip
// Both are pure projections of the model: nothing here mutates the trip

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write;
use thiserror::Error;

use crate::format::format_currency;
use crate::itinerary::Trip;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("XML serialization error: {0}")]
    XmlError(String),
}

/// Plain-text itinerary for printing.
pub fn render_text(trip: &Trip) -> String {
    let currency = trip.currency();
    let totals = trip.totals();
    let mut out = String::new();

    let travelers = match trip.travelers() {
        1 => "1 traveler".to_string(),
        n => format!("{} travelers", n),
    };
    // Writing to a String cannot fail
    let _ = writeln!(out, "Itinerary ({}, {})", travelers, currency);

    for (i, day) in trip.days().iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Day {} ({})",
            i + 1,
            format_currency(totals.day_totals[i], currency)
        );
        if day.activities.is_empty() {
            let _ = writeln!(out, "  (no activities)");
        }
        for activity in &day.activities {
            let _ = writeln!(
                out,
                "  - {}: {} per traveler",
                activity.title,
                format_currency(activity.cost_per_traveler, currency)
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Per-day subtotal: {}",
        format_currency(totals.per_day_subtotal, currency)
    );
    let _ = writeln!(
        out,
        "Trip total: {}",
        format_currency(totals.trip_total, currency)
    );
    out
}

#[derive(Debug, Serialize)]
#[serde(rename = "Itinerary")]
struct XmlItinerary {
    #[serde(rename = "@currency")]
    currency: String,
    #[serde(rename = "@travelers")]
    travelers: u32,
    #[serde(rename = "@generatedAt")]
    generated_at: String,
    #[serde(rename = "Day")]
    days: Vec<XmlDay>,
    #[serde(rename = "Totals")]
    totals: XmlTotals,
}

#[derive(Debug, Serialize)]
struct XmlDay {
    #[serde(rename = "@index")]
    index: usize,
    #[serde(rename = "@total")]
    total: String,
    #[serde(rename = "Activity")]
    activities: Vec<XmlActivity>,
}

#[derive(Debug, Serialize)]
struct XmlActivity {
    #[serde(rename = "@title")]
    title: String,
    #[serde(rename = "@cost")]
    cost: String,
}

#[derive(Debug, Serialize)]
struct XmlTotals {
    #[serde(rename = "@perDaySubtotal")]
    per_day_subtotal: String,
    #[serde(rename = "@tripTotal")]
    trip_total: String,
}

/// XML export of the trip. Amounts are plain numbers in the trip currency.
pub fn to_xml(trip: &Trip, generated_at: DateTime<Utc>) -> Result<String, ExportError> {
    let totals = trip.totals();
    let document = XmlItinerary {
        currency: trip.currency().code().to_string(),
        travelers: trip.travelers(),
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        days: trip
            .days()
            .iter()
            .enumerate()
            .map(|(i, day)| XmlDay {
                index: i + 1,
                total: totals.day_totals[i].to_string(),
                activities: day
                    .activities
                    .iter()
                    .map(|a| XmlActivity {
                        title: a.title.clone(),
                        cost: a.cost_per_traveler.to_string(),
                    })
                    .collect(),
            })
            .collect(),
        totals: XmlTotals {
            per_day_subtotal: totals.per_day_subtotal.to_string(),
            trip_total: totals.trip_total.to_string(),
        },
    };

    quick_xml::se::to_string(&document).map_err(|e| ExportError::XmlError(e.to_string()))
}
