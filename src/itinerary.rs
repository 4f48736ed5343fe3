// Itinerary store: an ordered list of days, each an ordered list of activities
// Totals are recomputed from the model on demand, and the whole trip round-trips
// through a plain snapshot that is what gets persisted or loaded from a template

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::templates::load_template;

// Largest integer an f64 holds exactly
const MAX_EXACT_WHOLE: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
        }
    }

    // Unknown or blank codes fall back to INR
    pub fn from_code_or_default(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported currency code: {0}")]
pub struct ParseCurrencyError(pub String);

impl FromStr for Currency {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            "USD" => Ok(Currency::Usd),
            _ => Err(ParseCurrencyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub title: String,
    pub cost_per_traveler: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Day {
    pub activities: Vec<Activity>,
}

impl Day {
    // Sum of per-traveler costs, before multiplying by the traveler count
    pub fn cost_per_traveler(&self) -> f64 {
        // fold from +0.0: an empty f64 sum is -0.0
        self.activities
            .iter()
            .fold(0.0, |acc, a| acc + a.cost_per_traveler)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub day_totals: Vec<f64>,
    pub per_day_subtotal: f64,
    pub trip_total: f64,
    pub currency: Currency,
}

/// Owned itinerary state. Every mutation goes through a method so the
/// "at least one day" and "travelers >= 1" invariants hold at all times.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    travelers: u32,
    currency: Currency,
    days: Vec<Day>,
}

impl Default for Trip {
    fn default() -> Self {
        Self::new(1, Currency::default())
    }
}

impl Trip {
    pub fn new(travelers: u32, currency: Currency) -> Self {
        Self {
            travelers: travelers.max(1),
            currency,
            days: vec![Day::default()],
        }
    }

    pub fn travelers(&self) -> u32 {
        self.travelers
    }

    // Raw input from a form field; anything unusable becomes 1
    pub fn set_travelers(&mut self, raw: f64) {
        self.travelers = coerce_travelers(raw);
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    // 1-based, matching the display index
    pub fn day(&self, day_index: usize) -> Option<&Day> {
        day_index.checked_sub(1).and_then(|i| self.days.get(i))
    }

    /// Appends an empty day and returns its 1-based index.
    pub fn add_day(&mut self) -> usize {
        self.days.push(Day::default());
        self.days.len()
    }

    pub fn ensure_day_exists(&mut self, day_count: usize) {
        while self.days.len() < day_count {
            self.add_day();
        }
    }

    /// Appends an activity to the given day, creating missing days first.
    ///
    /// A day index of 0 is treated as day 1. Blank titles become
    /// "Activity N" where N is the activity's position in its day, and a
    /// cost that is negative or not finite becomes 0. Returns the 1-based
    /// position of the new activity.
    pub fn add_activity(&mut self, day_index: usize, title: &str, cost_per_traveler: f64) -> usize {
        let day_index = day_index.max(1);
        self.ensure_day_exists(day_index);

        let day = &mut self.days[day_index - 1];
        let title = match title.trim() {
            "" => format!("Activity {}", day.activities.len() + 1),
            trimmed => trimmed.to_string(),
        };
        day.activities.push(Activity {
            title,
            cost_per_traveler: coerce_cost(cost_per_traveler),
        });

        debug!(day = day_index, activities = day.activities.len(), "Activity added");
        day.activities.len()
    }

    /// Removes a day; later days shift down by one. The last remaining day
    /// is replaced by a fresh empty one.
    pub fn remove_day(&mut self, day_index: usize) -> Option<Day> {
        if day_index == 0 || day_index > self.days.len() {
            return None;
        }

        let removed = self.days.remove(day_index - 1);
        if self.days.is_empty() {
            self.days.push(Day::default());
        }
        Some(removed)
    }

    pub fn remove_activity(&mut self, day_index: usize, activity_index: usize) -> Option<Activity> {
        let day = day_index.checked_sub(1).and_then(|i| self.days.get_mut(i))?;
        if activity_index == 0 || activity_index > day.activities.len() {
            return None;
        }
        Some(day.activities.remove(activity_index - 1))
    }

    // Back to a single empty day; travelers and currency are kept
    pub fn clear(&mut self) {
        self.days.clear();
        self.days.push(Day::default());
    }

    pub fn totals(&self) -> Totals {
        recalc_totals(&self.days, self.travelers, self.currency)
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            travelers: self.travelers,
            currency: self.currency,
            days: self
                .days
                .iter()
                .map(|day| SnapshotDay {
                    activities: day
                        .activities
                        .iter()
                        .map(|a| SnapshotActivity {
                            title: a.title.clone(),
                            cost: a.cost_per_traveler,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Builds a trip from a snapshot. Activities are replayed through
    /// `add_activity` so the same coercions apply as for typed input, and a
    /// snapshot without days yields exactly one empty day.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut trip = Trip {
            travelers: snapshot.travelers.max(1),
            currency: snapshot.currency,
            days: Vec::with_capacity(snapshot.days.len().max(1)),
        };

        for day in snapshot.days {
            let day_index = trip.add_day();
            for activity in day.activities {
                trip.add_activity(day_index, &activity.title, activity.cost);
            }
        }

        if trip.days.is_empty() {
            trip.days.push(Day::default());
        }
        trip
    }

    // Replaces the whole trip
    pub fn load_snapshot(&mut self, snapshot: Snapshot) {
        *self = Trip::from_snapshot(snapshot);
    }

    /// Loads one of the preset itineraries, keeping the current travelers
    /// and currency. A blank id clears the trip; an unknown id leaves one
    /// empty day.
    pub fn apply_template(&mut self, template_id: &str) {
        if template_id.trim().is_empty() {
            self.clear();
            return;
        }

        let snapshot = load_template(template_id, self.travelers, self.currency);
        debug!(template = template_id, days = snapshot.days.len(), "Applying template");
        self.load_snapshot(snapshot);
    }
}

/// Per-day subtotal is the sum of every day's total; the trip total
/// multiplies that subtotal by the number of days.
pub fn recalc_totals(days: &[Day], travelers: u32, currency: Currency) -> Totals {
    let travelers = f64::from(travelers.max(1));
    let day_totals: Vec<f64> = days
        .iter()
        .map(|day| day.cost_per_traveler() * travelers)
        .collect();
    let per_day_subtotal = day_totals.iter().fold(0.0, |acc, t| acc + t);

    Totals {
        trip_total: per_day_subtotal * days.len() as f64,
        per_day_subtotal,
        day_totals,
        currency,
    }
}

pub fn coerce_travelers(raw: f64) -> u32 {
    if !raw.is_finite() || raw < 1.0 {
        1
    } else {
        raw.min(f64::from(u32::MAX)) as u32
    }
}

pub fn coerce_cost(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

// Text field input: surrounding whitespace is ignored, empty or garbage is None
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

// Persisted form of a trip. Deserialization never rejects a field: anything
// missing or of the wrong shape falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_travelers", deserialize_with = "lenient_travelers")]
    pub travelers: u32,
    #[serde(default, deserialize_with = "lenient_currency")]
    pub currency: Currency,
    #[serde(default, deserialize_with = "lenient_list")]
    pub days: Vec<SnapshotDay>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotDay {
    #[serde(default, deserialize_with = "lenient_list")]
    pub activities: Vec<SnapshotActivity>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotActivity {
    #[serde(default, deserialize_with = "lenient_title")]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient_cost",
        serialize_with = "whole_units"
    )]
    pub cost: f64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            travelers: default_travelers(),
            currency: Currency::default(),
            days: Vec::new(),
        }
    }
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn default_travelers() -> u32 {
    1
}

// Numbers may arrive as JSON numbers or as numeric strings
fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn lenient_travelers<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).map_or(1, coerce_travelers))
}

fn lenient_currency<'de, D>(deserializer: D) -> Result<Currency, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(Currency::from_code_or_default)
        .unwrap_or_default())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_cost<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).map_or(0.0, coerce_cost))
}

// Whole amounts are written as integers so snapshots read `"cost": 500`
fn whole_units<S>(cost: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if cost.fract() == 0.0 && cost.abs() < MAX_EXACT_WHOLE {
        serializer.serialize_i64(*cost as i64)
    } else {
        serializer.serialize_f64(*cost)
    }
}
