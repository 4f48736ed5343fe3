// Destination browsing: card filtering and the quick itinerary cart
// The cart multiplies its subtotal by trip length and travelers, then adds tax

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::itinerary::coerce_cost;

pub const TAX_RATE: f64 = 0.12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub region: String,
    pub experience: String,
    // Per traveler per day
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationFilter {
    pub region: Option<String>,
    pub experience: Option<String>,
    // None or zero means no budget limit
    pub max_budget: Option<f64>,
}

impl DestinationFilter {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, destination: &Destination) -> bool {
        if !matches_text(self.region.as_deref(), &destination.region) {
            return false;
        }

        if !matches_text(self.experience.as_deref(), &destination.experience) {
            return false;
        }

        match self.max_budget {
            Some(max) if max.is_finite() && max != 0.0 => coerce_cost(destination.cost) <= max,
            _ => true,
        }
    }
}

// Empty criteria match everything; comparison ignores case
fn matches_text(criterion: Option<&str>, value: &str) -> bool {
    match criterion.map(str::trim) {
        None | Some("") => true,
        Some(wanted) => wanted.to_lowercase() == value.trim().to_lowercase(),
    }
}

pub fn filter_destinations<'a>(
    destinations: &'a [Destination],
    filter: &DestinationFilter,
) -> Vec<&'a Destination> {
    destinations.iter().filter(|d| filter.matches(d)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub name: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    pub subtotal: f64,
    pub grand_total: f64,
}

/// Picked destinations keyed by id, kept in the order they were first added.
#[derive(Debug, Clone, Default)]
pub struct DestinationCart {
    items: Vec<(String, CartItem)>,
}

impl DestinationCart {
    pub fn new() -> Self {
        Self::default()
    }

    // Re-adding an id replaces the entry in place
    pub fn add(&mut self, id: &str, name: &str, cost: f64) {
        let name = match name.trim() {
            "" => id.to_string(),
            trimmed => trimmed.to_string(),
        };
        let item = CartItem {
            name,
            cost: if cost.is_finite() { cost } else { 0.0 },
        };

        match self.items.iter_mut().find(|(key, _)| key == id) {
            Some((_, existing)) => *existing = item,
            None => self.items.push((id.to_string(), item)),
        }
        debug!(id, items = self.items.len(), "Destination added to cart");
    }

    pub fn add_destination(&mut self, destination: &Destination) {
        self.add(&destination.id, &destination.name, destination.cost);
    }

    pub fn remove(&mut self, id: &str) -> Option<CartItem> {
        let position = self.items.iter().position(|(key, _)| key == id)?;
        Some(self.items.remove(position).1)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &CartItem)> {
        self.items.iter().map(|(id, item)| (id.as_str(), item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Subtotal is the plain sum of item costs. The grand total scales it by
    /// trip days and travelers (each at least 1), adds tax and rounds to a
    /// whole unit.
    pub fn totals(&self, days: f64, travelers: f64) -> CartTotals {
        let subtotal = self.items.iter().fold(0.0, |acc, (_, item)| acc + item.cost);
        let days = at_least_one(days);
        let travelers = at_least_one(travelers);

        CartTotals {
            subtotal,
            grand_total: (subtotal * days * travelers * (1.0 + TAX_RATE)).round(),
        }
    }
}

fn at_least_one(raw: f64) -> f64 {
    coerce_cost(raw).max(1.0)
}
