// Preset itineraries offered in the template picker

use crate::itinerary::{Currency, Snapshot, SnapshotActivity, SnapshotDay};

#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    // One slice per day of (title, cost per traveler)
    pub days: &'static [&'static [(&'static str, f64)]],
}

pub const TEMPLATES: [Template; 3] = [
    Template {
        id: "goa-weekend",
        name: "Goa Weekend",
        days: &[
            &[("Arrive in Goa, beach sunset", 0.0), ("Seafood dinner", 600.0)],
            &[("Water sports at Calangute", 1200.0), ("Fort Aguada visit", 200.0)],
            &[("Old Goa churches", 150.0), ("Baga night market", 300.0)],
        ],
    },
    Template {
        id: "golden-triangle",
        name: "Golden Triangle",
        days: &[
            &[("Delhi city tour", 500.0), ("Street food walk", 300.0)],
            &[("Agra Fort & Taj Mahal", 800.0)],
            &[("Drive to Jaipur", 0.0), ("Chokhi Dhani evening", 700.0)],
            &[("Amber Fort & Hawa Mahal", 600.0)],
            &[("Local markets & departure", 0.0)],
        ],
    },
    Template {
        id: "kerala-seven",
        name: "Kerala in Seven Days",
        days: &[
            &[("Arrive Kochi, Fort Kochi walk", 0.0)],
            &[("Munnar tea gardens", 400.0)],
            &[("Eravikulam National Park", 500.0)],
            &[("Thekkady boating", 350.0)],
            &[("Backwaters houseboat (Alleppey)", 1800.0)],
            &[("Kovalam beach day", 0.0)],
            &[("Thiruvananthapuram city & departure", 0.0)],
        ],
    },
];

pub fn find_template(id: &str) -> Option<&'static Template> {
    let id = id.trim();
    TEMPLATES.iter().find(|t| t.id == id)
}

impl Template {
    pub fn snapshot(&self, travelers: u32, currency: Currency) -> Snapshot {
        Snapshot {
            travelers,
            currency,
            days: self
                .days
                .iter()
                .map(|activities| SnapshotDay {
                    activities: activities
                        .iter()
                        .map(|(title, cost)| SnapshotActivity {
                            title: title.to_string(),
                            cost: *cost,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Snapshot for a preset, or a snapshot with no days for an unknown or
/// blank id. Nothing is mutated here; the caller feeds the result into
/// `Trip::load_snapshot`.
pub fn load_template(id: &str, travelers: u32, currency: Currency) -> Snapshot {
    match find_template(id) {
        Some(template) => template.snapshot(travelers, currency),
        None => Snapshot {
            travelers,
            currency,
            days: Vec::new(),
        },
    }
}
