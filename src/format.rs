// Display formatting for amounts, distances and durations

use crate::itinerary::Currency;

/// Formats an amount with no fraction digits, e.g. `₹1,23,456` or `$123,456`.
/// INR uses Indian grouping (thousands, then pairs of digits).
pub fn format_currency(amount: f64, currency: Currency) -> String {
    let rounded = if amount.is_finite() { amount.round() } else { 0.0 };
    let digits = format!("{:.0}", rounded.abs());
    let grouped = match currency {
        Currency::Inr => group_indian(&digits),
        Currency::Usd => group_thousands(&digits),
    };
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, currency.symbol(), grouped)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}

// Meters to kilometers with one decimal
pub fn format_km(meters: f64) -> String {
    format!("{:.1}", meters / 1000.0)
}

// Rounds to whole minutes before splitting, so 3599 s reads "1 h 0 min"
pub fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds / 60.0).round();
    let hours = (total_minutes / 60.0).floor();
    let minutes = total_minutes - hours * 60.0;
    if hours == 0.0 {
        format!("{} min", minutes)
    } else {
        format!("{} h {} min", hours, minutes)
    }
}
