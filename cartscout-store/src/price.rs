use cartscout_common::sentinel;
use regex::Regex;
use std::sync::OnceLock;

static CURRENCY_MARKER: OnceLock<Option<Regex>> = OnceLock::new();

/// Leading `₹`, `Rs.` or `Rs` (any case), with surrounding whitespace.
fn currency_marker() -> Option<&'static Regex> {
    CURRENCY_MARKER
        .get_or_init(|| Regex::new(r"(?i)^\s*(?:₹|rs\.?)\s*").ok())
        .as_ref()
}

/// Prefix a scraped price with `currency`.
///
/// The "N/A" sentinel is kept as is, and a marker already present in the
/// scraped text is replaced rather than doubled.
pub fn format_price(raw: &str, currency: &str) -> String {
    let raw = raw.trim();
    if raw == sentinel::PRICE {
        return raw.to_string();
    }
    let amount = match currency_marker() {
        Some(marker) => marker.replace(raw, ""),
        None => raw.into(),
    };
    format!("{currency}{amount}")
}
