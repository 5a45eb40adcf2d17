//! Fixed-point money helpers. Prices are stored as integer cents.

/// Number of cents in one currency unit.
pub const CENTS_PER_UNIT: i64 = 100;

/// Render cents as a decimal string with two fractional digits.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let unit = CENTS_PER_UNIT as u64;
    format!("{sign}{}.{:02}", abs / unit, abs % unit)
}

/// Convert cents to a floating point amount for JSON payloads.
pub fn cents_to_f64(cents: i64) -> f64 {
    cents as f64 / CENTS_PER_UNIT as f64
}
