//! Number formatting for report columns.

/// Formats `value` with exactly `precision` decimals.
///
/// Values that round to zero print without a sign, and non-finite values
/// print as zero, so report columns never contain `-0.00` or `NaN`.
pub fn fixed(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{:.*}", precision, 0.0);
    }
    let formatted = format!("{:.*}", precision, value);
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        formatted[1..].to_string()
    } else {
        formatted
    }
}
