//! Input validation performed before any storage access.

/// A mobile number is an optional leading `+` followed by 10-15 digits.
///
/// Returns the number unchanged on success so callers can store it as
/// submitted; the `+` prefix participates in uniqueness.
pub fn validate_mobile_number(mobile_number: &str) -> Result<&str, String> {
    let digits = mobile_number.strip_prefix('+').unwrap_or(mobile_number);

    if digits.is_empty() {
        return Err("mobile_number is required".to_string());
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("mobile_number must contain digits only".to_string());
    }
    if digits.len() < 10 || digits.len() > 15 {
        return Err("mobile_number must be 10-15 digits".to_string());
    }

    Ok(mobile_number)
}
