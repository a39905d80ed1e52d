use chrono::{NaiveDate, NaiveTime};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const VERIFICATION_CODE_LENGTH: usize = 6;

pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("Please enter a valid email address".to_string()),
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    Ok(())
}

/// Checks run before any backend call is made for a sign up.
pub fn validate_signup(email: &str, password: &str, confirm_password: &str) -> Result<(), String> {
    validate_email(email)?;
    if password != confirm_password {
        return Err("Passwords do not match".to_string());
    }
    validate_password(password)
}

pub fn validate_verification_code(email: &str, code: &str) -> Result<(), String> {
    if email.trim().is_empty() || code.trim().is_empty() {
        return Err("Please enter both email and verification code".to_string());
    }
    let code = code.trim();
    if code.len() != VERIFICATION_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "Verification code must be {VERIFICATION_CODE_LENGTH} digits"
        ));
    }
    Ok(())
}

/// Parses `HH:MM` (or `HH:MM:SS`).
pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("Invalid time: {value}"))
}

/// Zero-padded `HH:MM`, so stored times order correctly as text.
pub fn normalize_time(value: &str) -> Result<String, String> {
    parse_time(value).map(|time| time.format("%H:%M").to_string())
}

/// Pickups are booked from tomorrow on, inside a non-empty time window.
/// Returns the window as normalized start and end times.
pub fn validate_pickup(
    pickup_date: NaiveDate,
    time_start: &str,
    time_end: &str,
    waste_types: &[String],
    today: NaiveDate,
) -> Result<(String, String), String> {
    if pickup_date <= today {
        return Err("Pickup date must be after today".to_string());
    }
    let start = parse_time(time_start)?;
    let end = parse_time(time_end)?;
    if start >= end {
        return Err("Pickup time window must end after it starts".to_string());
    }
    if waste_types.iter().all(|item| item.trim().is_empty()) {
        return Err("Select at least one waste type".to_string());
    }
    Ok((
        start.format("%H:%M").to_string(),
        end.format("%H:%M").to_string(),
    ))
}

pub fn validate_contact(name: &str, email: &str, message: &str) -> Result<(), String> {
    if name.trim().is_empty() || message.trim().is_empty() {
        return Err("Please fill in all fields".to_string());
    }
    validate_email(email)
}
