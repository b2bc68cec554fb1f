use email_address::EmailAddress;

use crate::error::{AppError, Res};

/// Emails are compared and stored lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Referral codes are compared and stored uppercase.
pub fn normalize_referral_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Normalises an email from a request body, rejecting missing or malformed input.
pub fn parse_email(email: Option<&str>) -> Res<String> {
    let email = email
        .map(normalize_email)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;

    if !EmailAddress::is_valid(&email) {
        return Err(AppError::BadRequest(
            "email must be a valid email address".to_string(),
        ));
    }
    Ok(email)
}
