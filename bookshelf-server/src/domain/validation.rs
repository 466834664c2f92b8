//! Field validators shared by the request types.
//!
//! Every validator takes the raw value and returns either the accepted
//! (normalized) value or a human readable message. Request types run them in a
//! fixed order and collect failures into [`FieldErrors`](super::error::FieldErrors).

use chrono::{Datelike, Utc};
use validator::ValidateEmail;

pub(crate) const BLANK_MESSAGE: &str = "This field may not be blank.";
pub(crate) const REQUIRED_MESSAGE: &str = "This field is required.";
pub(crate) const FUTURE_YEAR_MESSAGE: &str = "Publication year cannot be in the future.";
pub(crate) const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords must match.";
pub(crate) const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address.";
pub(crate) const INVALID_NUMBER_MESSAGE: &str = "A valid number is required.";
pub(crate) const NEGATIVE_NUMBER_MESSAGE: &str = "Ensure this value is greater than or equal to 0.";
pub(crate) const INVALID_USERNAME_MESSAGE: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

pub(crate) const USERNAME_MIN_CHARS: usize = 3;
pub(crate) const USERNAME_MAX_CHARS: usize = 150;

/// Calendar year at the moment of the call, so the upper bound moves with time.
pub(crate) fn current_year() -> i32 {
    Utc::now().year()
}

pub(crate) fn required_text(value: &str, max_chars: usize) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BLANK_MESSAGE.to_string());
    }
    optional_text(value, max_chars)
}

pub(crate) fn optional_text(value: &str, max_chars: usize) -> Result<String, String> {
    let value = value.trim();
    if value.chars().count() > max_chars {
        return Err(format!(
            "Ensure this field has no more than {max_chars} characters."
        ));
    }
    Ok(value.to_string())
}

pub(crate) fn publication_year(value: i32, current_year: i32) -> Result<i32, String> {
    if value > current_year {
        return Err(FUTURE_YEAR_MESSAGE.to_string());
    }
    Ok(value)
}

pub(crate) fn price(value: f64) -> Result<f64, String> {
    if !value.is_finite() {
        return Err(INVALID_NUMBER_MESSAGE.to_string());
    }
    if value < 0.0 {
        return Err(NEGATIVE_NUMBER_MESSAGE.to_string());
    }
    Ok(value)
}

/// Empty email is allowed; anything else must be a valid address.
pub(crate) fn email(value: &str) -> Result<String, String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return Ok(value);
    }
    if !value.validate_email() {
        return Err(INVALID_EMAIL_MESSAGE.to_string());
    }
    Ok(value)
}

pub(crate) fn username(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BLANK_MESSAGE.to_string());
    }
    let len = value.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(format!(
            "Ensure this field has {USERNAME_MIN_CHARS} to {USERNAME_MAX_CHARS} characters."
        ));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !value.chars().all(allowed) {
        return Err(INVALID_USERNAME_MESSAGE.to_string());
    }
    Ok(value.to_string())
}

pub(crate) fn password(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(BLANK_MESSAGE.to_string());
    }
    Ok(())
}

pub(crate) fn password_confirmation(password: &str, password2: &str) -> Result<(), String> {
    if password != password2 {
        return Err(PASSWORD_MISMATCH_MESSAGE.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_year_accepts_current_and_past_years() {
        assert_eq!(publication_year(2024, 2024), Ok(2024));
        assert_eq!(publication_year(1999, 2024), Ok(1999));
        assert_eq!(publication_year(-300, 2024), Ok(-300));
    }

    #[test]
    fn publication_year_rejects_every_future_year() {
        for offset in [1, 2, 10, 1000] {
            assert_eq!(
                publication_year(2024 + offset, 2024),
                Err(FUTURE_YEAR_MESSAGE.to_string())
            );
        }
    }

    #[test]
    fn current_year_bound_is_inclusive() {
        let year = current_year();
        assert!(publication_year(year, current_year()).is_ok());
        assert!(publication_year(year + 1, current_year()).is_err());
    }

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("  Dune ", 255), Ok("Dune".to_string()));
        assert_eq!(required_text("   ", 255), Err(BLANK_MESSAGE.to_string()));
        assert!(required_text(&"x".repeat(256), 255).is_err());
        assert!(required_text(&"ё".repeat(255), 255).is_ok());
    }

    #[test]
    fn price_must_be_finite_and_non_negative() {
        assert_eq!(price(0.0), Ok(0.0));
        assert_eq!(price(19.99), Ok(19.99));
        assert_eq!(price(-1.0), Err(NEGATIVE_NUMBER_MESSAGE.to_string()));
        assert_eq!(price(f64::NAN), Err(INVALID_NUMBER_MESSAGE.to_string()));
        assert_eq!(price(f64::INFINITY), Err(INVALID_NUMBER_MESSAGE.to_string()));
    }

    #[test]
    fn email_is_optional_but_checked_when_present() {
        assert_eq!(email(""), Ok(String::new()));
        assert_eq!(email("  TeSt@Example.COM "), Ok("test@example.com".to_string()));
        assert_eq!(email("not-an-email"), Err(INVALID_EMAIL_MESSAGE.to_string()));
    }

    #[test]
    fn username_rules_are_applied() {
        assert!(username("ab").is_err());
        assert!(username("   ").is_err());
        assert_eq!(username(" jane.doe+1 "), Ok("jane.doe+1".to_string()));
        assert_eq!(username("jane doe"), Err(INVALID_USERNAME_MESSAGE.to_string()));
    }

    #[test]
    fn password_confirmation_requires_exact_match() {
        assert!(password_confirmation("secret", "secret").is_ok());
        assert_eq!(
            password_confirmation("secret", "Secret"),
            Err(PASSWORD_MISMATCH_MESSAGE.to_string())
        );
    }
}
