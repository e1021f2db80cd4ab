//! Enquiry form field rules.
//!
//! A field's rules come from its markup (`required`, `type="email"`,
//! `name="mobile"`, `name="captcha"`, `minlength`). [`FieldRules::check`]
//! applies them in that order and reports the first one that fails.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10,15}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    Email,
    #[error("Please enter a valid mobile number (10-15 digits)")]
    Mobile,
    #[error("Incorrect answer")]
    Captcha,
    #[error("Minimum {0} characters required")]
    MinLength(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRules {
    pub required: bool,
    pub email: bool,
    pub mobile: bool,
    pub captcha: bool,
    pub min_length: Option<usize>,
}

impl FieldRules {
    /// Derives the rules from the attributes a field carries.
    pub fn from_markup(
        name: &str,
        input_type: &str,
        required: bool,
        min_length: Option<&str>,
    ) -> Self {
        Self {
            required,
            email: input_type.eq_ignore_ascii_case("email"),
            mobile: name == "mobile",
            captcha: name == "captcha",
            min_length: min_length
                .and_then(parse_leading_int)
                .and_then(|n| usize::try_from(n).ok()),
        }
    }

    pub fn check(&self, value: &str, captcha_answer: i64) -> Result<(), FieldError> {
        if self.required && value.trim().is_empty() {
            return Err(FieldError::Required);
        }
        if value.is_empty() {
            return Ok(());
        }
        if self.email && !is_email(value) {
            return Err(FieldError::Email);
        }
        if self.mobile && !is_mobile(value) {
            return Err(FieldError::Mobile);
        }
        if self.captcha && parse_leading_int(value) != Some(captcha_answer) {
            return Err(FieldError::Captcha);
        }
        if let Some(min) = self.min_length {
            // Browsers count `minlength` in UTF-16 code units.
            if value.encode_utf16().count() < min {
                return Err(FieldError::MinLength(min));
            }
        }
        Ok(())
    }
}

/// Checks every field against the same captcha answer, one result per field.
pub fn evaluate(fields: &[(FieldRules, String)], captcha_answer: i64) -> Vec<Result<(), FieldError>> {
    fields
        .iter()
        .map(|(rules, value)| rules.check(value, captcha_answer))
        .collect()
}

pub fn submittable(results: &[Result<(), FieldError>]) -> bool {
    results.iter().all(Result::is_ok)
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn is_mobile(value: &str) -> bool {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    MOBILE.is_match(&digits)
}

/// Reads the integer at the start of `raw` the way the browser's `parseInt`
/// does: leading whitespace and a sign are allowed, trailing junk is ignored,
/// no digits at all means no number. Runs of digits too long for `i64`
/// saturate at its bounds.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }
    // Only ASCII digits remain, so the parse can fail on overflow alone.
    let magnitude: i64 = digits.parse().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
