//! # Phone Number Module
//!
//! This module provides phone number normalization for the Ovoz Berish bot.
//! Users enter numbers in heterogeneous local formats (spaces, dashes, a
//! leading `8` trunk prefix, with or without the `998` country code); every
//! accepted shape is canonicalized to `+998` followed by 9 digits before it
//! is forwarded anywhere.

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

/// Accepted shapes after cleaning, first alternative wins:
/// - `+998` or `998` followed by exactly 9 digits,
/// - trunk-prefixed `8` followed by exactly 10 digits (the subscriber
///   number is the last 9 of them),
/// - a bare 9-digit subscriber number.
const PHONE_SHAPE_PATTERN: &str =
    r"^(?:\+?998(?P<intl>\d{9})|8\d(?P<trunk>\d{9})|(?P<bare>\d{9}))$";

lazy_static! {
    static ref PHONE_SHAPE_REGEX: Regex =
        Regex::new(PHONE_SHAPE_PATTERN).expect("Phone shape pattern should be valid");
}

/// A phone number in the canonical form `+998` + 9 digits.
///
/// Only [`normalize`] produces values of this type; the inner string is
/// never constructed directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors produced by phone number normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The cleaned input matched none of the accepted shapes. Carries the
    /// cleaned string for diagnostic display.
    InvalidFormat(String),
}

impl std::fmt::Display for PhoneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhoneError::InvalidFormat(cleaned) => {
                write!(f, "Invalid phone number format: {cleaned}")
            }
        }
    }
}

impl std::error::Error for PhoneError {}

/// Strip everything except ASCII digits. A `+` is kept only when it is the
/// first non-whitespace character of the input; any other occurrence is
/// noise and is discarded.
fn clean(raw: &str) -> String {
    let trimmed = raw.trim_start();
    let mut cleaned = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        cleaned.push('+');
    }
    cleaned.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));
    cleaned
}

/// Normalize a raw user-entered phone number to the canonical
/// `+998XXXXXXXXX` form.
///
/// Strings with digits but of a wrong length are rejected, not guessed at.
/// The function is idempotent on its own output.
///
/// # Examples
///
/// ```rust
/// use ovozbot::phone::normalize;
///
/// let phone = normalize("90-123-45-67").unwrap();
/// assert_eq!(phone.as_str(), "+998901234567");
/// ```
pub fn normalize(raw: &str) -> Result<NormalizedPhone, PhoneError> {
    let cleaned = clean(raw);
    trace!("Cleaned phone input {raw:?} to {cleaned:?}");

    let captures = PHONE_SHAPE_REGEX
        .captures(&cleaned)
        .ok_or_else(|| PhoneError::InvalidFormat(cleaned.clone()))?;

    let national = captures
        .name("intl")
        .or_else(|| captures.name("trunk"))
        .or_else(|| captures.name("bare"))
        .map(|m| m.as_str())
        .ok_or_else(|| PhoneError::InvalidFormat(cleaned.clone()))?;

    debug!("Normalized phone input to +998{national}");
    Ok(NormalizedPhone(format!("+998{national}")))
}

/// Boolean gate used by the router to decide whether free text should be
/// treated as a phone number submission at all.
///
/// Deliberately the same shape matcher as [`normalize`] so the gate and the
/// parser cannot drift apart.
pub fn looks_like_phone(text: &str) -> bool {
    normalize(text).is_ok()
}
