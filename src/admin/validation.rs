//! Visitor input validation
//!
//! Checks applied to reviews submitted from the public site before they
//! are queued for moderation, plus the HTML escaping used when echoing
//! visitor text back.

use crate::admin::error::{EditError, EditResult};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

pub const MIN_REVIEW_CHARS: usize = 20;
pub const MAX_MESSAGE_CHARS: usize = 5000;
pub const MAX_EMAIL_CHARS: usize = 254;

/// Markup and script fragments never accepted in visitor text
const DANGEROUS_PATTERNS: &str =
    r"(?i)<script|javascript:|on\w+\s*=|<iframe|eval\(|expression\(|vbscript:|data:text/html";
const NAME_PATTERN: &str = r"^[\p{L}\s\-'.]+$";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// A review as submitted by a visitor
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewInput {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub rating: i64,
    pub text: String,
}

static DANGEROUS: OnceLock<Regex> = OnceLock::new();
static NAME: OnceLock<Regex> = OnceLock::new();
static EMAIL: OnceLock<Regex> = OnceLock::new();

/// Compile a constant pattern on first use
fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("validation pattern compiles"))
}

fn invalid(message: impl Into<String>) -> EditError {
    EditError::Validation(message.into())
}

fn contains_dangerous(text: &str) -> bool {
    pattern(&DANGEROUS, DANGEROUS_PATTERNS).is_match(text)
}

/// Name of 2-100 characters: letters, spaces, hyphens, apostrophes, periods
pub fn validate_name(name: &str) -> EditResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EditError::MissingField("name"));
    }

    let len = trimmed.chars().count();
    if !(2..=100).contains(&len) {
        return Err(invalid("name must be between 2 and 100 characters"));
    }
    if !pattern(&NAME, NAME_PATTERN).is_match(trimmed) {
        return Err(invalid("name may only contain letters, spaces, hyphens, apostrophes and periods"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> EditResult<()> {
    let email = email.trim();
    if email.chars().count() > MAX_EMAIL_CHARS {
        return Err(invalid("email address is too long"));
    }
    if contains_dangerous(email) || !pattern(&EMAIL, EMAIL_PATTERN).is_match(email) {
        return Err(invalid("email address is not valid"));
    }
    Ok(())
}

/// Free text up to 5000 characters with no script-like content
pub fn validate_message(message: &str) -> EditResult<()> {
    if message.trim().is_empty() {
        return Err(EditError::MissingField("text"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(invalid("review is too long"));
    }
    if contains_dangerous(message) {
        return Err(invalid("review contains disallowed content"));
    }
    Ok(())
}

/// Check a submitted review and return it with fields trimmed
pub fn validate_review(input: &ReviewInput) -> EditResult<ReviewInput> {
    let name = input.name.trim();
    let text = input.text.trim();
    if name.is_empty() {
        return Err(EditError::MissingField("name"));
    }
    if text.is_empty() {
        return Err(EditError::MissingField("text"));
    }
    if text.chars().count() < MIN_REVIEW_CHARS {
        return Err(invalid(format!(
            "please write a more detailed review (at least {MIN_REVIEW_CHARS} characters)"
        )));
    }

    validate_name(name)?;
    validate_message(text)?;

    if !(1..=5).contains(&input.rating) {
        return Err(invalid("rating must be between 1 and 5"));
    }

    let email = match input.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => {
            validate_email(email)?;
            Some(email.to_string())
        }
        _ => None,
    };

    Ok(ReviewInput {
        name: name.to_string(),
        email,
        rating: input.rating,
        text: text.to_string(),
    })
}

/// HTML-escape visitor text
pub fn sanitize_input(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            other => out.push(other),
        }
    }
    out
}
