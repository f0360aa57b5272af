// ABOUTME: Shared utility functions for LaundryLens
// ABOUTME: ID generation, language normalization, and string helpers

use uuid::Uuid;

use crate::constants::DEFAULT_LANGUAGE;

/// Generate a primary key for a new row
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a merchant order id handed to the payment widget
pub fn generate_order_id() -> String {
    format!("order_{}", Uuid::new_v4())
}

/// Lowercase a requested translation language, falling back to Korean
pub fn normalize_language(lang: Option<&str>) -> String {
    match lang.map(str::trim) {
        Some(l) if !l.is_empty() => l.to_lowercase(),
        _ => DEFAULT_LANGUAGE.to_string(),
    }
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
