//! Deck payload constants and validation.
//!
//! Decks are user-owned folders for drops. Structure (parent links, order
//! allocation, cascades) is handled by [`crate::hierarchy`]; this module only
//! checks the user-editable fields.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum allowed length for a deck name, in characters.
pub const MAX_DECK_NAME_LENGTH: usize = 255;

/// Color assigned when the client does not send one.
pub const DEFAULT_COLOR_HEX: &str = "#000000";

static COLOR_HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Trim a deck name and check it is non-empty and within
/// [`MAX_DECK_NAME_LENGTH`]. Returns the trimmed name.
pub fn normalize_deck_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Deck name must not be empty".to_string(),
        ));
    }
    let length = trimmed.chars().count();
    if length > MAX_DECK_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Deck name must not exceed {MAX_DECK_NAME_LENGTH} characters, got {length}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a `#RRGGBB` color.
pub fn validate_color_hex(color: &str) -> Result<(), CoreError> {
    if !COLOR_HEX_RE.is_match(color) {
        return Err(CoreError::Validation(format!(
            "Color must be a hex value like #1A2B3C, got '{color}'"
        )));
    }
    Ok(())
}
