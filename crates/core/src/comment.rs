//! Comment payload constants, validation and authorship rules.

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum allowed length for a comment body, in characters.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Trim comment content and check it is non-empty and within
/// [`MAX_COMMENT_LENGTH`]. Returns the trimmed content.
pub fn normalize_comment_content(content: &str) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Comment content must not be empty".to_string(),
        ));
    }
    let length = trimmed.chars().count();
    if length > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment must not exceed {MAX_COMMENT_LENGTH} characters, got {length}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Only the author may edit or delete a comment.
pub fn ensure_author(author_id: DbId, acting_user_id: DbId) -> Result<(), CoreError> {
    if author_id != acting_user_id {
        return Err(CoreError::Forbidden(
            "Only the author can modify this comment".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn content_is_trimmed() {
        assert_eq!(
            normalize_comment_content("  nice find\n").unwrap(),
            "nice find"
        );
    }

    #[test]
    fn rejects_blank_content() {
        assert_matches!(
            normalize_comment_content(" \t "),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn content_at_limit_is_accepted() {
        let body = "x".repeat(MAX_COMMENT_LENGTH);
        assert!(normalize_comment_content(&body).is_ok());
    }

    #[test]
    fn rejects_content_over_limit() {
        let body = "x".repeat(MAX_COMMENT_LENGTH + 1);
        assert!(normalize_comment_content(&body).is_err());
    }

    #[test]
    fn author_may_modify() {
        assert!(ensure_author(3, 3).is_ok());
    }

    #[test]
    fn others_are_forbidden() {
        assert_matches!(ensure_author(3, 4), Err(CoreError::Forbidden(_)));
    }
}
