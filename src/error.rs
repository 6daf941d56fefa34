//! Error types for item store operations.
//!
//! Two families live in [`StoreError`]:
//! - validation and lookup failures (`EmptyValue`, `TooLarge`, `TooMany`,
//!   `Duplicate`, `NotFound`): expected, recoverable, shown to the user
//!   verbatim through their `Display` text
//! - backend failures (`ConnectionError`, `DatabaseError`)

use thiserror::Error;

use crate::store::{MAX_ITEMS, MAX_VALUE_LENGTH};

/// Errors that can occur during item store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The submitted value has no characters.
    #[error("The item you are trying to add is empty.")]
    EmptyValue,

    /// The submitted value is longer than [`MAX_VALUE_LENGTH`] characters.
    #[error(
        "The item you are trying to add seems too large; it should be shorter than {} characters.",
        MAX_VALUE_LENGTH + 1
    )]
    TooLarge,

    /// The store already holds [`MAX_ITEMS`] items.
    #[error("You are trying to add too many items; you have {} items added already.", MAX_ITEMS)]
    TooMany,

    /// An item with the same value already exists.
    #[error("Item [{0}] already exists.")]
    Duplicate(String),

    /// No item has the given id.
    #[error("Item [{0}] does not exist.")]
    NotFound(i64),

    /// Cannot open or talk to the storage backend.
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// Database error from SQLx.
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Returns true if this error is an expected outcome that should be shown
    /// to the user rather than treated as a fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            StoreError::EmptyValue
                | StoreError::TooLarge
                | StoreError::TooMany
                | StoreError::Duplicate(_)
                | StoreError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_display() {
        let msg = StoreError::TooLarge.to_string();
        assert_eq!(
            msg,
            "The item you are trying to add seems too large; it should be shorter than 1000 characters."
        );
    }

    #[test]
    fn test_too_many_display() {
        let msg = StoreError::TooMany.to_string();
        assert_eq!(
            msg,
            "You are trying to add too many items; you have 100 items added already."
        );
    }

    #[test]
    fn test_duplicate_and_not_found_display() {
        assert_eq!(
            StoreError::Duplicate("milk".to_string()).to_string(),
            "Item [milk] already exists."
        );
        assert_eq!(
            StoreError::NotFound(42).to_string(),
            "Item [42] does not exist."
        );
    }

    #[test]
    fn test_user_facing_errors() {
        assert!(StoreError::EmptyValue.is_user_facing());
        assert!(StoreError::TooLarge.is_user_facing());
        assert!(StoreError::TooMany.is_user_facing());
        assert!(StoreError::Duplicate("x".to_string()).is_user_facing());
        assert!(StoreError::NotFound(1).is_user_facing());
        assert!(!StoreError::ConnectionError("down".to_string()).is_user_facing());
        assert!(!StoreError::DatabaseError(sqlx::Error::RowNotFound).is_user_facing());
    }
}
