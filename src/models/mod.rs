// src/models/mod.rs

pub mod exam;
pub mod game;
pub mod group;
pub mod item;
pub mod score;
pub mod user;

/// Rejects names that are empty once surrounding whitespace is removed.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("must_not_be_blank"));
    }
    Ok(())
}
