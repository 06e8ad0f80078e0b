// src/models/exam.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::validate_not_blank;

/// Represents the 'exams' table in the database.
/// An exam is a named quiz owned by a single user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: i64,
    pub name: String,

    /// Owning user.
    pub user_id: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker. Rows with a value here are invisible to lookups.
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// DTO for creating an exam.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 100), custom(function = validate_not_blank))]
    pub name: String,
}

/// DTO for renaming an exam.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExamRequest {
    #[validate(length(min = 1, max = 100), custom(function = validate_not_blank))]
    pub name: String,
}
