// src/models/item.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::validate_not_blank;

/// Represents the 'items' table in the database.
/// A single flashcard: the name is the correct answer for its image.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,

    /// Correct answer text.
    pub name: String,

    /// Opaque key of the uploaded image. Empty when no image was attached.
    pub image: String,

    pub exam_id: i64,
    pub group_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Values for a new item row, already checked against its exam and group.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub image: String,
    pub exam_id: i64,
    pub group_id: i64,
}

/// Full replacement values for an existing item.
#[derive(Debug, Clone)]
pub struct ItemChanges {
    pub name: String,
    pub image: String,
    pub group_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 200), custom(function = validate_not_blank))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub image: String,
    pub exam_id: i64,
    pub group_id: i64,
}

/// DTO for updating an item. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 200), custom(function = validate_not_blank))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub image: Option<String>,
    pub group_id: Option<i64>,
}

impl UpdateItemRequest {
    /// Merges the requested changes over the item's current values.
    pub fn apply_to(self, item: &Item) -> ItemChanges {
        ItemChanges {
            name: self.name.unwrap_or_else(|| item.name.clone()),
            image: self.image.unwrap_or_else(|| item.image.clone()),
            group_id: self.group_id.unwrap_or(item.group_id),
        }
    }
}
