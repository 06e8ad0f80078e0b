// src/store/mod.rs

//! Entity store seam.
//!
//! Handlers and the game logic only talk to [`Store`]. `PgStore` backs it with
//! Postgres through sqlx; `MemoryStore` keeps everything in process and is used
//! for local runs without `DATABASE_URL` and by the test suites.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        exam::Exam,
        group::Group,
        item::{Item, ItemChanges, NewItem},
        score::{NewScoreEvent, ScoreEvent, ScoreTally},
        user::User,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle to whichever store the application runs on.
pub type DynStore = Arc<dyn Store>;

/// Persistence operations used by the application.
///
/// Every lookup ignores soft-deleted rows. `Ok(None)` means "no such live row";
/// `Err` is reserved for store failures (and `Conflict` on unique violations).
#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    // Exams
    async fn create_exam(&self, name: &str, user_id: i64) -> Result<Exam, AppError>;
    async fn find_exam(&self, id: i64) -> Result<Option<Exam>, AppError>;
    async fn find_exam_by_owner_and_name(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<Option<Exam>, AppError>;
    async fn list_exams(&self) -> Result<Vec<Exam>, AppError>;
    async fn rename_exam(&self, id: i64, name: &str) -> Result<Exam, AppError>;
    /// Soft-deletes the exam together with its groups and items.
    async fn delete_exam(&self, id: i64) -> Result<(), AppError>;

    // Groups
    async fn create_group(&self, exam_id: i64, name: &str) -> Result<Group, AppError>;
    async fn find_group(&self, id: i64) -> Result<Option<Group>, AppError>;
    async fn find_group_by_exam_and_name(
        &self,
        exam_id: i64,
        name: &str,
    ) -> Result<Option<Group>, AppError>;
    async fn list_groups_by_exam(&self, exam_id: i64) -> Result<Vec<Group>, AppError>;
    async fn rename_group(&self, id: i64, name: &str) -> Result<Group, AppError>;
    /// Soft-deletes the group together with all of its items.
    async fn delete_group(&self, id: i64) -> Result<(), AppError>;

    // Items
    async fn create_item(&self, item: NewItem) -> Result<Item, AppError>;
    async fn find_item(&self, id: i64) -> Result<Option<Item>, AppError>;
    async fn list_items_by_exam(&self, exam_id: i64) -> Result<Vec<Item>, AppError>;
    async fn update_item(&self, id: i64, changes: ItemChanges) -> Result<Item, AppError>;
    async fn delete_item(&self, id: i64) -> Result<(), AppError>;

    // Score events
    async fn insert_score_event(&self, event: NewScoreEvent) -> Result<ScoreEvent, AppError>;
    async fn count_score_events(&self, exam_id: i64) -> Result<i64, AppError>;
    /// Correct/wrong counts per user over all score events of the exam.
    /// Users without events are absent.
    async fn tally_scores(&self, exam_id: i64) -> Result<Vec<ScoreTally>, AppError>;
}
