// src/models/score.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'score_events' table in the database.
/// Append-only log of answer submissions; rows are never updated or deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEvent {
    pub id: i64,
    pub exam_id: i64,
    pub item_id: i64,
    pub user_id: i64,
    pub correct: bool,
    pub created_at: DateTime<Utc>,
}

/// Values for a new score event.
#[derive(Debug, Clone)]
pub struct NewScoreEvent {
    pub exam_id: i64,
    pub item_id: i64,
    pub user_id: i64,
    pub correct: bool,
}

/// Per-user counts of correct and wrong attempts within one exam.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ScoreTally {
    pub user_id: i64,
    pub username: String,
    pub correct: i64,
    pub wrong: i64,
}

/// One ranked row of the leaderboard. Rank is the position in the response array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub username: String,
    pub correct: i64,
    pub wrong: i64,
    pub total: i64,
    pub points: i64,
    pub percentage: i64,
}
