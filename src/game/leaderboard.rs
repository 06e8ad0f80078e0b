// src/game/leaderboard.rs

use crate::{
    error::AppError,
    models::score::{LeaderboardEntry, ScoreTally},
    store::Store,
};

pub const POINTS_PER_CORRECT: i64 = 10;
pub const POINTS_PER_WRONG: i64 = 5;
/// Everyone starts here so a few misses do not push a player below zero.
pub const BASE_POINTS: i64 = 100;

/// Ranked statistics of every user who has answered in the exam.
pub async fn get_leaderboard(
    store: &dyn Store,
    exam_id: i64,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    store
        .find_exam(exam_id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let tallies = store.tally_scores(exam_id).await?;
    Ok(rank(tallies))
}

/// Computes derived metrics for a single tally.
pub fn entry_from_tally(tally: ScoreTally) -> LeaderboardEntry {
    let total = tally.correct + tally.wrong;
    let points = tally.correct * POINTS_PER_CORRECT - tally.wrong * POINTS_PER_WRONG + BASE_POINTS;

    LeaderboardEntry {
        user_id: tally.user_id,
        username: tally.username,
        correct: tally.correct,
        wrong: tally.wrong,
        total,
        points,
        percentage: percentage(tally.correct, total),
    }
}

/// Rounded share of correct answers; 0 when nothing was answered.
pub fn percentage(correct: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as i64
}

/// Orders by points, then correct answers (both descending), then user id.
pub fn rank(tallies: Vec<ScoreTally>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = tallies.into_iter().map(entry_from_tally).collect();
    entries.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.correct.cmp(&a.correct))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    entries
}
