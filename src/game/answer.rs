// src/game/answer.rs

use crate::{
    error::AppError,
    models::{game::AnswerResult, item::Item, score::NewScoreEvent},
    store::Store,
};

/// Exact, case-sensitive comparison against the stored item name.
pub fn is_correct(item: &Item, answer: &str) -> bool {
    item.name == answer
}

/// Checks `answer` against the item and appends a score event for `user_id`.
///
/// Correctness is always derived from the stored item, never from the client.
pub async fn submit_answer(
    store: &dyn Store,
    item_id: i64,
    answer: &str,
    user_id: i64,
) -> Result<AnswerResult, AppError> {
    let item = store
        .find_item(item_id)
        .await?
        .ok_or(AppError::NotFound("Item not found".to_string()))?;

    let correct = is_correct(&item, answer);

    store
        .insert_score_event(NewScoreEvent {
            exam_id: item.exam_id,
            item_id: item.id,
            user_id,
            correct,
        })
        .await?;

    tracing::info!(
        "User {} answered item {} of exam {}: correct={}",
        user_id,
        item.id,
        item.exam_id,
        correct
    );

    Ok(AnswerResult { correct })
}
