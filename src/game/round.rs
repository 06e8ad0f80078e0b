// src/game/round.rs

use rand::{Rng, seq::SliceRandom};

use crate::{
    error::AppError,
    models::{game::Round, item::Item},
    store::Store,
};

/// Wrong answers offered next to the correct one.
pub const MAX_DISTRACTORS: usize = 3;

/// Generates a fresh round for the exam.
///
/// Fails with `NotFound` when the exam does not exist and with `EmptyResult`
/// when it exists but has no items yet.
pub async fn generate_round(store: &dyn Store, exam_id: i64) -> Result<Round, AppError> {
    store
        .find_exam(exam_id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let items = store.list_items_by_exam(exam_id).await?;

    let round = build_round(&items, &mut rand::thread_rng())
        .ok_or(AppError::EmptyResult("No items in this exam".to_string()))?;

    tracing::debug!(
        "Generated round for exam {}: item {} with {} answers",
        exam_id,
        round.item_id,
        round.answers.len()
    );
    Ok(round)
}

/// Builds a round from the exam's items. Returns `None` for an empty slice.
///
/// The target is drawn uniformly. Distractors come only from the target's
/// group; names equal to the target's (or to an already chosen distractor)
/// are skipped so exactly one answer is correct.
pub fn build_round<R: Rng + ?Sized>(items: &[Item], rng: &mut R) -> Option<Round> {
    let target = items.choose(rng)?;

    let mut pool: Vec<&Item> = items
        .iter()
        .filter(|item| item.id != target.id && item.group_id == target.group_id)
        .collect();
    pool.shuffle(rng);

    let mut answers = vec![target.name.clone()];
    for item in pool {
        if answers.len() > MAX_DISTRACTORS {
            break;
        }
        if !answers.contains(&item.name) {
            answers.push(item.name.clone());
        }
    }
    answers.shuffle(rng);

    Some(Round {
        item_id: target.id,
        image: target.image.clone(),
        answers,
    })
}
