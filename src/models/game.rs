// src/models/game.rs

use serde::{Deserialize, Serialize};

/// One game question: the image of the target item plus candidate answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub item_id: i64,
    pub image: String,
    pub answers: Vec<String>,
}

/// DTO for submitting an answer to a round.
/// `answer` is free text; anything that does not match is simply wrong.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub item_id: i64,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub correct: bool,
}
