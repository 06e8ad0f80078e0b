// src/handlers/game.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    game,
    handlers::extract::{AppJson, AppPath},
    models::game::SubmitAnswerRequest,
    store::DynStore,
    utils::jwt::Claims,
};

/// Generates a random round for the exam.
pub async fn get_round(
    State(store): State<DynStore>,
    AppPath(exam_id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let round = game::generate_round(store.as_ref(), exam_id).await?;
    Ok(Json(round))
}

/// Checks the submitted answer and records the attempt for the caller.
pub async fn submit_result(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = game::submit_answer(store.as_ref(), req.item_id, &req.answer, claims.user_id()?).await?;
    Ok(Json(result))
}
