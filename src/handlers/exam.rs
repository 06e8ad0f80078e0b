// src/handlers/exam.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    game,
    handlers::extract::{AppJson, AppPath},
    models::exam::{CreateExamRequest, Exam, UpdateExamRequest},
    store::{DynStore, Store},
    utils::jwt::Claims,
};

/// Loads a live exam and checks that `user_id` owns it.
pub(crate) async fn owned_exam(store: &dyn Store, exam_id: i64, user_id: i64) -> Result<Exam, AppError> {
    let exam = store
        .find_exam(exam_id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    if exam.user_id != user_id {
        return Err(AppError::Forbidden("Exam belongs to another user".to_string()));
    }
    Ok(exam)
}

/// Creates an exam owned by the caller.
/// Names are unique per owner.
pub async fn create_exam(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    if store
        .find_exam_by_owner_and_name(user_id, &payload.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Exam with this name already exists".to_string(),
        ));
    }

    let exam = store.create_exam(&payload.name, user_id).await?;
    tracing::info!("User {} created exam {} ({})", user_id, exam.name, exam.id);

    Ok((StatusCode::CREATED, Json(exam)))
}

pub async fn list_exams(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.list_exams().await?))
}

pub async fn get_exam(
    State(store): State<DynStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = store
        .find_exam(id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(exam))
}

/// Renames an exam. Owner only.
pub async fn update_exam(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let exam = owned_exam(store.as_ref(), id, user_id).await?;

    if exam.name == payload.name {
        return Ok(Json(exam));
    }

    if store
        .find_exam_by_owner_and_name(user_id, &payload.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Exam with this name already exists".to_string(),
        ));
    }

    Ok(Json(store.rename_exam(id, &payload.name).await?))
}

/// Soft-deletes an exam. Owner only.
pub async fn delete_exam(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    owned_exam(store.as_ref(), id, user_id).await?;

    store.delete_exam(id).await?;
    tracing::info!("User {} deleted exam {}", user_id, id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_exam_groups(
    State(store): State<DynStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    store
        .find_exam(id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(store.list_groups_by_exam(id).await?))
}

pub async fn list_exam_items(
    State(store): State<DynStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    store
        .find_exam(id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(store.list_items_by_exam(id).await?))
}

/// Ranked per-user statistics for the exam.
pub async fn get_leaderboard(
    State(store): State<DynStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let leaderboard = game::get_leaderboard(store.as_ref(), id).await?;
    Ok(Json(leaderboard))
}
