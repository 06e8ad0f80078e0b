// src/handlers/group.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{
        exam::owned_exam,
        extract::{AppJson, AppPath},
    },
    models::group::{CreateGroupRequest, Group, UpdateGroupRequest},
    store::{DynStore, Store},
    utils::jwt::Claims,
};

/// Loads a live group and checks that `user_id` owns its exam.
pub(crate) async fn owned_group(store: &dyn Store, group_id: i64, user_id: i64) -> Result<Group, AppError> {
    let group = store
        .find_group(group_id)
        .await?
        .ok_or(AppError::NotFound("Group not found".to_string()))?;

    owned_exam(store, group.exam_id, user_id).await?;
    Ok(group)
}

/// Creates a group inside an exam the caller owns.
/// Group names are unique within their exam.
pub async fn create_group(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    owned_exam(store.as_ref(), payload.exam_id, user_id).await?;

    if store
        .find_group_by_exam_and_name(payload.exam_id, &payload.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Group with this name already exists in this exam".to_string(),
        ));
    }

    let group = store.create_group(payload.exam_id, &payload.name).await?;
    tracing::info!("Created group {} ({}) in exam {}", group.name, group.id, group.exam_id);

    Ok((StatusCode::CREATED, Json(group)))
}

/// Renames a group. Owner of the exam only.
pub async fn update_group(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let group = owned_group(store.as_ref(), id, claims.user_id()?).await?;

    if group.name == payload.name {
        return Ok(Json(group));
    }

    if store
        .find_group_by_exam_and_name(group.exam_id, &payload.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Group with this name already exists in this exam".to_string(),
        ));
    }

    Ok(Json(store.rename_group(id, &payload.name).await?))
}

/// Deletes a group and every item in it. Owner of the exam only.
pub async fn delete_group(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    owned_group(store.as_ref(), id, claims.user_id()?).await?;

    store.delete_group(id).await?;
    tracing::info!("Deleted group {} and its items", id);

    Ok(StatusCode::NO_CONTENT)
}
