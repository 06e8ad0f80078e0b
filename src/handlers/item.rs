// src/handlers/item.rs

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
        group::owned_group,
    },
    models::item::{CreateItemRequest, NewItem, UpdateItemRequest},
    store::{DynStore, Store},
    utils::jwt::Claims,
};

/// Creates an item. The group must belong to the same exam.
pub async fn create_item(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    owned_exam(store.as_ref(), payload.exam_id, user_id).await?;

    let group = owned_group(store.as_ref(), payload.group_id, user_id).await?;
    if group.exam_id != payload.exam_id {
        return Err(AppError::BadRequest(
            "Group does not belong to this exam".to_string(),
        ));
    }

    let item = store
        .create_item(NewItem {
            name: payload.name,
            image: payload.image,
            exam_id: payload.exam_id,
            group_id: payload.group_id,
        })
        .await?;
    tracing::info!("Created item {} ({}) in exam {}", item.name, item.id, item.exam_id);

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(store): State<DynStore>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let item = store
        .find_item(id)
        .await?
        .ok_or(AppError::NotFound("Item not found".to_string()))?;

    Ok(Json(item))
}

/// Updates name, image or group of an item. Owner of the exam only.
pub async fn update_item(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let item = store
        .find_item(id)
        .await?
        .ok_or(AppError::NotFound("Item not found".to_string()))?;
    owned_exam(store.as_ref(), item.exam_id, user_id).await?;

    let changes = payload.apply_to(&item);
    if changes.group_id != item.group_id {
        let group = owned_group(store.as_ref(), changes.group_id, user_id).await?;
        if group.exam_id != item.exam_id {
            return Err(AppError::BadRequest(
                "Group does not belong to this exam".to_string(),
            ));
        }
    }

    Ok(Json(store.update_item(id, changes).await?))
}

/// Soft-deletes an item. Owner of the exam only.
pub async fn delete_item(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let item = store
        .find_item(id)
        .await?
        .ok_or(AppError::NotFound("Item not found".to_string()))?;
    owned_exam(store.as_ref(), item.exam_id, claims.user_id()?).await?;

    store.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
