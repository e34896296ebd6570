use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::put,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
    users::{
        dto::{PatchUserRequest, UpdateUserRequest, UserResponse},
        repo::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users/:id",
        put(update_user).patch(patch_user).delete(delete_user),
    )
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(auth_id): AuthUser,
    Path(id): Path<i64>,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if id != auth_id {
        warn!(auth_id, user_id = id, "update of foreign account rejected");
        return Err(ApiError::Forbidden(
            "you may only update your own account".into(),
        ));
    }

    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    match User::update(&state.db, id, &payload.username, &payload.email).await? {
        Some(user) => {
            info!(user_id = id, "user updated");
            Ok(Json(UserResponse::from(user)))
        }
        None => Err(ApiError::NotFound("User not found".into())),
    }
}

#[instrument(skip(state, payload))]
pub async fn patch_user(
    State(state): State<AppState>,
    AuthUser(auth_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<PatchUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if id != auth_id {
        warn!(auth_id, user_id = id, "update of foreign account rejected");
        return Err(ApiError::Forbidden(
            "you may only update your own account".into(),
        ));
    }

    let username = payload.username.as_deref().map(str::trim);
    let email = payload.email.as_deref().map(|e| e.trim().to_lowercase());

    match User::update_partial(&state.db, id, username, email.as_deref()).await? {
        Some(user) => {
            info!(user_id = id, "user patched");
            Ok(Json(UserResponse::from(user)))
        }
        None => Err(ApiError::NotFound("User not found".into())),
    }
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(auth_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if id != auth_id {
        warn!(auth_id, user_id = id, "delete of foreign account rejected");
        return Err(ApiError::Forbidden(
            "you may only delete your own account".into(),
        ));
    }

    // a repeated DELETE reports the missing row instead of succeeding
    let deleted = User::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
