use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{Profile, ProfileUpdatedResponse, UpdateProfileRequest},
    services,
};
use crate::{
    auth::{dto::UserResponse, extractors::AuthUser},
    error::AppError,
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state, caller))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<UserResponse<Profile>>, AppError> {
    let user = services::get(state.users.as_ref(), &caller).await?;
    Ok(Json(UserResponse { user }))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileUpdatedResponse>, AppError> {
    let Json(payload) = payload?;
    let user = services::update(state.users.as_ref(), &caller, payload).await?;
    Ok(Json(ProfileUpdatedResponse {
        message: "Profile updated successfully",
        user,
    }))
}
