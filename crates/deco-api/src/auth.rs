use axum::{Json, extract::State};
use tracing::{debug, info};
use uuid::Uuid;

use deco_types::api::{UserAuthRequest, UserResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /signup. Passwords are stored and compared as given.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<UserAuthRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let UserAuthRequest { username, password } = req;
    let user_id = Uuid::new_v4().to_string();

    let id = user_id.clone();
    let name = username.clone();
    let created = state
        .with_db(move |db| {
            // Fast path; the UNIQUE constraint catches anyone racing past this.
            if db.get_user_by_username(&name)?.is_some() {
                return Ok(false);
            }
            db.create_user(&id, &name, &password)
        })
        .await?;

    if !created {
        debug!("Signup rejected, username '{}' taken", username);
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    info!("Registered user {} ({})", username, user_id);
    Ok(Json(UserResponse {
        id: user_id,
        username,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<UserAuthRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .with_db(move |db| db.find_user_by_credentials(&req.username, &req.password))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(UserResponse {
        id: user.id,
        username: user.username,
    }))
}
