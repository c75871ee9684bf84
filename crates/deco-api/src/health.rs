use axum::{Json, extract::State};

use deco_types::api::StatusResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// GET / — reports 503 until a store was opened at startup.
pub async fn health(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    state.store.db()?;
    Ok(Json(StatusResponse {
        status: "DecoMyTree API running & DB Connected".into(),
    }))
}
