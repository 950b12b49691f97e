// handlers/public/auth/refresh.rs - POST /api/token/refresh handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service::{AccessToken, RefreshRequest};

/// POST /api/token/refresh - `{"refresh"}` → `{"access"}`
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<AccessToken> {
    let Json(request) = payload?;
    Ok(ApiResponse::success(state.accounts.refresh(request)?))
}
