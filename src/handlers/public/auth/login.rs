// handlers/public/auth/login.rs - POST /api/login handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service::{LoginRequest, TokenPair};

/// POST /api/login - exchange credentials for an access/refresh token pair
///
/// Any failure, including missing fields, is a 401 with the same message so
/// callers cannot tell which user names exist.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    let tokens = state.accounts.login(request).await?;
    Ok(ApiResponse::success(tokens))
}
