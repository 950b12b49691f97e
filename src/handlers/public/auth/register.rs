// handlers/public/auth/register.rs - POST /api/register handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service::{RegisterRequest, Registered};

/// POST /api/register - create an account and its (role-less) profile
///
/// Input: `{"username", "email", "password"}`, all required.
/// Duplicate user names or e-mails are rejected with 400.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Registered> {
    let Json(request) = payload?;
    let registered = state.accounts.register(request).await?;
    Ok(ApiResponse::created(registered))
}
