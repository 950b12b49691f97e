// handlers/public/auth/role.rs - POST /api/set-role handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service::{RoleAssigned, SetRoleRequest};

/// POST /api/set-role - `{"username", "role"}`
///
/// A role is picked once, as `client` or `freelancer`. Asking again is a
/// 403 whatever role is requested.
pub async fn set_role(
    State(state): State<AppState>,
    payload: Result<Json<SetRoleRequest>, JsonRejection>,
) -> ApiResult<RoleAssigned> {
    let Json(request) = payload?;
    let assigned = state.accounts.set_role(request).await?;
    tracing::info!("Role '{}' assigned to {}", assigned.profile.role, assigned.profile.user_name);
    Ok(ApiResponse::success(assigned))
}
