// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::handlers::data::ProfileView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/whoami - the authenticated caller's profile and skills
pub async fn whoami(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<ProfileView> {
    let profile = state.store.get_profile(user.profile_id).await?;
    let skills = state.store.list_skills(Some(profile.id)).await?;
    Ok(ApiResponse::success(ProfileView { profile, skills }))
}
