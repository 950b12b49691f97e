use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{NewProfile, Profile, ProfilePatch};
use crate::database::store::EntityStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::views::{non_blank, ProfileView};

/// Profile body; `skill_names` replaces the profile's skills when present
#[derive(Debug, Deserialize)]
pub struct ProfileCreate {
    #[serde(flatten)]
    pub profile: NewProfile,
    #[serde(default)]
    pub skill_names: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    #[serde(flatten)]
    pub patch: ProfilePatch,
    #[serde(default)]
    pub skill_names: Option<Vec<String>>,
}

async fn view(store: &dyn EntityStore, profile: Profile) -> Result<ProfileView, ApiError> {
    let skills = store.list_skills(Some(profile.id)).await?;
    Ok(ProfileView { profile, skills })
}

/// GET /api/profiles
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ProfileView>> {
    let profiles = state.store.list_profiles(None).await?;
    let mut views = Vec::with_capacity(profiles.len());
    for profile in profiles {
        views.push(view(state.store.as_ref(), profile).await?);
    }
    Ok(ApiResponse::success(views))
}

/// POST /api/profiles
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ProfileCreate>, JsonRejection>,
) -> ApiResult<ProfileView> {
    let Json(body) = payload?;
    non_blank(&body.profile.user_name, "user_name")?;
    non_blank(&body.profile.email, "email")?;

    let profile = state.store.create_profile(body.profile).await?;
    if let Some(names) = body.skill_names {
        state.store.replace_skills(profile.id, names).await?;
    }

    tracing::info!("Created profile {} ({})", profile.id, profile.user_name);
    Ok(ApiResponse::created(view(state.store.as_ref(), profile).await?))
}

/// GET /api/profiles/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ProfileView> {
    let profile = state.store.get_profile(id).await?;
    Ok(ApiResponse::success(view(state.store.as_ref(), profile).await?))
}

/// PUT/PATCH /api/profiles/:id. The role is never changed here.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<ProfileView> {
    let Json(body) = payload?;
    if let Some(user_name) = &body.patch.user_name {
        non_blank(user_name, "user_name")?;
    }
    if let Some(email) = &body.patch.email {
        non_blank(email, "email")?;
    }

    let profile = state.store.update_profile(id, body.patch).await?;
    if let Some(names) = body.skill_names {
        state.store.replace_skills(profile.id, names).await?;
    }
    Ok(ApiResponse::success(view(state.store.as_ref(), profile).await?))
}

/// DELETE /api/profiles/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_profile(id).await?;
    tracing::info!("Deleted profile {}", id);
    Ok(ApiResponse::no_content())
}
