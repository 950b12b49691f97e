use axum::extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{NewSkill, Skill, SkillPatch};
use crate::middleware::{ApiResponse, ApiResult};

use super::views::{non_blank, reference};

#[derive(Debug, Default, Deserialize)]
pub struct SkillQuery {
    pub profile: Option<i64>,
}

/// GET /api/skills[?profile=]
pub async fn list(State(state): State<AppState>, query: Result<Query<SkillQuery>, QueryRejection>) -> ApiResult<Vec<Skill>> {
    let Query(query) = query?;
    Ok(ApiResponse::success(state.store.list_skills(query.profile).await?))
}

/// POST /api/skills
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewSkill>, JsonRejection>,
) -> ApiResult<Skill> {
    let Json(body) = payload?;
    non_blank(&body.name, "name")?;
    reference(state.store.get_profile(body.profile).await, "profile")?;

    let skill = state.store.create_skill(body).await?;
    Ok(ApiResponse::created(skill))
}

/// GET /api/skills/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Skill> {
    Ok(ApiResponse::success(state.store.get_skill(id).await?))
}

/// PUT/PATCH /api/skills/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<SkillPatch>, JsonRejection>,
) -> ApiResult<Skill> {
    let Json(patch) = payload?;
    if let Some(name) = &patch.name {
        non_blank(name, "name")?;
    }
    Ok(ApiResponse::success(state.store.update_skill(id, patch).await?))
}

/// DELETE /api/skills/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_skill(id).await?;
    Ok(ApiResponse::no_content())
}
