use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;

use crate::app::AppState;
use crate::database::models::{NewProject, Project, ProjectPatch};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::observer::DomainEvent;

use super::views::{non_blank, reference};

fn check_numbers(duration: Option<i32>, budget: Option<rust_decimal::Decimal>) -> Result<(), ApiError> {
    if duration.is_some_and(|d| d < 0) {
        return Err(ApiError::field_error("duration", "Ensure this value is greater than or equal to 0."));
    }
    if budget.is_some_and(|b| b.is_sign_negative()) {
        return Err(ApiError::field_error("budget", "Ensure this value is greater than or equal to 0."));
    }
    Ok(())
}

/// GET /api/projects
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    Ok(ApiResponse::success(state.store.list_projects().await?))
}

/// POST /api/projects - persists, then announces the project to freelancers
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<Project> {
    let Json(body) = payload?;
    non_blank(&body.title, "title")?;
    check_numbers(body.duration, body.budget)?;
    reference(state.store.get_profile(body.owner).await, "owner")?;

    let project = state.store.create_project(body).await?;
    tracing::info!("Created project {} '{}'", project.id, project.title);

    state
        .notify(DomainEvent::ProjectCreated {
            project: project.clone(),
        })
        .await;

    Ok(ApiResponse::created(project))
}

/// GET /api/projects/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Project> {
    Ok(ApiResponse::success(state.store.get_project(id).await?))
}

/// PUT/PATCH /api/projects/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ProjectPatch>, JsonRejection>,
) -> ApiResult<Project> {
    let Json(patch) = payload?;
    if let Some(title) = &patch.title {
        non_blank(title, "title")?;
    }
    check_numbers(patch.duration, patch.budget)?;
    Ok(ApiResponse::success(state.store.update_project(id, patch).await?))
}

/// DELETE /api/projects/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_project(id).await?;
    Ok(ApiResponse::no_content())
}
