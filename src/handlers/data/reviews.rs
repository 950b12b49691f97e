// handlers/data/reviews.rs - /api/reviews handlers

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;

use crate::app::AppState;
use crate::database::models::review::{MAX_RATING, MIN_RATING};
use crate::database::models::{NewReview, ReviewPatch};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::observer::DomainEvent;

use super::views::{reference, Names, ReviewView};

fn rating_out_of_range() -> ApiError {
    ApiError::field_error(
        "rating",
        format!("Rating must be between {} and {}.", MIN_RATING, MAX_RATING),
    )
}

/// GET /api/reviews - newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ReviewView>> {
    let reviews = state.store.list_reviews().await?;
    let mut names = Names::new(state.store.as_ref());
    let mut views = Vec::with_capacity(reviews.len());
    for review in reviews {
        views.push(names.review_view(review).await?);
    }
    Ok(ApiResponse::success(views))
}

/// POST /api/reviews - persists, then notifies the reviewee
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> ApiResult<ReviewView> {
    let Json(body) = payload?;
    if !body.rating_in_range() {
        return Err(rating_out_of_range());
    }
    let reviewer = reference(state.store.get_profile(body.reviewer).await, "reviewer")?;
    reference(state.store.get_profile(body.reviewee).await, "reviewee")?;
    let project = reference(state.store.get_project(body.project).await, "project")?;

    let review = state.store.create_review(body).await?;
    tracing::info!(
        "Review {} ({} stars) by {} on project {}",
        review.id,
        review.rating,
        reviewer.user_name,
        project.id
    );

    state
        .notify(DomainEvent::ReviewCreated {
            review: review.clone(),
            reviewer_name: reviewer.user_name,
            project_title: project.title,
        })
        .await;

    let view = Names::new(state.store.as_ref()).review_view(review).await?;
    Ok(ApiResponse::created(view))
}

/// GET /api/reviews/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ReviewView> {
    let review = state.store.get_review(id).await?;
    let view = Names::new(state.store.as_ref()).review_view(review).await?;
    Ok(ApiResponse::success(view))
}

/// PUT/PATCH /api/reviews/:id - rating and comment only, no new notification
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ReviewPatch>, JsonRejection>,
) -> ApiResult<ReviewView> {
    let Json(patch) = payload?;
    if !patch.rating_in_range() {
        return Err(rating_out_of_range());
    }
    let review = state.store.update_review(id, patch).await?;
    let view = Names::new(state.store.as_ref()).review_view(review).await?;
    Ok(ApiResponse::success(view))
}

/// DELETE /api/reviews/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_review(id).await?;
    Ok(ApiResponse::no_content())
}
