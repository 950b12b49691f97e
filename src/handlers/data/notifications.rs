// handlers/data/notifications.rs - /api/notifications handlers
//
// Notifications are only ever created by the dispatcher, so there is no POST.

use axum::extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::NotificationPatch;
use crate::middleware::{ApiResponse, ApiResult};

use super::views::{Names, NotificationView};

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub user_name: Option<String>,
}

/// GET /api/notifications[?user_name=] - newest first
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<NotificationQuery>, QueryRejection>,
) -> ApiResult<Vec<NotificationView>> {
    let Query(query) = query?;
    let user = match query.user_name.as_deref() {
        Some(user_name) => match state.store.find_profile_by_user_name(user_name).await? {
            Some(profile) => Some(profile.id),
            None => return Ok(ApiResponse::success(Vec::new())),
        },
        None => None,
    };

    let notifications = state.store.list_notifications(user).await?;
    let mut names = Names::new(state.store.as_ref());
    let mut views = Vec::with_capacity(notifications.len());
    for notification in notifications {
        views.push(names.notification_view(notification).await?);
    }
    Ok(ApiResponse::success(views))
}

/// GET /api/notifications/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<NotificationView> {
    let notification = state.store.get_notification(id).await?;
    let view = Names::new(state.store.as_ref()).notification_view(notification).await?;
    Ok(ApiResponse::success(view))
}

/// PATCH /api/notifications/:id - mark read or unread
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<NotificationPatch>, JsonRejection>,
) -> ApiResult<NotificationView> {
    let Json(patch) = payload?;
    let notification = state.store.update_notification(id, patch).await?;
    let view = Names::new(state.store.as_ref()).notification_view(notification).await?;
    Ok(ApiResponse::success(view))
}

/// DELETE /api/notifications/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_notification(id).await?;
    Ok(ApiResponse::no_content())
}
