use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use uuid::Uuid;

use lectern_core::events::EventGroup;
use lectern_core::storage::RepositoryError;

use crate::{handlers::AppError, models::CreateGroup, state::AppState};

/// List all event groups (GET /api/groups).
pub async fn list_groups(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let groups = state.groups.list_groups().await?;
    Ok(Json(groups))
}

/// Create a new event group (POST /api/groups).
pub async fn create_group(
    State(state): State<AppState>,
    Form(payload): Form<CreateGroup>,
) -> Result<impl IntoResponse, AppError> {
    let group = payload.into_group()?;
    state.groups.create_group(&group).await?;

    tracing::info!(group_id = %group.id, title = %group.title, "Created event group");

    Ok((StatusCode::CREATED, Json(group)))
}

/// Get a single group with its events (GET /api/groups/{id}).
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let group = state
        .groups
        .get_group(id)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity_type: "EventGroup",
            id: id.to_string(),
        })?;
    let events = state.events.get_events_by_group(id).await?;

    Ok(Json(GroupDetail { group, events }))
}

/// Delete a group by ID (DELETE /api/groups/{id}).
///
/// The group's events survive with their group reference cleared.
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.groups.delete_group(id).await?;

    tracing::info!(group_id = %id, "Deleted event group");

    Ok(StatusCode::OK)
}

/// Group plus the events it owns.
#[derive(Debug, serde::Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: EventGroup,
    pub events: Vec<lectern_core::events::Event>,
}
