//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use bgorg_domain::{Attendee, ExternalGroup, ExternalUser, GroupId, Meeting, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::app::App;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route(
            "/api/groups/{group_id}/meeting",
            post(create_meeting).get(get_meeting).delete(delete_meeting),
        )
        .route("/api/groups/{group_id}/meeting/check", post(check_meeting))
        .route("/api/groups/{group_id}/meeting/close", post(close_meeting))
        .route("/api/groups/{group_id}/meetings/closed", get(closed_meetings))
        .route("/api/groups/{group_id}/meeting/attendees", get(get_attendees))
        .route(
            "/api/groups/{group_id}/meeting/attendees/{user_id}",
            put(rsvp),
        )
        .route(
            "/api/groups/{group_id}/meeting/attendees-data",
            get(get_attendees_data).put(set_attendees_data),
        )
        .route("/api/identity/users", post(get_or_create_user))
        .route("/api/identity/users/{user_id}", get(get_external_user))
        .route("/api/identity/groups", post(get_or_create_group))
        .route("/api/identity/groups/{group_id}", get(get_external_group))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Meetings
// =============================================================================

async fn create_meeting(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
    Json(meeting): Json<Meeting>,
) -> Result<(StatusCode, Json<Meeting>), ApiError> {
    app.meetings
        .create_meeting(&group_id, meeting.clone())
        .await?;
    Ok((StatusCode::CREATED, Json(meeting)))
}

async fn check_meeting(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
    Json(meeting): Json<Meeting>,
) -> Result<StatusCode, ApiError> {
    app.meetings.can_create_meeting(&group_id, &meeting).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_meeting(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Meeting>, ApiError> {
    Ok(Json(app.meetings.get_meeting(&group_id).await?))
}

async fn delete_meeting(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
) -> Result<StatusCode, ApiError> {
    app.meetings.delete_meeting(&group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn close_meeting(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
) -> Result<StatusCode, ApiError> {
    app.meetings.close_meeting(&group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn closed_meetings(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<Meeting>>, ApiError> {
    Ok(Json(app.meetings.closed_meetings(&group_id).await?))
}

// =============================================================================
// Attendees
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct AttendeesResponse {
    attendees: Vec<Attendee>,
    occupancy: u64,
}

#[derive(Debug, Deserialize)]
struct RsvpRequest {
    amount: u32,
}

async fn get_attendees(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<AttendeesResponse>, ApiError> {
    let attendees = app.meetings.get_attendees(&group_id).await?;
    let occupancy = attendees.iter().map(|a| u64::from(a.amount)).sum();
    Ok(Json(AttendeesResponse {
        attendees,
        occupancy,
    }))
}

async fn rsvp(
    State(app): State<Arc<App>>,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
    Json(request): Json<RsvpRequest>,
) -> Result<StatusCode, ApiError> {
    app.meetings
        .rsvp(&group_id, Attendee::new(user_id, request.amount))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_attendees_data(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Option<serde_json::Value>>, ApiError> {
    Ok(Json(app.meetings.get_attendees_data(&group_id).await?))
}

async fn set_attendees_data(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
    Json(data): Json<serde_json::Value>,
) -> Result<StatusCode, ApiError> {
    app.meetings.set_attendees_data(&group_id, &data).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Identity
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct UserIdResponse {
    user_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroupIdResponse {
    group_id: GroupId,
}

async fn get_or_create_user(
    State(app): State<Arc<App>>,
    Json(user): Json<ExternalUser>,
) -> Result<Json<UserIdResponse>, ApiError> {
    let user_id = app.identity.get_or_create_user(&user).await?;
    Ok(Json(UserIdResponse { user_id }))
}

async fn get_external_user(
    State(app): State<Arc<App>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ExternalUser>, ApiError> {
    Ok(Json(app.identity.get_external_user(&user_id).await?))
}

async fn get_or_create_group(
    State(app): State<Arc<App>>,
    Json(group): Json<ExternalGroup>,
) -> Result<Json<GroupIdResponse>, ApiError> {
    let group_id = app.identity.get_or_create_group(&group).await?;
    Ok(Json(GroupIdResponse { group_id }))
}

async fn get_external_group(
    State(app): State<Arc<App>>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<ExternalGroup>, ApiError> {
    Ok(Json(app.identity.get_external_group(&group_id).await?))
}
