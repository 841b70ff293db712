//! Error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bgorg_domain::{IdentityError, MeetingError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    Meeting(MeetingError),
    Identity(IdentityError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Meeting(e) => match e {
                MeetingError::NoActiveMeeting => StatusCode::NOT_FOUND,
                MeetingError::MeetingIsInThePast => StatusCode::UNPROCESSABLE_ENTITY,
                MeetingError::MeetingAlreadyActive
                | MeetingError::MeetingIsFull
                | MeetingError::UserAlreadyAttendsMeeting
                | MeetingError::UserDoesNotAttendMeeting => StatusCode::CONFLICT,
                MeetingError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Identity(e) => match e {
                IdentityError::UserNotFound | IdentityError::GroupNotFound => {
                    StatusCode::NOT_FOUND
                }
                IdentityError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Meeting(e) => ErrorBody {
                error: e.code(),
                message: e.to_string(),
            },
            ApiError::Identity(e) => ErrorBody {
                error: e.code(),
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<MeetingError> for ApiError {
    fn from(e: MeetingError) -> Self {
        ApiError::Meeting(e)
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        ApiError::Identity(e)
    }
}
