//! Error vocabulary shared by every meeting store and the policy engine.
//!
//! Every variant except [`MeetingError::Unexpected`] is an expected outcome of
//! a business rule and is reported to the caller as-is. Storage faults are
//! logged where they happen and collapse into `Unexpected` before they leave
//! the store.

use thiserror::Error;

/// Closed set of meeting failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MeetingError {
    #[error("Group has no active meeting")]
    NoActiveMeeting,

    #[error("Group can only have one active meeting at a time")]
    MeetingAlreadyActive,

    #[error("Meetings can only be created in the future")]
    MeetingIsInThePast,

    #[error("Meeting is full")]
    MeetingIsFull,

    #[error("User is already attending meeting")]
    UserAlreadyAttendsMeeting,

    #[error("User is not attending meeting")]
    UserDoesNotAttendMeeting,

    /// Storage fault (connectivity, serialization). Only retrying the whole
    /// operation can help.
    #[error("Unexpected error")]
    Unexpected,
}

impl MeetingError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoActiveMeeting => "no_active_meeting",
            Self::MeetingAlreadyActive => "meeting_already_active",
            Self::MeetingIsInThePast => "meeting_is_in_the_past",
            Self::MeetingIsFull => "meeting_is_full",
            Self::UserAlreadyAttendsMeeting => "user_already_attends_meeting",
            Self::UserDoesNotAttendMeeting => "user_does_not_attend_meeting",
            Self::Unexpected => "unexpected_error",
        }
    }
}

/// Failures of the identity collaborator.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    #[error("User not found")]
    UserNotFound,

    #[error("Group not found")]
    GroupNotFound,

    #[error("Unexpected error")]
    Unexpected,
}

impl IdentityError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::GroupNotFound => "group_not_found",
            Self::Unexpected => "unexpected_error",
        }
    }
}
