//! Repository port traits for storage access.

use std::collections::HashMap;

use async_trait::async_trait;
use bgorg_domain::{
    Attendee, ExternalGroup, ExternalUser, GroupId, IdentityError, Meeting, MeetingError, UserId,
};

// =============================================================================
// Meeting Storage
// =============================================================================

/// Durable keyed storage of one active meeting per group, its closed-meeting
/// history, the attendee set and an opaque side-data blob.
///
/// Implementations enforce only uniqueness (one active meeting per group) and
/// referential checks (attendee and blob operations need an active meeting).
/// Time-based rules belong to the policy engine. Every operation is atomic on
/// its own. Storage faults are logged by the implementation and reported as
/// [`MeetingError::Unexpected`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingRepo: Send + Sync {
    /// `MeetingAlreadyActive` if the group already has an active meeting.
    async fn create_meeting(&self, group_id: &GroupId, meeting: &Meeting)
        -> Result<(), MeetingError>;

    /// Removes the active meeting, its attendees and its blob. History is kept.
    async fn delete_meeting(&self, group_id: &GroupId) -> Result<(), MeetingError>;

    /// The active meeting, unchanged. No time logic.
    async fn get_meeting(&self, group_id: &GroupId) -> Result<Meeting, MeetingError>;

    /// Moves the active meeting into history and clears its attendees and blob.
    async fn close_meeting(&self, group_id: &GroupId) -> Result<(), MeetingError>;

    /// Closed meetings, oldest first. Empty when the group has none.
    async fn closed_meetings(&self, group_id: &GroupId) -> Result<Vec<Meeting>, MeetingError>;

    /// Upserts the attendee's amount; 0 removes the record. See
    /// [`bgorg_domain::RsvpChange::resolve`] for the error cases.
    async fn rsvp(&self, group_id: &GroupId, attendee: &Attendee) -> Result<(), MeetingError>;

    async fn get_attendees(&self, group_id: &GroupId) -> Result<Vec<Attendee>, MeetingError>;

    async fn set_attendees_data(
        &self,
        group_id: &GroupId,
        data: Vec<u8>,
    ) -> Result<(), MeetingError>;

    /// `Ok(None)` when the active meeting has no blob yet.
    async fn get_attendees_data(&self, group_id: &GroupId)
        -> Result<Option<Vec<u8>>, MeetingError>;
}

// =============================================================================
// Identity Storage
// =============================================================================

/// Maps external platform identities to stable internal ids.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityRepo: Send + Sync {
    /// Idempotent on `(id, source)`; refreshes the display name.
    async fn get_or_create_user(&self, user: &ExternalUser) -> Result<UserId, IdentityError>;
    async fn get_external_user(&self, user_id: &UserId) -> Result<ExternalUser, IdentityError>;

    /// Idempotent on `(id, source)`.
    async fn get_or_create_group(&self, group: &ExternalGroup) -> Result<GroupId, IdentityError>;
    async fn get_external_group(&self, group_id: &GroupId)
        -> Result<ExternalGroup, IdentityError>;

    /// Unknown ids are left out of the result.
    async fn get_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, ExternalUser>, IdentityError>;
}
