//! Meeting policy engine.
//!
//! Wraps a [`MeetingRepo`] and adds every time- and capacity-aware rule:
//!
//! - a meeting can only be scheduled strictly in the future
//! - a meeting retires the first time anyone looks at it after it starts
//!   (there is no timer; expiry is checked on demand)
//! - RSVPs are admitted against the meeting's capacity
//!
//! The policy never persists anything itself. It sequences store calls and
//! reports the store's errors verbatim, with one substitution: a meeting that
//! was just auto-closed is reported as `NoActiveMeeting`.

use std::sync::Arc;

use bgorg_domain::{taken_by_others, Attendee, GroupId, Meeting, MeetingError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::locks::GroupLocks;
use crate::infrastructure::ports::{ClockPort, MeetingRepo};

pub struct MeetingPolicy {
    repo: Arc<dyn MeetingRepo>,
    clock: Arc<dyn ClockPort>,
    locks: GroupLocks,
}

impl MeetingPolicy {
    pub fn new(repo: Arc<dyn MeetingRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            repo,
            clock,
            locks: GroupLocks::new(),
        }
    }

    /// Auto-close check for readers that do not hold the group's lock.
    ///
    /// A future meeting is returned as is. A started one is looked at again
    /// under the lock before closing, because a concurrent create may have
    /// replaced it with the group's next meeting in the meantime.
    async fn active_meeting(
        &self,
        group_id: &GroupId,
        now: DateTime<Utc>,
    ) -> Result<Meeting, MeetingError> {
        let meeting = self.repo.get_meeting(group_id).await?;
        if !meeting.has_started(now) {
            return Ok(meeting);
        }

        let _guard = self.locks.lock(group_id).await;
        self.active_meeting_locked(group_id, now).await
    }

    /// Auto-close check. The caller must hold the group's lock, so the
    /// meeting read here is the one that gets closed.
    async fn active_meeting_locked(
        &self,
        group_id: &GroupId,
        now: DateTime<Utc>,
    ) -> Result<Meeting, MeetingError> {
        let meeting = self.repo.get_meeting(group_id).await?;
        if !meeting.has_started(now) {
            return Ok(meeting);
        }

        match self.repo.close_meeting(group_id).await {
            // Another writer on the same store closed it first; same outcome.
            Ok(()) | Err(MeetingError::NoActiveMeeting) => {
                tracing::info!(
                    group_id = %group_id,
                    starts_at = %meeting.starts_at,
                    "Auto-closed meeting after its start time"
                );
                Err(MeetingError::NoActiveMeeting)
            }
            Err(e) => Err(e),
        }
    }

    /// Shared by create and can-create: turns the auto-close outcome into the
    /// still-active meeting, if any, then applies the past check.
    fn validate_new_meeting(
        active: Result<Meeting, MeetingError>,
        meeting: &Meeting,
        now: DateTime<Utc>,
    ) -> Result<Option<Meeting>, MeetingError> {
        let active = match active {
            Ok(active) => Some(active),
            Err(MeetingError::NoActiveMeeting) => None,
            Err(e) => return Err(e),
        };

        if meeting.is_in_the_past(now) {
            return Err(MeetingError::MeetingIsInThePast);
        }
        Ok(active)
    }

    /// Schedule `meeting` as the group's active meeting.
    ///
    /// A previous meeting that has already started is retired first, so a
    /// group can schedule its next session as soon as the last one begins.
    pub async fn create_meeting(
        &self,
        group_id: &GroupId,
        meeting: Meeting,
    ) -> Result<(), MeetingError> {
        let _guard = self.locks.lock(group_id).await;
        let now = self.clock.now();

        let active = self.active_meeting_locked(group_id, now).await;
        Self::validate_new_meeting(active, &meeting, now)?;
        self.repo.create_meeting(group_id, &meeting).await?;

        tracing::info!(
            group_id = %group_id,
            starts_at = %meeting.starts_at,
            capacity = meeting.capacity,
            "Meeting created"
        );
        Ok(())
    }

    /// Report the error `create_meeting` would return, without creating
    /// anything. The only side effect is the auto-close check.
    pub async fn can_create_meeting(
        &self,
        group_id: &GroupId,
        meeting: &Meeting,
    ) -> Result<(), MeetingError> {
        let now = self.clock.now();
        let active = self.active_meeting(group_id, now).await;
        match Self::validate_new_meeting(active, meeting, now)? {
            Some(_) => Err(MeetingError::MeetingAlreadyActive),
            None => Ok(()),
        }
    }

    pub async fn get_meeting(&self, group_id: &GroupId) -> Result<Meeting, MeetingError> {
        self.active_meeting(group_id, self.clock.now()).await
    }

    pub async fn delete_meeting(&self, group_id: &GroupId) -> Result<(), MeetingError> {
        let _guard = self.locks.lock(group_id).await;
        self.repo.delete_meeting(group_id).await
    }

    /// Retire the active meeting now, whether or not it has started.
    pub async fn close_meeting(&self, group_id: &GroupId) -> Result<(), MeetingError> {
        let _guard = self.locks.lock(group_id).await;
        self.repo.close_meeting(group_id).await
    }

    /// Closed meetings, oldest first, including one retired by this call.
    pub async fn closed_meetings(&self, group_id: &GroupId) -> Result<Vec<Meeting>, MeetingError> {
        match self.active_meeting(group_id, self.clock.now()).await {
            Ok(_) | Err(MeetingError::NoActiveMeeting) => {}
            Err(e) => return Err(e),
        }
        self.repo.closed_meetings(group_id).await
    }

    /// Create, update or cancel a reservation.
    ///
    /// Capacity is checked against the prospective total, so lowering or
    /// cancelling one's own reservation is always allowed. The read of the
    /// current attendees and the write happen under the group's lock, so
    /// concurrent RSVPs cannot overshoot capacity.
    pub async fn rsvp(&self, group_id: &GroupId, attendee: Attendee) -> Result<(), MeetingError> {
        let _guard = self.locks.lock(group_id).await;
        let now = self.clock.now();

        let meeting = self.active_meeting_locked(group_id, now).await?;
        let attendees = self.repo.get_attendees(group_id).await?;
        let taken = taken_by_others(&attendees, &attendee.user_id);

        if !meeting.admits(taken, attendee.amount) {
            tracing::debug!(
                group_id = %group_id,
                user_id = %attendee.user_id,
                taken,
                requested = attendee.amount,
                capacity = meeting.capacity,
                "RSVP rejected, meeting is full"
            );
            return Err(MeetingError::MeetingIsFull);
        }

        self.repo.rsvp(group_id, &attendee).await
    }

    pub async fn get_attendees(&self, group_id: &GroupId) -> Result<Vec<Attendee>, MeetingError> {
        self.active_meeting(group_id, self.clock.now()).await?;
        self.repo.get_attendees(group_id).await
    }

    /// Store caller-defined side data for the active meeting.
    pub async fn set_attendees_data<T: Serialize + ?Sized + Sync>(
        &self,
        group_id: &GroupId,
        data: &T,
    ) -> Result<(), MeetingError> {
        let _guard = self.locks.lock(group_id).await;
        self.active_meeting_locked(group_id, self.clock.now()).await?;
        let bytes = serde_json::to_vec(data).map_err(|e| {
            tracing::error!(group_id = %group_id, error = %e, "Failed to serialize attendees data");
            MeetingError::Unexpected
        })?;
        self.repo.set_attendees_data(group_id, bytes).await
    }

    /// Side data for the active meeting. `Ok(None)` when none was set; the
    /// caller keeps its own default.
    pub async fn get_attendees_data<T: DeserializeOwned>(
        &self,
        group_id: &GroupId,
    ) -> Result<Option<T>, MeetingError> {
        self.active_meeting(group_id, self.clock.now()).await?;
        let Some(bytes) = self.repo.get_attendees_data(group_id).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            tracing::error!(group_id = %group_id, error = %e, "Failed to deserialize attendees data");
            MeetingError::Unexpected
        })
    }
}
