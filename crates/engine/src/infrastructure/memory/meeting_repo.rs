//! In-memory meeting store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bgorg_domain::{Attendee, GroupId, Meeting, MeetingError, RsvpChange};
use tokio::sync::RwLock;

use crate::infrastructure::ports::MeetingRepo;

/// The active slot of a group. Attendees and the blob belong to the slot, so
/// clearing the slot clears them too.
struct ActiveMeeting {
    meeting: Meeting,
    attendees: Vec<Attendee>,
    attendees_data: Option<Vec<u8>>,
}

#[derive(Default)]
struct Tables {
    active: HashMap<GroupId, ActiveMeeting>,
    closed: HashMap<GroupId, Vec<Meeting>>,
}

/// Keyed-table meeting store. Every operation holds the table lock for its
/// whole duration.
#[derive(Clone, Default)]
pub struct InMemoryMeetingRepo {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryMeetingRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeetingRepo for InMemoryMeetingRepo {
    async fn create_meeting(
        &self,
        group_id: &GroupId,
        meeting: &Meeting,
    ) -> Result<(), MeetingError> {
        let mut tables = self.tables.write().await;
        if tables.active.contains_key(group_id) {
            return Err(MeetingError::MeetingAlreadyActive);
        }
        tables.active.insert(
            group_id.clone(),
            ActiveMeeting {
                meeting: meeting.clone(),
                attendees: Vec::new(),
                attendees_data: None,
            },
        );
        Ok(())
    }

    async fn delete_meeting(&self, group_id: &GroupId) -> Result<(), MeetingError> {
        let mut tables = self.tables.write().await;
        tables
            .active
            .remove(group_id)
            .map(|_| ())
            .ok_or(MeetingError::NoActiveMeeting)
    }

    async fn get_meeting(&self, group_id: &GroupId) -> Result<Meeting, MeetingError> {
        let tables = self.tables.read().await;
        tables
            .active
            .get(group_id)
            .map(|active| active.meeting.clone())
            .ok_or(MeetingError::NoActiveMeeting)
    }

    async fn close_meeting(&self, group_id: &GroupId) -> Result<(), MeetingError> {
        let mut tables = self.tables.write().await;
        let active = tables
            .active
            .remove(group_id)
            .ok_or(MeetingError::NoActiveMeeting)?;
        tables
            .closed
            .entry(group_id.clone())
            .or_default()
            .push(active.meeting);
        Ok(())
    }

    async fn closed_meetings(&self, group_id: &GroupId) -> Result<Vec<Meeting>, MeetingError> {
        let tables = self.tables.read().await;
        Ok(tables.closed.get(group_id).cloned().unwrap_or_default())
    }

    async fn rsvp(&self, group_id: &GroupId, attendee: &Attendee) -> Result<(), MeetingError> {
        let mut tables = self.tables.write().await;
        let active = tables
            .active
            .get_mut(group_id)
            .ok_or(MeetingError::NoActiveMeeting)?;

        let position = active
            .attendees
            .iter()
            .position(|existing| existing.user_id == attendee.user_id);
        let current = position.map(|index| active.attendees[index].amount);

        match (RsvpChange::resolve(current, attendee.amount)?, position) {
            (RsvpChange::Set(amount), Some(index)) => active.attendees[index].amount = amount,
            (RsvpChange::Set(amount), None) => active
                .attendees
                .push(Attendee::new(attendee.user_id.clone(), amount)),
            (RsvpChange::Remove, Some(index)) => {
                active.attendees.remove(index);
            }
            // resolve() never removes a user without a record
            (RsvpChange::Remove, None) => {}
        }
        Ok(())
    }

    async fn get_attendees(&self, group_id: &GroupId) -> Result<Vec<Attendee>, MeetingError> {
        let tables = self.tables.read().await;
        tables
            .active
            .get(group_id)
            .map(|active| active.attendees.clone())
            .ok_or(MeetingError::NoActiveMeeting)
    }

    async fn set_attendees_data(
        &self,
        group_id: &GroupId,
        data: Vec<u8>,
    ) -> Result<(), MeetingError> {
        let mut tables = self.tables.write().await;
        let active = tables
            .active
            .get_mut(group_id)
            .ok_or(MeetingError::NoActiveMeeting)?;
        active.attendees_data = Some(data);
        Ok(())
    }

    async fn get_attendees_data(
        &self,
        group_id: &GroupId,
    ) -> Result<Option<Vec<u8>>, MeetingError> {
        let tables = self.tables.read().await;
        tables
            .active
            .get(group_id)
            .map(|active| active.attendees_data.clone())
            .ok_or(MeetingError::NoActiveMeeting)
    }
}
