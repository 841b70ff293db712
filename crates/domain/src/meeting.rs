//! Meetings and attendance.
//!
//! A group has at most one active meeting. The active meeting retires (closes)
//! once its start time is reached; closed meetings are kept as history and are
//! never reactivated. The rule functions here are pure so that every store
//! backend and the policy engine agree on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MeetingError;
use crate::ids::UserId;

/// A scheduled meeting for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    /// Seats available. 0 means unlimited.
    #[serde(default)]
    pub capacity: u32,
}

impl Meeting {
    pub fn new(starts_at: DateTime<Utc>, location: impl Into<String>) -> Self {
        Self {
            starts_at,
            location: location.into(),
            capacity: 0,
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn is_unlimited(&self) -> bool {
        self.capacity == 0
    }

    /// Auto-close predicate: the meeting is over once its start time is at or
    /// before `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now
    }

    /// A meeting can only be scheduled strictly after `now`.
    pub fn is_in_the_past(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now
    }

    /// Whether `amount` more seats fit when `taken` are already reserved by
    /// other users.
    pub fn admits(&self, taken: u64, amount: u32) -> bool {
        self.is_unlimited() || taken + u64::from(amount) <= u64::from(self.capacity)
    }
}

/// A user's reservation. An amount of 0 means "not attending" and is never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub user_id: UserId,
    pub amount: u32,
}

impl Attendee {
    pub fn new(user_id: impl Into<UserId>, amount: u32) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
        }
    }
}

/// Seats reserved by everyone except `user_id`.
pub fn taken_by_others(attendees: &[Attendee], user_id: &UserId) -> u64 {
    attendees
        .iter()
        .filter(|attendee| &attendee.user_id != user_id)
        .map(|attendee| u64::from(attendee.amount))
        .sum()
}

/// Storage action for an RSVP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpChange {
    /// Create or update the record with this (non-zero) amount.
    Set(u32),
    /// Drop the record.
    Remove,
}

impl RsvpChange {
    /// Decide what an RSVP does given the user's current amount (`None` when
    /// the user has no record).
    pub fn resolve(current: Option<u32>, requested: u32) -> Result<Self, MeetingError> {
        match current {
            None if requested == 0 => Err(MeetingError::UserDoesNotAttendMeeting),
            Some(current) if current == requested => {
                if requested == 0 {
                    Err(MeetingError::UserDoesNotAttendMeeting)
                } else {
                    Err(MeetingError::UserAlreadyAttendsMeeting)
                }
            }
            _ if requested == 0 => Ok(Self::Remove),
            _ => Ok(Self::Set(requested)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 5, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn meeting_starts_exactly_at_its_time() {
        let meeting = Meeting::new(at(2, 20), "Home");
        assert!(!meeting.has_started(at(2, 19)));
        assert!(meeting.has_started(at(2, 20)));
        assert!(meeting.has_started(at(3, 0)));
    }

    #[test]
    fn scheduling_for_now_is_in_the_past() {
        let meeting = Meeting::new(at(1, 17), "Home");
        assert!(meeting.is_in_the_past(at(1, 17)));
        assert!(!meeting.is_in_the_past(at(1, 16)));
    }

    #[test]
    fn zero_capacity_admits_everyone() {
        let meeting = Meeting::new(at(2, 20), "Home");
        assert!(meeting.admits(1_000, 50));
    }

    #[test]
    fn capacity_checks_prospective_total() {
        let meeting = Meeting::new(at(2, 20), "Home").with_capacity(3);
        assert!(meeting.admits(2, 1));
        assert!(!meeting.admits(2, 2));
        assert!(meeting.admits(3, 0));
    }

    #[test]
    fn taken_excludes_the_requesting_user() {
        let attendees = vec![Attendee::new("a", 2), Attendee::new("b", 1)];
        assert_eq!(taken_by_others(&attendees, &UserId::from("a")), 1);
        assert_eq!(taken_by_others(&attendees, &UserId::from("c")), 3);
    }

    #[test]
    fn rsvp_resolution() {
        assert_eq!(
            RsvpChange::resolve(None, 0),
            Err(MeetingError::UserDoesNotAttendMeeting)
        );
        assert_eq!(
            RsvpChange::resolve(Some(0), 0),
            Err(MeetingError::UserDoesNotAttendMeeting)
        );
        assert_eq!(
            RsvpChange::resolve(Some(2), 2),
            Err(MeetingError::UserAlreadyAttendsMeeting)
        );
        assert_eq!(RsvpChange::resolve(None, 1), Ok(RsvpChange::Set(1)));
        assert_eq!(RsvpChange::resolve(Some(1), 3), Ok(RsvpChange::Set(3)));
        assert_eq!(RsvpChange::resolve(Some(3), 0), Ok(RsvpChange::Remove));
    }

    #[test]
    fn missing_location_and_capacity_default() {
        let meeting: Meeting =
            serde_json::from_str(r#"{"starts_at":"2019-05-02T20:00:00Z"}"#).unwrap();
        assert_eq!(meeting.location, "");
        assert!(meeting.is_unlimited());
    }
}
