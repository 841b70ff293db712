//! Board game organizer domain.
//!
//! Pure types and rules for group meetings, RSVPs and external identities.
//! Nothing in this crate performs I/O; storage and time are supplied by the
//! engine through ports.

pub mod error;
pub mod identity;
pub mod ids;
pub mod meeting;

pub use error::{IdentityError, MeetingError};
pub use identity::{ExternalGroup, ExternalUser, Source};
pub use ids::{GroupId, UserId};
pub use meeting::{taken_by_others, Attendee, Meeting, RsvpChange};
