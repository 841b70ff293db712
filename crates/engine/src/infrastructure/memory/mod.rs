//! In-memory implementations for development and testing.
//!
//! Nothing here is persisted; state lives as long as the process.

mod identity_repo;
mod meeting_repo;

pub use identity_repo::InMemoryIdentityRepo;
pub use meeting_repo::InMemoryMeetingRepo;
