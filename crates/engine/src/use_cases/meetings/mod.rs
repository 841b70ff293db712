//! Meeting lifecycle use cases.

mod locks;
mod policy;

pub use locks::GroupLocks;
pub use policy::MeetingPolicy;
