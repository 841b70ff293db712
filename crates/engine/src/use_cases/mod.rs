//! Use cases - User story orchestration.
//!
//! Use cases sequence port calls and apply the rules the stores do not know
//! about (time, capacity).

pub mod meetings;

pub use meetings::MeetingPolicy;
