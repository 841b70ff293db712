//! Infrastructure implementations.
//!
//! Contains port trait implementations for storage and time.

pub mod clock;
pub mod config;
pub mod memory;
pub mod ports;
pub mod sqlite;
