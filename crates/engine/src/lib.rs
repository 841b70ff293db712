//! Board game organizer engine library.
//!
//! ## Structure
//!
//! - `use_cases/` - Meeting policy (auto-close, past check, capacity)
//! - `infrastructure/` - Ports and their storage adapters (in-memory, SQLite)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
