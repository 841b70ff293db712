//! SQLite-backed storage.
//!
//! Each repository opens its own database file (they may share one) and
//! creates its tables on startup.

mod identity_repo;
mod meeting_repo;

pub use identity_repo::SqliteIdentityRepo;
pub use meeting_repo::SqliteMeetingRepo;

use bgorg_domain::{IdentityError, MeetingError};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

/// Open (creating if needed) the database file and run `schema`.
async fn connect(
    db_path: &str,
    operation: &'static str,
    schema: &[&str],
) -> Result<SqlitePool, RepoError> {
    // SQLite has a single writer. One connection keeps read-then-write
    // transactions from failing with SQLITE_BUSY when they overlap.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await
        .map_err(|e| RepoError::database(operation, e))?;

    for statement in schema.iter() {
        sqlx::query(*statement)
            .execute(&pool)
            .await
            .map_err(|e| RepoError::database(operation, e))?;
    }

    Ok(pool)
}

/// Log a storage fault and collapse it into the meeting catch-all.
fn meeting_fault(operation: &'static str) -> impl FnOnce(sqlx::Error) -> MeetingError {
    move |error| {
        tracing::error!(error = %error, operation, "meeting store failure");
        MeetingError::Unexpected
    }
}

/// Log a storage fault and collapse it into the identity catch-all.
fn identity_fault(operation: &'static str) -> impl FnOnce(sqlx::Error) -> IdentityError {
    move |error| {
        tracing::error!(error = %error, operation, "identity store failure");
        IdentityError::Unexpected
    }
}
