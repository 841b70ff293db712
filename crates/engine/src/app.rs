//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    config::{EngineConfig, StorageBackend},
    memory::{InMemoryIdentityRepo, InMemoryMeetingRepo},
    ports::{ClockPort, IdentityRepo, MeetingRepo, RepoError},
    sqlite::{SqliteIdentityRepo, SqliteMeetingRepo},
};
use crate::use_cases::MeetingPolicy;

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub meetings: MeetingPolicy,
    pub identity: Arc<dyn IdentityRepo>,
}

impl App {
    pub fn new(
        meeting_repo: Arc<dyn MeetingRepo>,
        identity: Arc<dyn IdentityRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            meetings: MeetingPolicy::new(meeting_repo, clock),
            identity,
        }
    }

    /// Wire the configured storage backend to the system clock.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, RepoError> {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

        let (meeting_repo, identity): (Arc<dyn MeetingRepo>, Arc<dyn IdentityRepo>) =
            match config.storage {
                StorageBackend::Sqlite => {
                    tracing::info!(
                        meetings_db = %config.meetings_db,
                        users_db = %config.users_db,
                        "Opening SQLite stores"
                    );
                    (
                        Arc::new(SqliteMeetingRepo::new(&config.meetings_db).await?),
                        Arc::new(SqliteIdentityRepo::new(&config.users_db).await?),
                    )
                }
                StorageBackend::Memory => {
                    tracing::warn!("Using in-memory stores; data is lost on restart");
                    (
                        Arc::new(InMemoryMeetingRepo::new()),
                        Arc::new(InMemoryIdentityRepo::new()),
                    )
                }
            };

        Ok(Self::new(meeting_repo, identity, clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgorg_domain::{GroupId, MeetingError};

    #[tokio::test]
    async fn memory_config_builds_an_empty_app() {
        let config = EngineConfig {
            storage: StorageBackend::Memory,
            ..EngineConfig::default()
        };

        let app = App::from_config(&config).await.expect("app");

        assert_eq!(
            app.meetings.get_meeting(&GroupId::from("g1")).await,
            Err(MeetingError::NoActiveMeeting)
        );
    }

    #[tokio::test]
    async fn sqlite_config_creates_both_database_files() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let meetings_db = temp_dir.path().join("meetings.db");
        let users_db = temp_dir.path().join("users.db");
        let config = EngineConfig {
            storage: StorageBackend::Sqlite,
            meetings_db: meetings_db.to_string_lossy().to_string(),
            users_db: users_db.to_string_lossy().to_string(),
            ..EngineConfig::default()
        };

        let _app = App::from_config(&config).await.expect("app");

        assert!(meetings_db.exists());
        assert!(users_db.exists());
    }
}
