//! SQLite meeting store.
//!
//! A partial unique index on `meetings(group_id) WHERE closed = 0` is what
//! keeps a group down to one active meeting. Attendee rows hang off the
//! meeting id, so a new meeting never inherits the previous one's attendees.

use async_trait::async_trait;
use bgorg_domain::{Attendee, GroupId, Meeting, MeetingError, RsvpChange};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::{connect, meeting_fault};
use crate::infrastructure::ports::{MeetingRepo, RepoError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS meetings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_id TEXT NOT NULL,
        starts_at TEXT NOT NULL,
        location TEXT NOT NULL,
        capacity INTEGER NOT NULL,
        closed INTEGER NOT NULL DEFAULT 0,
        attendees_data BLOB
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS meetings_one_active_per_group
        ON meetings (group_id) WHERE closed = 0
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendees (
        meeting_id INTEGER NOT NULL REFERENCES meetings (id),
        user_id TEXT NOT NULL,
        amount INTEGER NOT NULL,
        PRIMARY KEY (meeting_id, user_id)
    )
    "#,
];

/// SQLite implementation of the meeting store.
pub struct SqliteMeetingRepo {
    pool: SqlitePool,
}

impl SqliteMeetingRepo {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = connect(db_path, "meetings", SCHEMA).await?;
        Ok(Self { pool })
    }

    /// Row id of the group's active meeting.
    async fn active_meeting_id(
        conn: &mut SqliteConnection,
        group_id: &GroupId,
        operation: &'static str,
    ) -> Result<i64, MeetingError> {
        let row = sqlx::query("SELECT id FROM meetings WHERE group_id = ? AND closed = 0")
            .bind(group_id.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(meeting_fault(operation))?;

        match row {
            Some(row) => row.try_get("id").map_err(meeting_fault(operation)),
            None => Err(MeetingError::NoActiveMeeting),
        }
    }
}

fn meeting_from_row(row: &SqliteRow, operation: &'static str) -> Result<Meeting, MeetingError> {
    let starts_at: DateTime<Utc> = row.try_get("starts_at").map_err(meeting_fault(operation))?;
    let location: String = row.try_get("location").map_err(meeting_fault(operation))?;
    let capacity: i64 = row.try_get("capacity").map_err(meeting_fault(operation))?;

    Ok(Meeting {
        starts_at,
        location,
        capacity: column_to_u32(capacity, "capacity", operation)?,
    })
}

fn column_to_u32(
    value: i64,
    column: &'static str,
    operation: &'static str,
) -> Result<u32, MeetingError> {
    u32::try_from(value).map_err(|_| {
        tracing::error!(value, column, operation, "stored value out of range");
        MeetingError::Unexpected
    })
}

#[async_trait]
impl MeetingRepo for SqliteMeetingRepo {
    async fn create_meeting(
        &self,
        group_id: &GroupId,
        meeting: &Meeting,
    ) -> Result<(), MeetingError> {
        let result = sqlx::query(
            r#"
            INSERT INTO meetings (group_id, starts_at, location, capacity, closed)
            VALUES (?, ?, ?, ?, 0)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(group_id.as_str())
        .bind(meeting.starts_at)
        .bind(&meeting.location)
        .bind(i64::from(meeting.capacity))
        .execute(&self.pool)
        .await
        .map_err(meeting_fault("create_meeting"))?;

        if result.rows_affected() == 0 {
            return Err(MeetingError::MeetingAlreadyActive);
        }
        Ok(())
    }

    async fn delete_meeting(&self, group_id: &GroupId) -> Result<(), MeetingError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(meeting_fault("delete_meeting"))?;

        let meeting_id = Self::active_meeting_id(&mut tx, group_id, "delete_meeting").await?;

        sqlx::query("DELETE FROM attendees WHERE meeting_id = ?")
            .bind(meeting_id)
            .execute(&mut *tx)
            .await
            .map_err(meeting_fault("delete_meeting"))?;
        sqlx::query("DELETE FROM meetings WHERE id = ?")
            .bind(meeting_id)
            .execute(&mut *tx)
            .await
            .map_err(meeting_fault("delete_meeting"))?;

        tx.commit().await.map_err(meeting_fault("delete_meeting"))
    }

    async fn get_meeting(&self, group_id: &GroupId) -> Result<Meeting, MeetingError> {
        let row = sqlx::query(
            "SELECT starts_at, location, capacity FROM meetings WHERE group_id = ? AND closed = 0",
        )
        .bind(group_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(meeting_fault("get_meeting"))?;

        match row {
            Some(row) => meeting_from_row(&row, "get_meeting"),
            None => Err(MeetingError::NoActiveMeeting),
        }
    }

    async fn close_meeting(&self, group_id: &GroupId) -> Result<(), MeetingError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(meeting_fault("close_meeting"))?;

        let meeting_id = Self::active_meeting_id(&mut tx, group_id, "close_meeting").await?;

        sqlx::query("UPDATE meetings SET closed = 1, attendees_data = NULL WHERE id = ?")
            .bind(meeting_id)
            .execute(&mut *tx)
            .await
            .map_err(meeting_fault("close_meeting"))?;
        sqlx::query("DELETE FROM attendees WHERE meeting_id = ?")
            .bind(meeting_id)
            .execute(&mut *tx)
            .await
            .map_err(meeting_fault("close_meeting"))?;

        tx.commit().await.map_err(meeting_fault("close_meeting"))
    }

    async fn closed_meetings(&self, group_id: &GroupId) -> Result<Vec<Meeting>, MeetingError> {
        let rows = sqlx::query(
            r#"
            SELECT starts_at, location, capacity FROM meetings
            WHERE group_id = ? AND closed = 1
            ORDER BY id
            "#,
        )
        .bind(group_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(meeting_fault("closed_meetings"))?;

        rows.iter()
            .map(|row| meeting_from_row(row, "closed_meetings"))
            .collect()
    }

    async fn rsvp(&self, group_id: &GroupId, attendee: &Attendee) -> Result<(), MeetingError> {
        let mut tx = self.pool.begin().await.map_err(meeting_fault("rsvp"))?;

        let meeting_id = Self::active_meeting_id(&mut tx, group_id, "rsvp").await?;

        let current =
            sqlx::query("SELECT amount FROM attendees WHERE meeting_id = ? AND user_id = ?")
                .bind(meeting_id)
                .bind(attendee.user_id.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(meeting_fault("rsvp"))?
                .map(|row| row.try_get::<i64, _>("amount"))
                .transpose()
                .map_err(meeting_fault("rsvp"))?
                .map(|amount| column_to_u32(amount, "amount", "rsvp"))
                .transpose()?;

        match RsvpChange::resolve(current, attendee.amount)? {
            RsvpChange::Set(amount) => {
                sqlx::query(
                    r#"
                    INSERT INTO attendees (meeting_id, user_id, amount)
                    VALUES (?, ?, ?)
                    ON CONFLICT (meeting_id, user_id) DO UPDATE SET
                        amount = excluded.amount
                    "#,
                )
                .bind(meeting_id)
                .bind(attendee.user_id.as_str())
                .bind(i64::from(amount))
                .execute(&mut *tx)
                .await
                .map_err(meeting_fault("rsvp"))?;
            }
            RsvpChange::Remove => {
                sqlx::query("DELETE FROM attendees WHERE meeting_id = ? AND user_id = ?")
                    .bind(meeting_id)
                    .bind(attendee.user_id.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(meeting_fault("rsvp"))?;
            }
        }

        tx.commit().await.map_err(meeting_fault("rsvp"))
    }

    async fn get_attendees(&self, group_id: &GroupId) -> Result<Vec<Attendee>, MeetingError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(meeting_fault("get_attendees"))?;

        let meeting_id = Self::active_meeting_id(&mut conn, group_id, "get_attendees").await?;

        // rowid keeps RSVP order; an upsert that updates a row keeps its rowid.
        let rows = sqlx::query(
            "SELECT user_id, amount FROM attendees WHERE meeting_id = ? ORDER BY rowid",
        )
        .bind(meeting_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(meeting_fault("get_attendees"))?;

        rows.iter()
            .map(|row| -> Result<Attendee, MeetingError> {
                let user_id: String = row.try_get("user_id").map_err(meeting_fault("get_attendees"))?;
                let amount: i64 = row.try_get("amount").map_err(meeting_fault("get_attendees"))?;
                Ok(Attendee::new(
                    user_id,
                    column_to_u32(amount, "amount", "get_attendees")?,
                ))
            })
            .collect()
    }

    async fn set_attendees_data(
        &self,
        group_id: &GroupId,
        data: Vec<u8>,
    ) -> Result<(), MeetingError> {
        let result =
            sqlx::query("UPDATE meetings SET attendees_data = ? WHERE group_id = ? AND closed = 0")
                .bind(data)
                .bind(group_id.as_str())
                .execute(&self.pool)
                .await
                .map_err(meeting_fault("set_attendees_data"))?;

        if result.rows_affected() == 0 {
            return Err(MeetingError::NoActiveMeeting);
        }
        Ok(())
    }

    async fn get_attendees_data(
        &self,
        group_id: &GroupId,
    ) -> Result<Option<Vec<u8>>, MeetingError> {
        let row =
            sqlx::query("SELECT attendees_data FROM meetings WHERE group_id = ? AND closed = 0")
                .bind(group_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(meeting_fault("get_attendees_data"))?;

        match row {
            Some(row) => row
                .try_get("attendees_data")
                .map_err(meeting_fault("get_attendees_data")),
            None => Err(MeetingError::NoActiveMeeting),
        }
    }
}
