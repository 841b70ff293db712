//! SQLite identity store.

use std::collections::HashMap;

use async_trait::async_trait;
use bgorg_domain::{ExternalGroup, ExternalUser, GroupId, IdentityError, Source, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::{connect, identity_fault};
use crate::infrastructure::ports::{IdentityRepo, RepoError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id TEXT NOT NULL,
        source INTEGER NOT NULL,
        display_name TEXT NOT NULL DEFAULT '',
        UNIQUE (external_id, source)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id TEXT NOT NULL,
        source INTEGER NOT NULL,
        UNIQUE (external_id, source)
    )
    "#,
];

/// SQLite implementation of the identity store.
pub struct SqliteIdentityRepo {
    pool: SqlitePool,
}

impl SqliteIdentityRepo {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = connect(db_path, "identity", SCHEMA).await?;
        Ok(Self { pool })
    }
}

fn source_from_row(row: &SqliteRow, operation: &'static str) -> Result<Source, IdentityError> {
    let raw: i64 = row.try_get("source").map_err(identity_fault(operation))?;
    Source::from_i64(raw).ok_or_else(|| {
        tracing::error!(source = raw, operation, "unknown identity source");
        IdentityError::Unexpected
    })
}

fn user_from_row(row: &SqliteRow, operation: &'static str) -> Result<ExternalUser, IdentityError> {
    Ok(ExternalUser {
        id: row
            .try_get("external_id")
            .map_err(identity_fault(operation))?,
        source: source_from_row(row, operation)?,
        display_name: row
            .try_get("display_name")
            .map_err(identity_fault(operation))?,
    })
}

#[async_trait]
impl IdentityRepo for SqliteIdentityRepo {
    async fn get_or_create_user(&self, user: &ExternalUser) -> Result<UserId, IdentityError> {
        let id: i64 = sqlx::query(
            r#"
            INSERT INTO users (external_id, source, display_name)
            VALUES (?, ?, ?)
            ON CONFLICT (external_id, source) DO UPDATE SET
                display_name = excluded.display_name
            RETURNING id
            "#,
        )
        .bind(&user.id)
        .bind(user.source.as_i64())
        .bind(&user.display_name)
        .fetch_one(&self.pool)
        .await
        .and_then(|row| row.try_get("id"))
        .map_err(identity_fault("get_or_create_user"))?;

        Ok(UserId::new(id.to_string()))
    }

    async fn get_external_user(&self, user_id: &UserId) -> Result<ExternalUser, IdentityError> {
        // Ids are numeric; anything else cannot exist.
        let Ok(id) = user_id.as_str().parse::<i64>() else {
            return Err(IdentityError::UserNotFound);
        };

        let row = sqlx::query("SELECT external_id, source, display_name FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(identity_fault("get_external_user"))?
            .ok_or(IdentityError::UserNotFound)?;

        user_from_row(&row, "get_external_user")
    }

    async fn get_or_create_group(&self, group: &ExternalGroup) -> Result<GroupId, IdentityError> {
        let id: i64 = sqlx::query(
            r#"
            INSERT INTO groups (external_id, source)
            VALUES (?, ?)
            ON CONFLICT (external_id, source) DO UPDATE SET
                source = excluded.source
            RETURNING id
            "#,
        )
        .bind(&group.id)
        .bind(group.source.as_i64())
        .fetch_one(&self.pool)
        .await
        .and_then(|row| row.try_get("id"))
        .map_err(identity_fault("get_or_create_group"))?;

        Ok(GroupId::new(id.to_string()))
    }

    async fn get_external_group(
        &self,
        group_id: &GroupId,
    ) -> Result<ExternalGroup, IdentityError> {
        let Ok(id) = group_id.as_str().parse::<i64>() else {
            return Err(IdentityError::GroupNotFound);
        };

        let row = sqlx::query("SELECT external_id, source FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(identity_fault("get_external_group"))?
            .ok_or(IdentityError::GroupNotFound)?;

        Ok(ExternalGroup {
            id: row
                .try_get("external_id")
                .map_err(identity_fault("get_external_group"))?,
            source: source_from_row(&row, "get_external_group")?,
        })
    }

    async fn get_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, ExternalUser>, IdentityError> {
        // Keyed by row id so results come back under the caller's spelling.
        let ids: HashMap<i64, &UserId> = user_ids
            .iter()
            .filter_map(|user_id| Some((user_id.as_str().parse().ok()?, user_id)))
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, external_id, source, display_name FROM users WHERE id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids.keys() {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(identity_fault("get_users"))?;

        let mut users = HashMap::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.try_get("id").map_err(identity_fault("get_users"))?;
            if let Some(user_id) = ids.get(&id) {
                users.insert((*user_id).clone(), user_from_row(row, "get_users")?);
            }
        }
        Ok(users)
    }
}
