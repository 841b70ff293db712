//! In-memory identity store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bgorg_domain::{ExternalGroup, ExternalUser, GroupId, IdentityError, UserId};
use tokio::sync::RwLock;

use crate::infrastructure::ports::IdentityRepo;

#[derive(Default)]
struct Tables {
    users: Vec<ExternalUser>,
    groups: Vec<ExternalGroup>,
}

/// Ids are 1-based positions in the insertion-ordered tables.
fn id_for(index: usize) -> String {
    (index + 1).to_string()
}

fn index_of(id: &str) -> Option<usize> {
    id.parse::<usize>().ok()?.checked_sub(1)
}

#[derive(Clone, Default)]
pub struct InMemoryIdentityRepo {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryIdentityRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityRepo for InMemoryIdentityRepo {
    async fn get_or_create_user(&self, user: &ExternalUser) -> Result<UserId, IdentityError> {
        let mut tables = self.tables.write().await;
        if let Some(index) = tables.users.iter().position(|known| known.same_identity(user)) {
            tables.users[index].display_name = user.display_name.clone();
            return Ok(UserId::new(id_for(index)));
        }
        tables.users.push(user.clone());
        Ok(UserId::new(id_for(tables.users.len() - 1)))
    }

    async fn get_external_user(&self, user_id: &UserId) -> Result<ExternalUser, IdentityError> {
        let tables = self.tables.read().await;
        index_of(user_id.as_str())
            .and_then(|index| tables.users.get(index))
            .cloned()
            .ok_or(IdentityError::UserNotFound)
    }

    async fn get_or_create_group(&self, group: &ExternalGroup) -> Result<GroupId, IdentityError> {
        let mut tables = self.tables.write().await;
        if let Some(index) = tables.groups.iter().position(|known| known == group) {
            return Ok(GroupId::new(id_for(index)));
        }
        tables.groups.push(group.clone());
        Ok(GroupId::new(id_for(tables.groups.len() - 1)))
    }

    async fn get_external_group(
        &self,
        group_id: &GroupId,
    ) -> Result<ExternalGroup, IdentityError> {
        let tables = self.tables.read().await;
        index_of(group_id.as_str())
            .and_then(|index| tables.groups.get(index))
            .cloned()
            .ok_or(IdentityError::GroupNotFound)
    }

    async fn get_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, ExternalUser>, IdentityError> {
        let tables = self.tables.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|user_id| {
                let index = index_of(user_id.as_str())?;
                let user = tables.users.get(index)?;
                Some((user_id.clone(), user.clone()))
            })
            .collect())
    }
}
