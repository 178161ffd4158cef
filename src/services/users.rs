use crate::error::{forbidden, not_found, CoreResult};
use crate::model::UserProfile;
use crate::store::UserStore;
use std::sync::Arc;
use tracing::info;

/// User directory service
///
/// Registration and credential handling live in the identity layer; this
/// service only reads the directory and carries the guarded delete.
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Directory view of a user by id
    pub async fn get_user(&self, user_id: &str) -> CoreResult<UserProfile> {
        self.users
            .find_user(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| not_found("user"))
    }

    /// Directory view of a user by unique username
    pub async fn get_user_by_username(&self, username: &str) -> CoreResult<UserProfile> {
        self.users
            .find_user_by_username(username)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| not_found("user"))
    }

    /// All users, sorted by username
    pub async fn list_users(&self) -> CoreResult<Vec<UserProfile>> {
        let users = self.users.list_users().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// Delete a user; a user may not delete itself
    pub async fn delete_user(
        &self,
        user_id_to_delete: &str,
        requesting_user_id: &str,
    ) -> CoreResult<()> {
        if user_id_to_delete == requesting_user_id {
            return Err(forbidden("users cannot delete themselves"));
        }

        let deleted = self.users.delete_user(user_id_to_delete).await?;
        if deleted == 0 {
            return Err(not_found("user"));
        }

        info!("deleted user {}", user_id_to_delete);
        Ok(())
    }
}
