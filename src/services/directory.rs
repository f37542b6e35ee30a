//! User directory service: unified role-tagged listings and role changes

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{AssignableRole, DirectoryUser},
    repository::{users::RoleCounts, Repository},
};

#[derive(Clone)]
pub struct DirectoryService {
    repository: Repository,
}

impl DirectoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all users with their roles, plus per-role counts
    pub async fn list_users(&self) -> AppResult<(Vec<DirectoryUser>, RoleCounts)> {
        let users = self.repository.users.list_all().await?;
        let counts = self.repository.users.role_counts().await?;
        Ok((users, counts))
    }

    /// Change a user's role between `user` and `admin`.
    ///
    /// Owners are never a valid target: the guard stands on its own,
    /// independent of how roles are stored.
    pub async fn change_role(&self, user_id: Uuid, new_role: AssignableRole) -> AppResult<()> {
        let user = self
            .repository
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.role.is_owner() {
            return Err(AppError::Authorization("Cannot modify owner roles".to_string()));
        }

        self.repository.users.update_role(user_id, new_role.into()).await
    }
}
