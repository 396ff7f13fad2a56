//! In-process adapters for the repository ports.
//!
//! Used by the test suites and by `serve --in-memory`. Each call takes the
//! lock once, so, as with the SQL adapter, nothing spans two calls.
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Project, Role, User};
use crate::database::repository::{ProjectRepository, UserRepository};

fn sorted(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    projects
}

#[derive(Clone, Default)]
pub struct MemoryProjectRepository {
    projects: Arc<RwLock<HashMap<Uuid, Project>>>,
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.projects.read().await.len()
    }

    async fn select<F>(&self, predicate: F) -> Vec<Project>
    where
        F: Fn(&Project) -> bool,
    {
        let projects = self.projects.read().await;
        sorted(projects.values().filter(|p| predicate(p)).cloned().collect())
    }
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn insert(&self, project: &Project) -> Result<Project, DatabaseError> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(&project.id) {
            return Err(DatabaseError::Duplicate("projects_pkey".to_string()));
        }
        projects.insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, DatabaseError> {
        Ok(self.select(|p| p.name == name).await.into_iter().next())
    }

    async fn list_all(&self) -> Result<Vec<Project>, DatabaseError> {
        Ok(self.select(|_| true).await)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Project>, DatabaseError> {
        Ok(self.select(|p| p.owner == owner).await)
    }

    async fn list_by_member(&self, member: Uuid) -> Result<Vec<Project>, DatabaseError> {
        Ok(self.select(|p| p.has_member(member)).await)
    }

    async fn update(&self, project: &Project) -> Result<Project, DatabaseError> {
        let mut projects = self.projects.write().await;
        let stored = projects
            .get_mut(&project.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("project {}", project.id)))?;

        stored.name = project.name.clone();
        stored.description = project.description.clone();
        stored.start_date = project.start_date;
        stored.end_date = project.end_date;
        stored.status = project.status;
        stored.members = project.members.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        Ok(self.projects.write().await.remove(&id))
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        // Mirrors the UNIQUE constraints on the users table
        if users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::Duplicate("users_username_key".to_string()));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Duplicate("users_email_key".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}
