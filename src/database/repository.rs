//! Persistence ports for users and projects.
//!
//! Services depend on these traits only. `postgres` and `memory` provide the
//! adapters. None of the methods span more than one statement, so any
//! read-then-write sequence built on top of them is not atomic.
use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Project, Role, User};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert(&self, project: &Project) -> Result<Project, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DatabaseError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, DatabaseError>;

    /// Every project, oldest first.
    async fn list_all(&self) -> Result<Vec<Project>, DatabaseError>;

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Project>, DatabaseError>;

    async fn list_by_member(&self, member: Uuid) -> Result<Vec<Project>, DatabaseError>;

    /// Overwrite the mutable fields of an existing project.
    /// Fails with `DatabaseError::NotFound` if the row is gone.
    async fn update(&self, project: &Project) -> Result<Project, DatabaseError>;

    /// Remove a project, returning its last stored state.
    async fn delete(&self, id: Uuid) -> Result<Option<Project>, DatabaseError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DatabaseError::Duplicate` on a username or email clash.
    async fn insert(&self, user: &User) -> Result<User, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User, DatabaseError>;
}
