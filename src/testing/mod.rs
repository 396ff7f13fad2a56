use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::ProjectPolicy;
use crate::database::memory::{MemoryProjectRepository, MemoryUserRepository};
use crate::database::models::User;
use crate::database::repository::UserRepository;
use crate::services::{ProjectService, UserService};

/// In-memory stores shared by the services under test
pub struct TestRepos {
    pub projects: MemoryProjectRepository,
    pub users: MemoryUserRepository,
    pub tokens: Arc<TokenIssuer>,
}

impl TestRepos {
    pub fn new() -> Self {
        Self {
            projects: MemoryProjectRepository::new(),
            users: MemoryUserRepository::new(),
            tokens: Arc::new(TokenIssuer::new("test-secret", 1).expect("test issuer")),
        }
    }

    pub fn project_service(&self, policy: ProjectPolicy) -> ProjectService {
        ProjectService::new(
            Arc::new(self.projects.clone()),
            Arc::new(self.users.clone()),
            policy,
        )
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(Arc::new(self.users.clone()), self.tokens.clone(), 4)
    }

    /// Stores a user directly, skipping registration
    pub async fn user(&self, name: &str) -> User {
        let user = User::new(name.to_string(), format!("{name}@example.com"), "x".to_string());
        self.users.insert(&user).await.expect("insert test user")
    }
}
