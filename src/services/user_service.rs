use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, TokenIssuer};
use crate::database::models::{LoginUser, RegisterUser, Role, User};
use crate::database::repository::UserRepository;
use crate::validation::Validate;

use super::error::{ServiceError, ServiceResult};

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenIssuer>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenIssuer>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, input: RegisterUser) -> ServiceResult<User> {
        input.validate()?;
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(ServiceError::conflict("Username is already taken"));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::conflict("Email is already registered"));
        }

        let digest = hash_password(input.password, self.bcrypt_cost)
            .await
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                ServiceError::server("Failed to create account")
            })?;

        let user = self.users.insert(&User::new(username, email, digest)).await?;
        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(&self, input: LoginUser) -> ServiceResult<Session> {
        input.validate()?;

        let Some(user) = self.users.find_by_username(input.username.trim()).await? else {
            warn!("Login failed: unknown user '{}'", input.username.trim());
            return Err(ServiceError::authentication(BAD_CREDENTIALS));
        };

        let valid = verify_password(input.password, user.password_hash.clone())
            .await
            .map_err(|e| {
                tracing::error!("Password verification failed for {}: {}", user.id, e);
                ServiceError::server("Failed to verify credentials")
            })?;
        if !valid {
            warn!("Login failed: wrong password for '{}'", user.username);
            return Err(ServiceError::authentication(BAD_CREDENTIALS));
        }

        let token = self.tokens.sign(&user).map_err(|e| {
            tracing::error!("Token generation failed: {}", e);
            ServiceError::server("Failed to issue token")
        })?;

        info!("User {} logged in", user.username);
        Ok(Session {
            token,
            expires_in: self.tokens.expires_in(),
            user,
        })
    }

    pub async fn me(&self, caller: Uuid) -> ServiceResult<User> {
        self.users
            .find_by_id(caller)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    pub async fn promote(&self, username: &str) -> ServiceResult<User> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("User '{}' not found", username)))?;
        if user.role == Role::Admin {
            return Ok(user);
        }
        let user = self.users.set_role(user.id, Role::Admin).await?;
        info!("User {} promoted to admin", user.username);
        Ok(user)
    }
}
