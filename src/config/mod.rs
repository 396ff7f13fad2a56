use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::auth::MAX_EXPIRY_HOURS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub projects: ProjectPolicy,
    /// Env variables whose values could not be parsed; `validate` rejects these
    #[serde(skip)]
    pub invalid_overrides: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
}

/// Authorization rules for project mutations that are not fixed by the domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPolicy {
    /// When false any authenticated caller may delete any project.
    pub delete_requires_owner: bool,
}

/// Secret used by the development preset when JWT_SECRET is unset.
const DEV_JWT_SECRET: &str = "projecthub-dev-secret-change-me";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        Self::defaults(environment).with_overrides(|name| env::var(name).ok())
    }

    /// Built-in preset for `environment`, ignoring the process environment.
    pub fn defaults(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    /// Applies overrides looked up through `var`.
    fn with_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("PROJECTHUB_PORT").or_else(|| var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = var("API_ENABLE_REQUEST_LOGGING") {
            match parse_flag(&v) {
                Some(flag) => self.api.enable_request_logging = flag,
                None => self.reject_override("API_ENABLE_REQUEST_LOGGING", &v),
            }
        }
        if let Some(v) = var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(v) = var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        // Project policy overrides
        if let Some(v) = var("PROJECTS_DELETE_REQUIRES_OWNER") {
            match parse_flag(&v) {
                Some(flag) => self.projects.delete_requires_owner = flag,
                None => self.reject_override("PROJECTS_DELETE_REQUIRES_OWNER", &v),
            }
        }

        self
    }

    fn reject_override(&mut self, name: &str, value: &str) {
        tracing::warn!("Ignoring unparseable {}={:?}", name, value);
        self.invalid_overrides.push(name.to_string());
    }

    /// Checks that must pass before the server accepts traffic.
    pub fn validate(&self) -> Result<(), String> {
        if !self.invalid_overrides.is_empty() {
            return Err(format!(
                "unrecognised value for {}; expected true/false, 1/0, yes/no or on/off",
                self.invalid_overrides.join(", ")
            ));
        }
        if self.security.jwt_secret.is_empty() {
            return Err("JWT_SECRET must be set".to_string());
        }
        if !(1..=MAX_EXPIRY_HOURS).contains(&self.security.jwt_expiry_hours) {
            return Err(format!(
                "JWT expiry must be between 1 and {} hours, got {}",
                MAX_EXPIRY_HOURS, self.security.jwt_expiry_hours
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                self.security.bcrypt_cost
            ));
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 8,
            },
            projects: ProjectPolicy::default(),
            invalid_overrides: Vec::new(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                // Must come from JWT_SECRET
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            projects: ProjectPolicy::default(),
            invalid_overrides: Vec::new(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                // Must come from JWT_SECRET
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            projects: ProjectPolicy::default(),
            invalid_overrides: Vec::new(),
        }
    }
}

/// Boolean env values: true/false, 1/0, yes/no, on/off in any case
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert!(config.api.enable_request_logging);
        assert!(!config.projects.delete_requires_owner);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.security.jwt_expiry_hours, 4);
        // Production has no built-in secret
        assert!(config.validate().is_err());
    }

    fn with_vars(vars: &[(&str, &str)]) -> AppConfig {
        preset_with_vars(Environment::Development, vars)
    }

    fn preset_with_vars(environment: Environment, vars: &[(&str, &str)]) -> AppConfig {
        AppConfig::defaults(environment).with_overrides(|name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        })
    }

    #[test]
    fn test_default_staging_config_requires_secret() {
        let config = AppConfig::staging();
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.validate().is_err());
        let config = preset_with_vars(Environment::Staging, &[("JWT_SECRET", "s3cret")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_delete_policy_accepts_common_spellings() {
        for value in ["true", "TRUE", "1", "yes", "On"] {
            let config = with_vars(&[("PROJECTS_DELETE_REQUIRES_OWNER", value)]);
            assert!(config.projects.delete_requires_owner, "{value}");
            assert!(config.validate().is_ok(), "{value}");
        }
        for value in ["false", "0", "No", "off"] {
            let config = with_vars(&[("PROJECTS_DELETE_REQUIRES_OWNER", value)]);
            assert!(!config.projects.delete_requires_owner, "{value}");
        }
    }

    #[test]
    fn test_unparseable_policy_fails_validation() {
        let config = with_vars(&[("PROJECTS_DELETE_REQUIRES_OWNER", "enabled")]);
        assert!(!config.projects.delete_requires_owner);
        let err = config.validate().unwrap_err();
        assert!(err.contains("PROJECTS_DELETE_REQUIRES_OWNER"));
    }

    #[test]
    fn test_rejects_out_of_range_jwt_expiry() {
        let config = with_vars(&[("SECURITY_JWT_EXPIRY_HOURS", "18446744073709551615")]);
        assert!(config.validate().is_err());

        let mut config = AppConfig::development();
        config.security.jwt_expiry_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_bcrypt_cost() {
        let mut config = AppConfig::development();
        config.security.bcrypt_cost = 2;
        assert!(config.validate().is_err());
    }
}
