pub mod error;
pub mod project_service;
pub mod user_service;

pub use error::{ServiceError, ServiceResult};
pub use project_service::ProjectService;
pub use user_service::{Session, UserService};
