pub mod auth;
pub mod response;
pub mod valid;

pub use auth::{jwt_auth_middleware, require_admin_middleware, AuthUser, TOKEN_COOKIE};
pub use response::{ApiResponse, ApiResult};
pub use valid::Valid;
