// handlers/elevated/mod.rs - Endpoints behind jwt_auth_middleware and
// require_admin_middleware
pub mod project;
