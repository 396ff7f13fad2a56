// handlers/protected/mod.rs - Endpoints behind jwt_auth_middleware
//
// Every handler here receives `Extension<AuthUser>` and passes the caller's
// id explicitly to the service layer.
pub mod project;
pub mod user;
