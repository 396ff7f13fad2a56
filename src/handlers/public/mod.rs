// handlers/public/mod.rs - Endpoints that do not require authentication
pub mod user;

pub use user::{login, register};
