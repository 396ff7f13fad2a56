pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{Database, DatabaseError};
pub use memory::{MemoryProjectRepository, MemoryUserRepository};
pub use postgres::{PgProjectRepository, PgUserRepository};
pub use repository::{ProjectRepository, UserRepository};
