// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (JWT auth) → Elevated (JWT auth + admin role)
pub mod public;
pub mod protected;
pub mod elevated;
