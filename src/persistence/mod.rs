//! Persistence layer: optional PostgreSQL backing for the user store.
//!
//! The streaming core never touches this module. When persistence is
//! enabled, startup hydrates the in-memory [`crate::domain::UserStore`]
//! from PostgreSQL and the account service writes every mutated account
//! through.

pub mod models;
pub mod postgres;

pub use postgres::PostgresUserStore;
