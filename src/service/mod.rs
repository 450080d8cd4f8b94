//! Service layer: account management around the streaming core.

pub mod account_service;

pub use account_service::AccountService;
