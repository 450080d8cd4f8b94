//! Data Transfer Objects for REST request/response serialization.
//!
//! Ticker symbols cross the wire as plain strings; prices as JSON numbers
//! with two decimals.

pub mod account_dto;
pub mod common_dto;
pub mod market_dto;
pub mod subscription_dto;

pub use account_dto::*;
pub use common_dto::*;
pub use market_dto::*;
pub use subscription_dto::*;
