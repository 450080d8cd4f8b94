//! WebSocket layer: the streaming endpoint and connection lifecycle.
//!
//! `GET /ws?token=<session token>` upgrades, authenticates the token, and
//! registers the connection. From then on the connection receives one
//! `{"ticker", "price"}` text frame per subscribed ticker per tick.

pub mod connection;
pub mod handler;
pub mod messages;
