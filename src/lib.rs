//! # ticker-gateway
//!
//! Session-authenticated WebSocket gateway that streams simulated market
//! prices to the clients subscribed to them.
//!
//! Clients register and log in over REST to obtain a session token, pick
//! the tickers they care about, then open `GET /ws?token=<token>`. Once a
//! second, the broadcast scheduler advances every simulated price and
//! sends each connection one `{"ticker", "price"}` frame per subscribed
//! ticker.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── AccountService (service/)
//!     ├── SessionAuthenticator (domain/)
//!     │
//!     ├── UserStore ─────────────┐
//!     ├── ConnectionRegistry ────┤
//!     ├── BroadcastScheduler ────┘ (ticks PriceSimulator, fans out)
//!     │
//!     └── PostgreSQL Persistence (optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod router;
pub mod service;
pub mod ws;
