//! Domain layer: the real-time streaming core.
//!
//! This module contains the account model and store, session
//! authentication, the connection registry, the price simulator with its
//! read-side feed, and the broadcast scheduler that ties them together on
//! every tick.

pub mod account;
pub mod authenticator;
pub mod broadcast_scheduler;
pub mod connection;
pub mod connection_registry;
pub mod price_feed;
pub mod price_simulator;
pub mod session_token;
pub mod ticker;
pub mod user_store;

pub use account::{Account, HistoryAction, HistoryEntry};
pub use authenticator::SessionAuthenticator;
pub use broadcast_scheduler::{BroadcastScheduler, SchedulerHandle, TickReport};
pub use connection::{CloseReason, ConnectionHandle};
pub use connection_registry::ConnectionRegistry;
pub use price_feed::PriceFeed;
pub use price_simulator::{PriceBoard, PriceSimulator, PriceUpdate, SimulatorSettings};
pub use session_token::{ConnectionId, SessionToken};
pub use ticker::Ticker;
pub use user_store::UserStore;
