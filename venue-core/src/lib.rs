//! venue-core is the matching engine and its satellite roles for a single
//! trading instrument: a continuous, price-time-priority limit order book,
//! the message codec it speaks to producers and downstream consumers, and
//! the CLI roles (`match`, `persis`, `order`, `heal`, `kline`) that run
//! around it as independent processes.

pub mod config;
pub mod engine;
pub mod logging;
pub mod roles;
pub mod store;
pub mod transport;
pub mod wire;

/// Re-exports the domain types used throughout the crate, so every module
/// can `use crate::prelude::*;` instead of reaching into `engine::` paths.
pub mod prelude {
    pub use crate::engine::prelude::*;
}
