//! Application layer for relay-server.
//!
//! Everything stateful lives in the [`hub::Hub`]: the peer table, the device
//! and client registries, registration handling, the relay router, and the
//! lifecycle broadcasts. The hub is driven by a single event channel and is
//! the only place relay state is ever mutated.

pub mod hub;
pub mod lifecycle;
pub mod relay;

pub use hub::{ConnectionId, Hub, HubEvent, OutboundSender};
