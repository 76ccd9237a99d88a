//! # relay-core
//!
//! Shared library for Device-Relay containing the wire protocol types and
//! codec, identity token generation, the identity-to-connection registry, and
//! the per-connection session state machine.
//!
//! This crate is used by the relay server and is suitable for endpoint
//! implementations that want the same typed protocol. It has zero
//! dependencies on sockets, async runtimes, or OS APIs.
//!
//! The relay itself is a rendezvous point: "device" endpoints and "client"
//! endpoints each open one persistent connection to the server, register to
//! receive an identity token, and from then on address each other by token.
//! The server forwards commands, command results, and stream chunks between
//! them; endpoints never connect to each other directly.
//!
//! - **`identity`** - opaque server-minted tokens and their generator.
//! - **`registry`** - the identity-to-connection mapping used twice by the
//!   server (one instance for devices, one for clients).
//! - **`session`** - the per-connection role state machine
//!   (`Unbound -> Device | Client -> Closed`).
//! - **`protocol`** - the JSON message vocabulary exchanged over the
//!   transport, plus the text-frame codec.

pub mod identity;
pub mod protocol;
pub mod registry;
pub mod session;

// Re-export the most-used types at the crate root so callers can write
// `relay_core::Identity` instead of `relay_core::identity::Identity`.
pub use identity::Identity;
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::{EndpointMessage, RegistrationReply, ServerMessage};
pub use registry::Registry;
pub use session::{SessionError, SessionState};
