//! The Device-Relay wire protocol.
//!
//! Messages travel as JSON text frames over the persistent transport
//! connection, one message per frame. Each frame is an object whose `"type"`
//! field names the event in kebab-case; payload fields are camelCase.
//!
//! - [`messages`] - the typed vocabulary, one enum per direction.
//! - [`codec`] - frame encoding and decoding with typed errors.

pub mod codec;
pub mod messages;

pub use codec::{decode_message, encode_message, ProtocolError};
pub use messages::{EndpointMessage, RegistrationReply, ServerMessage};
