//! Identity tokens for registered endpoints.
//!
//! When an endpoint registers, the server mints an [`Identity`] and returns it
//! in the `registration-complete` reply. All subsequent relay messages address
//! their target by this token. Tokens are opaque: endpoints must not parse
//! them or assume anything beyond uniqueness within their namespace.
//!
//! Device identities and client identities come from the same generator but
//! are kept in separate registries, so a cross-namespace collision would be
//! harmless. Within a namespace, 64 bits of CSPRNG entropy make a collision
//! not practically possible; the server carries no collision-detection logic.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Number of random bytes behind each freshly minted token.
const TOKEN_BYTES: usize = 8;

/// Length of a freshly minted token in characters (lowercase hex).
pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// An opaque identity token for a registered device or client.
///
/// Serialized as a bare JSON string. Inbound target identities are accepted
/// verbatim; only [`Identity::generate`] guarantees the fixed-length hex
/// shape, since lookups treat unknown tokens as absent rather than invalid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Mints a fresh token: [`TOKEN_BYTES`] bytes from the OS CSPRNG,
    /// rendered as lowercase hex.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Identity(hex::encode(bytes))
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Identity {
    fn from(token: String) -> Self {
        Identity(token)
    }
}

impl From<&str> for Identity {
    fn from(token: &str) -> Self {
        Identity(token.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
