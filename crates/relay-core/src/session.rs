//! Per-connection session state machine.
//!
//! Every transport connection starts `Unbound`. A registration message binds
//! it as a device or a client, exactly once; disconnect closes it. The state
//! is a sum type so a connection holding both a device identity and a client
//! identity is unrepresentable:
//!
//! ```text
//! Unbound ──register-device──► Device(identity) ──disconnect──► Closed
//!    │
//!    └─────register-client──► Client(identity) ──disconnect──► Closed
//! ```
//!
//! Binding from any state other than `Unbound` is rejected and leaves the
//! state untouched; the caller decides how to surface the rejection (the
//! server logs and ignores it).

use thiserror::Error;

use crate::identity::Identity;

/// Error returned when a session transition is not valid from the current
/// state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("connection is already bound as a {role}")]
    AlreadyBound { role: &'static str },
    #[error("connection is closed")]
    Closed,
}

/// Role and identity of one transport connection, for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected but not yet registered. No relay messages are addressed to
    /// this connection and its relayed messages carry no sender identity.
    Unbound,
    /// Registered as a device under the contained identity.
    Device(Identity),
    /// Registered as a client under the contained identity.
    Client(Identity),
    /// Disconnected. Terminal; no further transitions.
    Closed,
}

impl SessionState {
    /// Binds the connection as a device. Valid only from `Unbound`.
    pub fn bind_device(&mut self, identity: Identity) -> Result<(), SessionError> {
        match self {
            SessionState::Unbound => {
                *self = SessionState::Device(identity);
                Ok(())
            }
            other => Err(other.rejection()),
        }
    }

    /// Binds the connection as a client. Valid only from `Unbound`.
    pub fn bind_client(&mut self, identity: Identity) -> Result<(), SessionError> {
        match self {
            SessionState::Unbound => {
                *self = SessionState::Client(identity);
                Ok(())
            }
            other => Err(other.rejection()),
        }
    }

    /// Closes the session and returns the state it was in, so the caller can
    /// deregister whatever identity was bound. Valid from any state.
    pub fn close(&mut self) -> SessionState {
        std::mem::replace(self, SessionState::Closed)
    }

    /// The bound identity, whichever role holds it.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Device(id) | SessionState::Client(id) => Some(id),
            SessionState::Unbound | SessionState::Closed => None,
        }
    }

    /// The bound identity, only if this connection registered as a device.
    pub fn device_identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Device(id) => Some(id),
            _ => None,
        }
    }

    /// The bound identity, only if this connection registered as a client.
    pub fn client_identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Client(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_unbound(&self) -> bool {
        matches!(self, SessionState::Unbound)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, SessionState::Closed)
    }

    fn rejection(&self) -> SessionError {
        match self {
            SessionState::Device(_) => SessionError::AlreadyBound { role: "device" },
            SessionState::Client(_) => SessionError::AlreadyBound { role: "client" },
            SessionState::Closed => SessionError::Closed,
            // `rejection` is only reached from non-Unbound states.
            SessionState::Unbound => unreachable!("Unbound accepts every binding"),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Unbound
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
