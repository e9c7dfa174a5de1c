//! API credentials for authenticated TV endpoints.

use serde::{Deserialize, Serialize};

/// Long-lived credential established by the pairing handshake (or supplied
/// by the caller up front, bypassing pairing).
///
/// Treated as an immutable value: pairing returns a fresh `Credential` and
/// the caller threads it into subsequent sessions, instead of mutating
/// shared auth state in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// API user id. For paired devices this is the generated device id.
    pub user: String,
    /// API secret. For paired devices this is the server-issued auth key.
    pub pass: String,
    /// Whether the secret should be sent preemptively rather than in
    /// response to a challenge. Pairing always sets this to `false`.
    #[serde(default)]
    pub send_immediately: bool,
}

impl Credential {
    /// Create a credential with `send_immediately` disabled, matching what
    /// the pairing handshake produces.
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
            send_immediately: false,
        }
    }
}
