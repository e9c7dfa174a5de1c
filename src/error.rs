//! Error types for heliotv.

/// Top-level error type for TV client operations.
#[derive(Debug, thiserror::Error)]
pub enum TvError {
    /// A value failed its format check at a construction or input boundary.
    /// Never retried.
    #[error("Invalid {field}: {value}")]
    Validation { field: &'static str, value: String },

    /// A pairing operation was invoked on a device whose API family does
    /// not use the pairing handshake.
    #[error("This API family does not require pairing")]
    PairingNotRequired,

    /// The device answered, but the body did not match the expected shape.
    #[error("Unexpected response from TV: {reason}")]
    Protocol { reason: String },

    /// The device rejected the credential or pairing signature.
    #[error("TV rejected the request (HTTP {status})")]
    Auth { status: u16 },

    /// An authenticated endpoint was invoked on a session without a credential.
    #[error("No credential configured; pair with the TV first")]
    MissingCredential,

    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("Request to TV failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The device returned a non-200 status outside the pairing grant step.
    #[error("TV returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A readiness loop ran out of attempts without the device coming up.
    #[error("Device did not become ready after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Result type alias for TV client operations.
pub type Result<T> = std::result::Result<T, TvError>;
