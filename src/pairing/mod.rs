//! Three-step pairing handshake for Android-family TVs.
//!
//! Converts "no credentials" into a long-lived API credential:
//! 1. `request_pair`: POST a pairing request, receive a tentative auth key
//!    and a server timestamp. The TV shows a 4-digit PIN on screen.
//! 2. The caller obtains the PIN from the user (the only suspension point
//!    handed to caller-supplied logic; no timeout of our own).
//! 3. `authorize_pair`: POST the PIN plus an HMAC signature over
//!    `timestamp ++ pin`, authenticated with the tentative credential.
//!
//! Pairing never retries internally: any failure aborts the sequence and the
//! tentative credential must be discarded.

mod signature;

pub use signature::sign;

use std::future::Future;
use std::sync::OnceLock;

use rand::Rng;
use rand::distributions::Alphanumeric;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::credential::Credential;
use crate::error::{Result, TvError};
use crate::identity::DeviceIdentity;
use crate::transport::Transport;

/// Length of the generated device identifier.
pub const DEVICE_ID_LEN: usize = 16;

/// Access scopes requested for the paired credential.
const PAIRING_SCOPE: [&str; 3] = ["read", "write", "control"];

const APPLICATION_ID: &str = "app.id";
const DEVICE_NAME: &str = "heliotrope";
const DEVICE_OS: &str = "Android";
const DEVICE_TYPE: &str = "native";

fn pin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4}$").expect("valid PIN regex"))
}

/// Generate a fresh device identifier: 16 alphanumeric characters.
///
/// Non-cryptographic randomness is fine here; the id names the pairing
/// attempt, it is not a secret.
pub fn generate_device_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DEVICE_ID_LEN)
        .map(char::from)
        .collect()
}

/// Device descriptor sent with both pairing payloads.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceDescriptor {
    pub device_name: &'static str,
    pub device_os: &'static str,
    pub app_name: String,
    #[serde(rename = "type")]
    pub device_type: &'static str,
    pub app_id: &'static str,
    pub id: String,
    /// Only present on the grant step, carrying the tentative auth key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
}

impl DeviceDescriptor {
    fn new(app_name: &str, id: String, auth_key: Option<String>) -> Self {
        Self {
            device_name: DEVICE_NAME,
            device_os: DEVICE_OS,
            app_name: app_name.to_string(),
            device_type: DEVICE_TYPE,
            app_id: APPLICATION_ID,
            id,
            auth_key,
        }
    }
}

/// Ephemeral state for one `pair` invocation. Discarded once authorization
/// completes or fails.
#[derive(Debug, Clone)]
pub struct PairingAttempt {
    /// Freshly generated device identifier; becomes the credential's user id.
    pub device_id: String,
}

impl PairingAttempt {
    /// Generate a new attempt with a fresh device id.
    pub fn generate() -> Self {
        Self {
            device_id: generate_device_id(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PairRequestPayload {
    application_id: &'static str,
    device_id: String,
    scope: [&'static str; 3],
    device: DeviceDescriptor,
}

/// Parsed `/pair/request` response. Anything that does not fit this shape is
/// a protocol error; malformed bodies never propagate past this boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct PairRequestResponse {
    /// Server challenge timestamp. Some firmware sends it as a JSON number,
    /// some as a string; normalized to a string either way.
    #[serde(deserialize_with = "string_or_number")]
    pub timestamp: String,
    /// Tentative secret, valid once the grant step succeeds.
    pub auth_key: String,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Serialize)]
struct GrantAuth {
    pin: String,
    auth_timestamp: String,
    auth_signature: String,
}

#[derive(Debug, Serialize)]
struct PairGrantPayload {
    auth: GrantAuth,
    device: DeviceDescriptor,
}

/// Outcome of the request step: the tentative credential plus the server
/// timestamp the grant signature must cover.
#[derive(Debug, Clone)]
pub struct PairingStart {
    /// Tentative credential; invalid until `authorize_pair` succeeds.
    pub credential: Credential,
    /// Server challenge timestamp for the grant signature.
    pub timestamp: String,
}

/// Orchestrates the three network exchanges of the pairing handshake.
///
/// Every operation fails with [`TvError::PairingNotRequired`] on a device
/// whose API family skips pairing.
pub struct PairingCoordinator<'a> {
    transport: &'a dyn Transport,
    identity: &'a DeviceIdentity,
}

impl<'a> PairingCoordinator<'a> {
    pub fn new(transport: &'a dyn Transport, identity: &'a DeviceIdentity) -> Self {
        Self {
            transport,
            identity,
        }
    }

    fn ensure_pairing_required(&self) -> Result<()> {
        if self.identity.requires_pairing() {
            Ok(())
        } else {
            Err(TvError::PairingNotRequired)
        }
    }

    /// Step 1: request pairing. The TV starts showing the PIN after this
    /// call succeeds.
    pub async fn request_pair(&self) -> Result<PairingStart> {
        self.ensure_pairing_required()?;

        let attempt = PairingAttempt::generate();
        let payload = PairRequestPayload {
            application_id: APPLICATION_ID,
            device_id: attempt.device_id.clone(),
            scope: PAIRING_SCOPE,
            device: DeviceDescriptor::new(
                self.identity.app_name(),
                attempt.device_id.clone(),
                None,
            ),
        };

        let url = format!("{}/pair/request", self.identity.base_url());
        let body = serde_json::to_string(&payload).map_err(|e| TvError::Protocol {
            reason: format!("failed to encode pair request: {e}"),
        })?;

        tracing::debug!(device_id = %attempt.device_id, "requesting pairing");
        let raw = self.transport.post(&url, body, None).await?;

        let response: PairRequestResponse =
            serde_json::from_str(&raw).map_err(|e| TvError::Protocol {
                reason: format!("malformed pair request response: {e}"),
            })?;

        Ok(PairingStart {
            credential: Credential::new(attempt.device_id, response.auth_key),
            timestamp: response.timestamp,
        })
    }

    /// Step 3: authorize the pairing with the on-screen PIN.
    ///
    /// On success the tentative credential is returned unchanged, now valid
    /// for authenticated endpoints. A rejected PIN or signature surfaces as
    /// [`TvError::Auth`]; the caller must restart pairing from scratch.
    pub async fn authorize_pair(
        &self,
        timestamp: &str,
        pin: &str,
        credential: &Credential,
    ) -> Result<Credential> {
        self.ensure_pairing_required()?;

        if !pin_regex().is_match(pin) {
            return Err(TvError::Validation {
                field: "pin",
                value: pin.to_string(),
            });
        }

        let auth_signature = signature::sign(&format!("{timestamp}{pin}"));
        let payload = PairGrantPayload {
            auth: GrantAuth {
                pin: pin.to_string(),
                auth_timestamp: timestamp.to_string(),
                auth_signature,
            },
            device: DeviceDescriptor::new(
                self.identity.app_name(),
                credential.user.clone(),
                Some(credential.pass.clone()),
            ),
        };

        let url = format!("{}/pair/grant", self.identity.base_url());
        let body = serde_json::to_string(&payload).map_err(|e| TvError::Protocol {
            reason: format!("failed to encode pair grant: {e}"),
        })?;

        tracing::debug!(user = %credential.user, "authorizing pairing");
        match self.transport.post(&url, body, Some(credential)).await {
            Ok(_) => Ok(credential.clone()),
            Err(TvError::Status { status, .. }) => Err(TvError::Auth { status }),
            Err(err) => Err(err),
        }
    }

    /// Full handshake: request, await the caller-supplied PIN, authorize.
    ///
    /// The PIN provider is awaited exactly once, with no timeout of our own;
    /// timeout and cancellation policy belong to the caller. Any failure in
    /// either sub-step aborts the whole sequence, leaving nothing authorized.
    pub async fn pair<F, Fut>(&self, pin_provider: F) -> Result<Credential>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let start = self.request_pair().await?;
        let pin = pin_provider().await?;
        self.authorize_pair(&start.timestamp, &pin, &start.credential)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ApiFamily;

    use async_trait::async_trait;

    struct NeverTransport;

    #[async_trait]
    impl Transport for NeverTransport {
        async fn get(&self, _url: &str, _auth: Option<&Credential>) -> Result<String> {
            panic!("transport must not be reached");
        }

        async fn post(
            &self,
            _url: &str,
            _body: String,
            _auth: Option<&Credential>,
        ) -> Result<String> {
            panic!("transport must not be reached");
        }
    }

    #[test]
    fn test_device_id_shape() {
        for _ in 0..200 {
            let id = generate_device_id();
            assert_eq!(id.len(), DEVICE_ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_device_ids_are_not_constant() {
        let a = generate_device_id();
        let b = generate_device_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_payload_shape() {
        let payload = PairRequestPayload {
            application_id: APPLICATION_ID,
            device_id: "AAAAAAAAAAAAAAAA".to_string(),
            scope: PAIRING_SCOPE,
            device: DeviceDescriptor::new("MyApp", "AAAAAAAAAAAAAAAA".to_string(), None),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&payload).unwrap()).unwrap();

        assert_eq!(json["application_id"], "app.id");
        assert_eq!(json["scope"], serde_json::json!(["read", "write", "control"]));
        assert_eq!(json["device"]["device_name"], "heliotrope");
        assert_eq!(json["device"]["type"], "native");
        assert_eq!(json["device"]["app_name"], "MyApp");
        assert!(json["device"].get("auth_key").is_none());
    }

    #[test]
    fn test_grant_payload_includes_auth_key() {
        let payload = PairGrantPayload {
            auth: GrantAuth {
                pin: "1234".to_string(),
                auth_timestamp: "123".to_string(),
                auth_signature: "sig".to_string(),
            },
            device: DeviceDescriptor::new(
                "MyApp",
                "user-id".to_string(),
                Some("secret".to_string()),
            ),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&payload).unwrap()).unwrap();

        assert_eq!(json["auth"]["pin"], "1234");
        assert_eq!(json["auth"]["auth_timestamp"], "123");
        assert_eq!(json["auth"]["auth_signature"], "sig");
        assert_eq!(json["device"]["auth_key"], "secret");
        assert_eq!(json["device"]["id"], "user-id");
    }

    #[test]
    fn test_response_accepts_string_timestamp() {
        let response: PairRequestResponse =
            serde_json::from_str(r#"{"timestamp":"123","auth_key":"k"}"#).unwrap();
        assert_eq!(response.timestamp, "123");
        assert_eq!(response.auth_key, "k");
    }

    #[test]
    fn test_response_accepts_numeric_timestamp() {
        let response: PairRequestResponse =
            serde_json::from_str(r#"{"timestamp":4657,"auth_key":"k","error_id":"SUCCESS"}"#)
                .unwrap();
        assert_eq!(response.timestamp, "4657");
    }

    #[test]
    fn test_response_missing_auth_key_fails() {
        let result: std::result::Result<PairRequestResponse, _> =
            serde_json::from_str(r#"{"timestamp":"123"}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_request_pair_gated_by_family() {
        let identity =
            DeviceIdentity::with_family("10.0.0.2", None, ApiFamily::Jointspace).unwrap();
        let transport = NeverTransport;
        let coordinator = PairingCoordinator::new(&transport, &identity);

        let err = coordinator.request_pair().await.unwrap_err();
        assert!(matches!(err, TvError::PairingNotRequired));
    }

    #[tokio::test]
    async fn test_authorize_pair_gated_by_family() {
        let identity =
            DeviceIdentity::with_family("10.0.0.2", None, ApiFamily::Jointspace).unwrap();
        let transport = NeverTransport;
        let coordinator = PairingCoordinator::new(&transport, &identity);
        let cred = Credential::new("u", "p");

        let err = coordinator
            .authorize_pair("123", "1234", &cred)
            .await
            .unwrap_err();
        assert!(matches!(err, TvError::PairingNotRequired));
    }

    #[tokio::test]
    async fn test_pair_gated_by_family() {
        let identity =
            DeviceIdentity::with_family("10.0.0.2", None, ApiFamily::Jointspace).unwrap();
        let transport = NeverTransport;
        let coordinator = PairingCoordinator::new(&transport, &identity);

        let err = coordinator
            .pair(|| async { Ok("1234".to_string()) })
            .await
            .unwrap_err();
        assert!(matches!(err, TvError::PairingNotRequired));
    }

    #[tokio::test]
    async fn test_authorize_pair_rejects_bad_pin() {
        let identity = DeviceIdentity::new("10.0.0.2", None).unwrap();
        let transport = NeverTransport;
        let coordinator = PairingCoordinator::new(&transport, &identity);
        let cred = Credential::new("u", "p");

        for pin in ["123", "12345", "12a4", ""] {
            let err = coordinator
                .authorize_pair("123", pin, &cred)
                .await
                .unwrap_err();
            assert!(matches!(err, TvError::Validation { field: "pin", .. }));
        }
    }
}
