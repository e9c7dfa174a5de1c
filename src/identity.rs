//! Device identity: address, hardware address, and API family.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TvError};

/// Default Jointspace API version spoken by current Philips firmware.
pub const DEFAULT_API_VERSION: u32 = 6;

/// Default application name reported to the TV during pairing.
pub const DEFAULT_APP_NAME: &str = "Homebridge";

fn ip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
        )
        .expect("valid IPv4 regex")
    })
}

fn mac_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9A-F]{2}[:-]){5}([0-9A-F]{2})$").expect("valid MAC regex")
    })
}

/// The two mutually exclusive device protocol variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFamily {
    /// Older sets: plain HTTP on port 1925, no pairing handshake.
    Jointspace,
    /// Android-based sets: HTTPS on port 1926, challenge-response pairing.
    Android,
}

impl ApiFamily {
    /// Whether this family requires the three-step pairing handshake.
    pub fn requires_pairing(self) -> bool {
        matches!(self, ApiFamily::Android)
    }
}

impl std::fmt::Display for ApiFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiFamily::Jointspace => write!(f, "Jointspace"),
            ApiFamily::Android => write!(f, "Android"),
        }
    }
}

/// Identity of a TV on the local network.
///
/// Immutable after construction; construction fails with
/// [`TvError::Validation`] if the address or hardware address is malformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceIdentity {
    address: String,
    mac: Option<String>,
    api_version: u32,
    family: ApiFamily,
    app_name: String,
}

impl DeviceIdentity {
    /// Validate and build an identity for an Android-family TV with the
    /// default API version and application name.
    pub fn new(address: impl Into<String>, mac: Option<String>) -> Result<Self> {
        Self::with_family(address, mac, ApiFamily::Android)
    }

    /// Validate and build an identity for a specific API family.
    pub fn with_family(
        address: impl Into<String>,
        mac: Option<String>,
        family: ApiFamily,
    ) -> Result<Self> {
        let address = address.into();
        if !ip_regex().is_match(&address) {
            return Err(TvError::Validation {
                field: "address",
                value: address,
            });
        }

        if let Some(mac) = &mac {
            if !mac_regex().is_match(mac) {
                return Err(TvError::Validation {
                    field: "mac",
                    value: mac.clone(),
                });
            }
        }

        Ok(Self {
            address,
            mac,
            api_version: DEFAULT_API_VERSION,
            family,
            app_name: DEFAULT_APP_NAME.to_string(),
        })
    }

    /// Override the declared API version.
    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Override the application name reported during pairing.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// The validated IPv4 address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The validated hardware address, if one was supplied.
    pub fn mac(&self) -> Option<&str> {
        self.mac.as_deref()
    }

    /// Declared API generation.
    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Declared API family.
    pub fn family(&self) -> ApiFamily {
        self.family
    }

    /// Application name reported to the TV.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Whether this device requires the pairing handshake. Pure function of
    /// the API family.
    pub fn requires_pairing(&self) -> bool {
        self.family.requires_pairing()
    }

    /// URL scheme: `https` when pairing is required, else `http`.
    pub fn scheme(&self) -> &'static str {
        if self.requires_pairing() {
            "https"
        } else {
            "http"
        }
    }

    /// Fixed API port selected by family.
    pub fn port(&self) -> u16 {
        match self.family {
            ApiFamily::Jointspace => 1925,
            ApiFamily::Android => 1926,
        }
    }

    /// Base URL for all API endpoints, including the API version segment.
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}/{}",
            self.scheme(),
            self.address,
            self.port(),
            self.api_version
        )
    }
}
