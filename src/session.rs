//! Session aggregate: one TV, one credential, one logical thread of control.
//!
//! Sessions share nothing with each other, so multiple TVs can be driven
//! concurrently by independent sessions. All operations are strictly
//! sequential async chains within one session.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::channels::ChannelIndex;
use crate::config::TvConfig;
use crate::credential::Credential;
use crate::error::{Result, TvError};
use crate::identity::DeviceIdentity;
use crate::pairing::{PairingCoordinator, PairingStart};
use crate::readiness::ReadinessController;
use crate::transport::{HttpTransport, Transport};
use crate::wake::{WakeSignal, WolEmitter};

/// TV power state as reported and accepted by `/powerstate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    On,
    Standby,
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerState::On => write!(f, "On"),
            PowerState::Standby => write!(f, "Standby"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PowerStateBody {
    powerstate: PowerState,
}

/// Point-in-time volume snapshot. Never cached on the session; percentage
/// conversions re-read the range instead of trusting stale state.
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeStatus {
    pub muted: bool,
    pub current: i64,
    pub min: i64,
    pub max: i64,
}

impl VolumeStatus {
    /// Current level as a percentage of the device range, floored.
    pub fn percentage(&self) -> Result<i64> {
        let range = self.max - self.min;
        if range <= 0 {
            return Err(TvError::Protocol {
                reason: format!("invalid volume range {}..{}", self.min, self.max),
            });
        }
        Ok(self.current * 100 / range)
    }

    /// Raw level for a percentage of the device range, floored.
    pub fn raw_for_percentage(&self, percentage: i64) -> i64 {
        percentage * (self.max - self.min) / 100
    }
}

/// A TV session: identity, tuning, current credential, and the transports.
pub struct Session {
    identity: DeviceIdentity,
    config: TvConfig,
    credential: Option<Credential>,
    transport: Box<dyn Transport>,
    wake: Box<dyn WakeSignal>,
}

impl Session {
    /// Build a session with the production HTTP transport and WOL emitter.
    pub fn new(identity: DeviceIdentity, config: TvConfig) -> Result<Self> {
        let transport = Box::new(HttpTransport::new()?);
        let wake = Box::new(WolEmitter::new(config.broadcast_address.clone()));
        Ok(Self {
            identity,
            config,
            credential: None,
            transport,
            wake,
        })
    }

    /// Build a session over caller-supplied transport and wake seams.
    pub fn with_parts(
        identity: DeviceIdentity,
        config: TvConfig,
        transport: Box<dyn Transport>,
        wake: Box<dyn WakeSignal>,
    ) -> Self {
        Self {
            identity,
            config,
            credential: None,
            transport,
            wake,
        }
    }

    /// Attach a credential obtained from pairing or from the caller's own
    /// storage (persistence across restarts is the caller's job).
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn config(&self) -> &TvConfig {
        &self.config
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Whether this session's device requires the pairing handshake.
    pub fn requires_pairing(&self) -> bool {
        self.identity.requires_pairing()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.identity.base_url(), path)
    }

    fn auth(&self) -> Result<&Credential> {
        self.credential.as_ref().ok_or(TvError::MissingCredential)
    }

    async fn get_authed(&self, path: &str) -> Result<String> {
        let auth = self.auth()?;
        self.transport.get(&self.url(path), Some(auth)).await
    }

    async fn post_authed<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        let auth = self.auth()?;
        let body = serde_json::to_string(body).map_err(|e| TvError::Protocol {
            reason: format!("failed to encode request body: {e}"),
        })?;
        self.transport.post(&self.url(path), body, Some(auth)).await
    }

    fn parse<T: serde::de::DeserializeOwned>(&self, raw: &str, what: &str) -> Result<T> {
        serde_json::from_str(raw).map_err(|e| TvError::Protocol {
            reason: format!("malformed {what} response: {e}"),
        })
    }

    // --- Pairing ---

    /// The pairing coordinator for this session's device.
    pub fn pairing(&self) -> PairingCoordinator<'_> {
        PairingCoordinator::new(self.transport.as_ref(), &self.identity)
    }

    /// Step 1 of the handshake. See [`PairingCoordinator::request_pair`].
    pub async fn request_pair(&self) -> Result<PairingStart> {
        self.pairing().request_pair().await
    }

    /// Step 3 of the handshake. See [`PairingCoordinator::authorize_pair`].
    pub async fn authorize_pair(
        &self,
        timestamp: &str,
        pin: &str,
        credential: &Credential,
    ) -> Result<Credential> {
        self.pairing().authorize_pair(timestamp, pin, credential).await
    }

    /// Full handshake; on success the session adopts the new credential and
    /// it is also returned for the caller to persist.
    pub async fn pair<F, Fut>(&mut self, pin_provider: F) -> Result<Credential>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let credential = self.pairing().pair(pin_provider).await?;
        self.credential = Some(credential.clone());
        Ok(credential)
    }

    // --- Readiness ---

    fn readiness(&self) -> ReadinessController<'_> {
        ReadinessController::new(self.wake.as_ref(), &self.config, self.identity.mac())
    }

    /// Wake the TV and keep setting the power state to `On` until it sticks,
    /// bounded by the configured attempt count.
    pub async fn turn_on(&self) -> Result<()> {
        self.readiness()
            .run(self.config.wake_until_ready_attempts, || {
                self.set_power_state(PowerState::On)
            })
            .await
    }

    /// Wake the TV and poll the power state until the control API answers,
    /// bounded by the configured attempt count.
    pub async fn wake_until_ready(&self) -> Result<PowerState> {
        self.readiness()
            .run(self.config.wake_until_ready_attempts, || {
                self.get_power_state()
            })
            .await
    }

    // --- System ---

    /// System information. The only unauthenticated endpoint.
    pub async fn info(&self) -> Result<serde_json::Value> {
        let raw = self.transport.get(&self.url("system"), None).await?;
        self.parse(&raw, "system")
    }

    // --- Power ---

    pub async fn get_power_state(&self) -> Result<PowerState> {
        let raw = self.get_authed("powerstate").await?;
        let body: PowerStateBody = self.parse(&raw, "powerstate")?;
        Ok(body.powerstate)
    }

    pub async fn set_power_state(&self, state: PowerState) -> Result<()> {
        self.post_authed("powerstate", &PowerStateBody { powerstate: state })
            .await?;
        Ok(())
    }

    // --- Applications and activities ---

    pub async fn get_applications(&self) -> Result<serde_json::Value> {
        let raw = self.get_authed("applications").await?;
        self.parse(&raw, "applications")
    }

    pub async fn get_current_activity(&self) -> Result<serde_json::Value> {
        let raw = self.get_authed("activities/current").await?;
        self.parse(&raw, "current activity")
    }

    pub async fn launch_application(&self, application: &serde_json::Value) -> Result<()> {
        self.post_authed("activities/launch", application).await?;
        Ok(())
    }

    // --- TV channels ---

    pub async fn get_current_tv_channel(&self) -> Result<serde_json::Value> {
        let raw = self.get_authed("activities/tv").await?;
        self.parse(&raw, "current channel")
    }

    pub async fn launch_tv_channel(&self, channel: &serde_json::Value) -> Result<()> {
        self.post_authed("activities/tv", channel).await?;
        Ok(())
    }

    pub async fn get_tv_channels(&self) -> Result<serde_json::Value> {
        let raw = self.get_authed("channeldb/tv/channelLists/all").await?;
        self.parse(&raw, "channel list")
    }

    pub async fn get_favorite_list(&self, favorite_list_id: u32) -> Result<serde_json::Value> {
        let raw = self
            .get_authed(&format!("channeldb/tv/favoriteLists/{favorite_list_id}"))
            .await?;
        self.parse(&raw, "favorite list")
    }

    /// Fetch the channel database and build a fresh lookup index from it.
    pub async fn load_channel_index(&self) -> Result<ChannelIndex> {
        let raw = self.get_authed("channeldb/tv/channelLists/all").await?;
        let mut index = ChannelIndex::new();
        index.reload(&raw)?;
        Ok(index)
    }

    // --- Volume ---

    pub async fn get_volume(&self) -> Result<VolumeStatus> {
        let raw = self.get_authed("audio/volume").await?;
        self.parse(&raw, "volume")
    }

    pub async fn get_volume_percentage(&self) -> Result<i64> {
        self.get_volume().await?.percentage()
    }

    pub async fn set_volume(&self, value: i64) -> Result<()> {
        self.post_authed(
            "audio/volume",
            &serde_json::json!({ "muted": false, "current": value }),
        )
        .await?;
        Ok(())
    }

    /// Set the volume as a percentage of the device range. Reads the range
    /// first rather than trusting a cached snapshot.
    pub async fn set_volume_percentage(&self, percentage: i64) -> Result<()> {
        let status = self.get_volume().await?;
        self.set_volume(status.raw_for_percentage(percentage)).await
    }

    /// Mute or unmute, preserving the current level.
    pub async fn set_mute(&self, muted: bool) -> Result<()> {
        let status = self.get_volume().await?;
        self.post_authed(
            "audio/volume",
            &serde_json::json!({ "muted": muted, "current": status.current }),
        )
        .await?;
        Ok(())
    }

    // --- Input ---

    /// Emulate a remote-control key press (e.g. `Standby`, `VolumeUp`).
    pub async fn send_key(&self, key: &str) -> Result<()> {
        self.post_authed("input/key", &serde_json::json!({ "key": key }))
            .await?;
        Ok(())
    }

    // --- Ambilight ---

    pub async fn get_ambilight_state(&self) -> Result<bool> {
        let raw = self.get_authed("ambilight/power").await?;
        let body: serde_json::Value = self.parse(&raw, "ambilight power")?;
        Ok(body["power"] == "On")
    }

    /// Turn ambilight on with a style/setting, or off.
    pub async fn set_ambilight_state(
        &self,
        on: bool,
        style: Option<&str>,
        setting: Option<&str>,
    ) -> Result<()> {
        if on {
            self.post_authed(
                "ambilight/currentconfiguration",
                &serde_json::json!({
                    "styleName": style.unwrap_or("FOLLOW_VIDEO"),
                    "isExpert": false,
                    "menuSetting": setting.unwrap_or("GAME"),
                }),
            )
            .await?;
        } else {
            self.post_authed("ambilight/power", &serde_json::json!({ "power": "Off" }))
                .await?;
        }
        Ok(())
    }

    pub async fn get_ambilight_hue_state(&self) -> Result<bool> {
        let raw = self.get_authed("HueLamp/power").await?;
        let body: serde_json::Value = self.parse(&raw, "hue power")?;
        Ok(body["power"] == "On")
    }

    pub async fn set_ambilight_hue_state(&self, on: bool) -> Result<()> {
        let power = if on { "On" } else { "Off" };
        self.post_authed("HueLamp/power", &serde_json::json!({ "power": power }))
            .await?;
        Ok(())
    }

    /// Pass a raw ambilight configuration straight through.
    pub async fn send_custom_ambilight_cmd(&self, cmd: &serde_json::Value) -> Result<()> {
        self.post_authed("ambilight/currentconfiguration", cmd)
            .await?;
        Ok(())
    }
}
