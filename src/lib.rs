//! heliotv: pairing and control client for Philips Jointspace smart TVs.
//!
//! The crate centers on two pieces of protocol logic:
//! - the three-step pairing handshake that turns "no credentials" into a
//!   long-lived API credential ([`pairing`]), and
//! - the bounded wake/poll loop that brings a sleeping TV online
//!   ([`readiness`]).
//!
//! Everything else (HTTP transport, channel lookup, volume scaling, the
//! CLI) is plumbing around those two.
//!
//! ```no_run
//! use heliotv::{DeviceIdentity, Session, TvConfig};
//!
//! # async fn example() -> heliotv::Result<()> {
//! let identity = DeviceIdentity::new("192.168.1.50", Some("AA:BB:CC:DD:EE:FF".into()))?;
//! let mut session = Session::new(identity, TvConfig::default())?;
//!
//! let credential = session
//!     .pair(|| async {
//!         // Show the PIN prompt to the user; the TV displays the code.
//!         Ok("1234".to_string())
//!     })
//!     .await?;
//!
//! // Persist `credential` somewhere; next time, skip pairing:
//! session.turn_on().await?;
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod cli;
pub mod config;
pub mod credential;
pub mod error;
pub mod identity;
pub mod pairing;
pub mod readiness;
pub mod session;
pub mod transport;
pub mod wake;

pub use channels::{ChannelIndex, ChannelRecord};
pub use config::TvConfig;
pub use credential::Credential;
pub use error::{Result, TvError};
pub use identity::{ApiFamily, DeviceIdentity};
pub use pairing::{PairingCoordinator, PairingStart};
pub use readiness::ReadinessController;
pub use session::{PowerState, Session, VolumeStatus};
pub use transport::{HttpTransport, Transport};
pub use wake::{WakeSignal, WolEmitter};
