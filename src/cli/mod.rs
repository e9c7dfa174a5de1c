//! CLI command handling.
//!
//! Provides subcommands for:
//! - Fetching device information (`info`)
//! - Pairing with a TV to generate an API credential (`pair`)
//! - Reading and setting the power state, with wake-on-LAN (`power`)
//! - Listing installed applications (`apps`)
//! - Listing the channel database (`channels`)
//! - Reading and setting the volume (`volume`)
//! - Sending remote-control key presses (`key`)

mod info;
mod media;
mod pair;
mod power;

pub use info::run_info_command;
pub use media::{run_apps_command, run_channels_command, run_key_command, run_volume_command};
pub use pair::run_pair_command;
pub use power::run_power_command;

use clap::{Parser, Subcommand};

use crate::config::TvConfig;
use crate::credential::Credential;
use crate::error::Result;
use crate::identity::{ApiFamily, DeviceIdentity};
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "heliotv")]
#[command(about = "Pair with and control Philips Jointspace smart TVs on the local network")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Target an older Jointspace-family set (plain HTTP, no pairing)
    #[arg(long, global = true)]
    pub jointspace: bool,

    /// TV hardware address for wake-on-LAN (AA:BB:CC:DD:EE:FF)
    #[arg(long, global = true)]
    pub mac: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch system information from the TV
    Info {
        /// TV IP address
        host: String,
    },

    /// Pair with the TV to generate an API user and password
    Pair {
        /// TV IP address
        host: String,

        /// Application name shown on the TV's pairing screen
        #[arg(long, default_value = crate::identity::DEFAULT_APP_NAME)]
        app_name: String,
    },

    /// Read or set the TV power state
    Power {
        /// TV IP address
        host: String,
        /// API username from pairing
        user: String,
        /// API password from pairing
        pass: String,

        /// Set the power state instead of reading it
        #[arg(long, value_parser = ["on", "standby"])]
        set: Option<String>,

        /// Keep waking the TV until the command sticks (requires --mac)
        #[arg(long)]
        wake: bool,
    },

    /// List applications installed on the TV
    Apps {
        /// TV IP address
        host: String,
        /// API username from pairing
        user: String,
        /// API password from pairing
        pass: String,
    },

    /// List the TV channel database
    Channels {
        /// TV IP address
        host: String,
        /// API username from pairing
        user: String,
        /// API password from pairing
        pass: String,
    },

    /// Read or set the volume
    Volume {
        /// TV IP address
        host: String,
        /// API username from pairing
        user: String,
        /// API password from pairing
        pass: String,

        /// Set the raw volume level
        #[arg(long, conflicts_with = "percent")]
        set: Option<i64>,

        /// Set the volume as a percentage of the device range
        #[arg(long)]
        percent: Option<i64>,
    },

    /// Send a remote-control key press (e.g. Standby, VolumeUp, CursorUp)
    Key {
        /// TV IP address
        host: String,
        /// API username from pairing
        user: String,
        /// API password from pairing
        pass: String,
        /// Key name
        key: String,
    },
}

impl Cli {
    fn family(&self) -> ApiFamily {
        if self.jointspace {
            ApiFamily::Jointspace
        } else {
            ApiFamily::Android
        }
    }

    /// Build an unauthenticated session for the given host.
    pub fn session(&self, host: &str) -> Result<Session> {
        let identity = DeviceIdentity::with_family(host, self.mac.clone(), self.family())?;
        Session::new(identity, TvConfig::default())
    }

    /// Build a session authenticated with a caller-supplied credential.
    pub fn authed_session(&self, host: &str, user: &str, pass: &str) -> Result<Session> {
        Ok(self
            .session(host)?
            .with_credential(Credential::new(user, pass)))
    }
}

/// Dispatch the parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Info { host } => run_info_command(&cli, host).await,
        Command::Pair { host, app_name } => run_pair_command(&cli, host, app_name).await,
        Command::Power {
            host,
            user,
            pass,
            set,
            wake,
        } => run_power_command(&cli, host, user, pass, set.as_deref(), *wake).await,
        Command::Apps { host, user, pass } => run_apps_command(&cli, host, user, pass).await,
        Command::Channels { host, user, pass } => {
            run_channels_command(&cli, host, user, pass).await
        }
        Command::Volume {
            host,
            user,
            pass,
            set,
            percent,
        } => run_volume_command(&cli, host, user, pass, *set, *percent).await,
        Command::Key {
            host,
            user,
            pass,
            key,
        } => run_key_command(&cli, host, user, pass, key).await,
    }
}
