//! `pair` subcommand: interactive pairing handshake.

use rustyline::DefaultEditor;

use crate::config::TvConfig;
use crate::error::TvError;
use crate::identity::DeviceIdentity;
use crate::session::Session;

use super::Cli;

pub async fn run_pair_command(cli: &Cli, host: &str, app_name: &str) -> anyhow::Result<()> {
    let identity = DeviceIdentity::with_family(host, cli.mac.clone(), cli.family())?
        .with_app_name(app_name);
    let mut session = Session::new(identity, TvConfig::default())?;

    println!("Requesting pairing; the TV will display a four-digit PIN.");
    let credential = session
        .pair(|| async {
            // Blocking prompt is fine here: pairing is the only thing the
            // process is doing, and the coordinator imposes no timeout.
            tokio::task::spawn_blocking(|| {
                let mut editor = DefaultEditor::new().map_err(|e| TvError::Protocol {
                    reason: format!("failed to open terminal: {e}"),
                })?;
                editor
                    .readline("Please enter the four-digit PIN: ")
                    .map(|line| line.trim().to_string())
                    .map_err(|e| TvError::Protocol {
                        reason: format!("failed to read PIN: {e}"),
                    })
            })
            .await
            .map_err(|e| TvError::Protocol {
                reason: format!("PIN prompt task failed: {e}"),
            })?
        })
        .await?;

    println!("Pairing succeeded. Save these for later commands:");
    println!("  user: {}", credential.user);
    println!("  pass: {}", credential.pass);
    Ok(())
}
