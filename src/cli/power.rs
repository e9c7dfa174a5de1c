//! `power` subcommand: read or set the power state, optionally waking the TV.

use crate::session::PowerState;

use super::Cli;

pub async fn run_power_command(
    cli: &Cli,
    host: &str,
    user: &str,
    pass: &str,
    set: Option<&str>,
    wake: bool,
) -> anyhow::Result<()> {
    let session = cli.authed_session(host, user, pass)?;

    match set {
        Some("on") if wake => {
            session.turn_on().await?;
            println!("On");
        }
        Some(state) => {
            let state = if state == "on" {
                PowerState::On
            } else {
                PowerState::Standby
            };
            session.set_power_state(state).await?;
            println!("{state}");
        }
        None if wake => {
            let state = session.wake_until_ready().await?;
            println!("{state}");
        }
        None => {
            let state = session.get_power_state().await?;
            println!("{state}");
        }
    }
    Ok(())
}
