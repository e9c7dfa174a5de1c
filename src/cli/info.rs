//! `info` subcommand: dump the TV's system description.

use super::Cli;

pub async fn run_info_command(cli: &Cli, host: &str) -> anyhow::Result<()> {
    let session = cli.session(host)?;
    let info = session.info().await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
