//! `apps`, `channels`, `volume` and `key` subcommands.

use super::Cli;

pub async fn run_apps_command(cli: &Cli, host: &str, user: &str, pass: &str) -> anyhow::Result<()> {
    let session = cli.authed_session(host, user, pass)?;
    let apps = session.get_applications().await?;
    println!("{}", serde_json::to_string_pretty(&apps)?);
    Ok(())
}

pub async fn run_channels_command(
    cli: &Cli,
    host: &str,
    user: &str,
    pass: &str,
) -> anyhow::Result<()> {
    let session = cli.authed_session(host, user, pass)?;
    let index = session.load_channel_index().await?;
    for channel in index.channels() {
        println!("{}\t{}", channel.ccid, channel.name);
    }
    Ok(())
}

pub async fn run_volume_command(
    cli: &Cli,
    host: &str,
    user: &str,
    pass: &str,
    set: Option<i64>,
    percent: Option<i64>,
) -> anyhow::Result<()> {
    let session = cli.authed_session(host, user, pass)?;

    if let Some(value) = set {
        session.set_volume(value).await?;
        println!("volume set to {value}");
    } else if let Some(pct) = percent {
        session.set_volume_percentage(pct).await?;
        println!("volume set to {pct}%");
    } else {
        let status = session.get_volume().await?;
        println!(
            "current: {} ({}%), range: {}..{}, muted: {}",
            status.current,
            status.percentage()?,
            status.min,
            status.max,
            status.muted
        );
    }
    Ok(())
}

pub async fn run_key_command(
    cli: &Cli,
    host: &str,
    user: &str,
    pass: &str,
    key: &str,
) -> anyhow::Result<()> {
    let session = cli.authed_session(host, user, pass)?;
    session.send_key(key).await?;
    println!("sent {key}");
    Ok(())
}
