//! Starts the external media player on a chosen file.

use std::process::Stdio;
use std::time::Duration;

use color_eyre::eyre::{WrapErr, bail, eyre};
use tb_client::TorBoxApi;
use tb_core::{FileChosen, PlayerConfig};
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// A player that dies this soon after starting is treated as a failed launch.
const STARTUP_GRACE: Duration = Duration::from_secs(2);

/// Resolves a stream link for `chosen`, runs the player on it and waits for
/// the player to exit.
pub async fn play(
    api: &TorBoxApi,
    config: &PlayerConfig,
    chosen: &FileChosen,
) -> color_eyre::Result<()> {
    let file_id = chosen
        .file_id
        .ok_or_else(|| eyre!("{} has no file id and cannot be streamed", chosen.full_path))?;

    let link = api
        .request_download_link(&chosen.torrent_id, file_id)
        .await
        .wrap_err("failed to get a stream link")?;
    debug!(torrent_id = %chosen.torrent_id, file_id, "Resolved stream link");

    let mut child = spawn(config, &link)?;
    check_startup(&mut child, &config.command).await?;

    info!(player = %config.command, path = %chosen.full_path, "Player started");
    let status = child.wait().await?;
    info!(%status, "Player exited");
    Ok(())
}

fn spawn(config: &PlayerConfig, link: &str) -> color_eyre::Result<Child> {
    Command::new(&config.command)
        .args(&config.args)
        .arg(link)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .wrap_err_with(|| format!("failed to start '{}'", config.command))
}

/// Fails if the player exits unsuccessfully within [`STARTUP_GRACE`].
async fn check_startup(child: &mut Child, command: &str) -> color_eyre::Result<()> {
    tokio::time::sleep(STARTUP_GRACE).await;
    match child.try_wait()? {
        Some(status) if !status.success() => {
            bail!("'{command}' exited right after starting ({status})")
        }
        _ => Ok(()),
    }
}
