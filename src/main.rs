mod backend;
#[cfg(test)]
mod test_support;
mod utils;

use crate::backend::creeper::cli::{self, Cli};
use crate::backend::creeper::downloader::HttpDownloader;
use crate::backend::creeper::server::ServerLauncher;
use crate::backend::creeper::tunnel::{NgrokAgent, Tunnel};
use crate::backend::creeper::vanilla::{ServerDownloader, VersionManager, resolve};
use crate::utils::Settings;
use crate::utils::config::{SERVER_PORT, TUNNEL_REGION};
use anyhow::Context;
use clap::Parser;
use console::style;
use log::{debug, error, info, warn};
use std::process::ExitCode;
use std::sync::Arc;

/// Everything the server needs before it can be started.
struct Provisioned {
    settings: Settings,
    tunnel: Tunnel,
}

#[tokio::main]
async fn main() -> ExitCode {
    utils::logging::init_from_env();
    let cli = Cli::parse();

    println!("{}", style("Dream Server").bold().green());

    // Ctrl-C cancels provisioning at whatever step it is waiting on. Once the
    // server runs, the signal reaches it directly and it shuts down on its own.
    let provisioned = tokio::select! {
        result = provision(&cli) => result,
        _ = tokio::signal::ctrl_c() => exit_interrupted(),
    };

    let Provisioned { settings, tunnel } = match provisioned {
        Ok(provisioned) => provisioned,
        Err(e) if cli::is_interrupted(&e) => exit_interrupted(),
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "You can reach the Minecraft server at: {}",
        style(tunnel.public_url()).bold()
    );

    let mut launcher = ServerLauncher::new(&settings);
    if let Err(e) = launcher.launch(tunnel.public_url()).await {
        error!("Failed to run the Minecraft server: {e}");
        return ExitCode::FAILURE;
    }
    debug!("Server finished: {:?}", launcher.state());

    ExitCode::SUCCESS
}

/// Exits with 130 right away.
///
/// A prompt may still be blocked reading the terminal on its own thread, so
/// nothing waits for it. The terminal is put back into a usable state first.
fn exit_interrupted() -> ! {
    warn!("Interrupted, the server was not started");
    utils::terminal::restore();
    std::process::exit(130)
}

/// Catalog, version, download, tunnel. Each step starts after the previous one finished.
async fn provision(cli: &Cli) -> anyhow::Result<Provisioned> {
    let settings = cli.settings().await.context("Failed to load settings")?;
    let http = Arc::new(HttpDownloader::new().context("Failed to create HTTP client")?);

    let catalog = VersionManager::new(http.clone(), settings.manifest_url.clone())
        .fetch_catalog()
        .await
        .context("Failed to fetch the version manifest")?;

    let version = match &cli.server_version {
        Some(version) => version.clone(),
        None => cli::ask_version(catalog.latest_release()).await?,
    };
    let metadata_url = resolve(&catalog, &version)?;

    let jar = settings.server_jar_path();
    ServerDownloader::new(http)
        .download(metadata_url, &jar)
        .await
        .with_context(|| format!("Failed to download the Minecraft {version} server"))?;
    info!("Minecraft {version} server saved to {jar:?}");

    let token = match &cli.authtoken {
        Some(token) => token.clone(),
        None => cli::ask_token().await?,
    };
    let tunnel = NgrokAgent::new(settings.ngrok_path.clone(), TUNNEL_REGION)
        .open_tunnel(&token, SERVER_PORT)
        .await
        .context("Failed to create the ngrok tunnel")?;

    Ok(Provisioned { settings, tunnel })
}
