//! Command line arguments and interactive prompts.

use crate::utils::{Result, Settings};
use anyhow::Context;
use clap::Parser;
use dialoguer::{Input, Password};
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::oneshot;

/// Download a vanilla Minecraft server, expose it through ngrok and run it.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON settings file; flags below take precedence over it.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Server version to download (asked interactively when omitted).
    #[arg(short = 'v', long)]
    pub server_version: Option<String>,

    /// ngrok authtoken (asked interactively when omitted).
    #[arg(long, env = "NGROK_AUTHTOKEN", hide_env_values = true)]
    pub authtoken: Option<String>,

    /// Directory for server.jar, eula.txt and the world.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Java executable used to run the server.
    #[arg(long)]
    pub java: Option<PathBuf>,

    /// ngrok agent executable.
    #[arg(long)]
    pub ngrok: Option<PathBuf>,

    /// Version manifest to read instead of Mojang's.
    #[arg(long)]
    pub manifest_url: Option<String>,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    pub async fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path).await?,
            None => Settings::default(),
        };

        if let Some(dir) = &self.dir {
            settings.work_dir = dir.clone();
        }
        if let Some(java) = &self.java {
            settings.java_path = java.clone();
        }
        if let Some(ngrok) = &self.ngrok {
            settings.ngrok_path = ngrok.clone();
        }
        if let Some(url) = &self.manifest_url {
            settings.manifest_url = url.clone();
        }

        Ok(settings)
    }
}

/// The user interrupted a prompt with Ctrl-C.
#[derive(Debug, Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Whether `err` comes from an interrupted prompt, through any added context.
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Interrupted>().is_some()
}

/// Runs a blocking dialoguer prompt on a thread of its own.
///
/// The runtime does not own that thread, so a prompt abandoned on Ctrl-C
/// never keeps the process from exiting. A read interrupted by a signal is
/// reported as [`Interrupted`].
async fn interact<T, F>(ask: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("prompt".to_string())
        .spawn(move || {
            let _ = tx.send(ask());
        })
        .context("Failed to start the prompt thread")?;

    match rx.await.context("The prompt thread stopped")? {
        Ok(answer) => Ok(answer),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => {
            Err(Interrupted.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Asks which version to download. An answer is required.
pub async fn ask_version(latest_release: Option<&str>) -> anyhow::Result<String> {
    let prompt = match latest_release {
        Some(latest) => format!(
            "Which server version do you want to download? (latest release: {latest})"
        ),
        None => "Which server version do you want to download?".to_string(),
    };

    let version = interact(move || {
        Input::<String>::new().with_prompt(prompt).interact_text()
    })
    .await
    .context("Failed to read the server version")?;

    Ok(version.trim().to_string())
}

/// Asks for the ngrok authtoken without echoing it.
pub async fn ask_token() -> anyhow::Result<String> {
    let token = interact(|| {
        Password::new()
            .with_prompt("Please enter your ngrok authtoken")
            .interact()
    })
    .await
    .context("Failed to read the ngrok authtoken")?;

    Ok(token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_dir;
    use std::time::{Duration, Instant};

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "DreamServer",
            "--server-version",
            "1.20.1",
            "--authtoken",
            "2abc",
            "--dir",
            "/srv/mc",
        ])
        .unwrap();
        assert_eq!(cli.server_version.as_deref(), Some("1.20.1"));
        assert_eq!(cli.authtoken.as_deref(), Some("2abc"));
        assert_eq!(cli.dir, Some(PathBuf::from("/srv/mc")));
    }

    #[tokio::test]
    async fn flags_override_config_file() {
        let dir = temp_dir().await;
        let config = dir.join("settings.json");
        tokio::fs::write(
            &config,
            r#"{"work_dir": "/from/config", "java_path": "/opt/java/bin/java"}"#,
        )
        .await
        .unwrap();

        let cli = Cli::try_parse_from([
            "DreamServer",
            "--config",
            config.to_str().unwrap(),
            "--dir",
            "/from/flag",
        ])
        .unwrap();
        let settings = cli.settings().await.unwrap();

        assert_eq!(settings.work_dir, PathBuf::from("/from/flag"));
        assert_eq!(settings.java_path, PathBuf::from("/opt/java/bin/java"));
        assert_eq!(settings.ngrok_path, PathBuf::from("ngrok"));
    }

    fn failed_read(kind: io::ErrorKind) -> dialoguer::Error {
        dialoguer::Error::IO(io::Error::new(kind, "read failed"))
    }

    #[tokio::test]
    async fn interrupted_read_is_reported_as_interrupt() {
        let err = interact::<String, _>(|| Err(failed_read(io::ErrorKind::Interrupted)))
            .await
            .context("Failed to read the server version")
            .unwrap_err();

        assert!(is_interrupted(&err), "{err:#}");
    }

    #[tokio::test]
    async fn other_prompt_failures_are_plain_errors() {
        let err = interact::<String, _>(|| Err(failed_read(io::ErrorKind::UnexpectedEof)))
            .await
            .unwrap_err();

        assert!(!is_interrupted(&err));
        assert!(format!("{err:#}").contains("read failed"));
    }

    #[tokio::test]
    async fn answers_are_passed_back() {
        let answer = interact(|| Ok("1.20.1".to_string())).await.unwrap();
        assert_eq!(answer, "1.20.1");
    }

    #[test]
    fn abandoned_prompt_does_not_hold_the_runtime() {
        // Stands in for a read that never returns, like a prompt left open on Ctrl-C.
        let (_release, blocked) = std::sync::mpsc::channel::<()>();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();

        let started = Instant::now();
        let answered = runtime.block_on(async {
            let prompt = interact(move || {
                let _ = blocked.recv();
                Ok(())
            });
            tokio::time::timeout(Duration::from_millis(100), prompt)
                .await
                .is_ok()
        });
        runtime.shutdown_timeout(Duration::from_secs(10));

        assert!(!answered);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
