use super::eula::accept_eula;
use super::relay::{Readiness, relay};
use crate::utils::config::{READY_MARKER, SERVER_JAR};
use crate::utils::{Error, Result, Settings};
use log::{error, info, warn};
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Lifecycle of the server child process. `Exited` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    NotStarted,
    Running { pid: Option<u32> },
    Exited { code: Option<i32> },
}

/// Launches the dedicated server and relays its output until it exits.
pub struct ServerLauncher {
    program: PathBuf,
    args: Vec<String>,
    work_dir: PathBuf,
    eula_path: PathBuf,
    ready_marker: String,
    state: ServerState,
}

impl ServerLauncher {
    /// `java -jar server.jar`, run inside the configured work directory.
    pub fn new(settings: &Settings) -> Self {
        Self {
            program: settings.java_path.clone(),
            args: vec!["-jar".to_string(), SERVER_JAR.to_string()],
            work_dir: settings.work_dir.clone(),
            eula_path: settings.eula_path(),
            ready_marker: READY_MARKER.to_string(),
            state: ServerState::NotStarted,
        }
    }

    /// Replaces the server invocation, keeping work directory and EULA handling.
    #[cfg(test)]
    pub fn with_command<I, S>(mut self, program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = program.into();
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Accepts the EULA, starts the server and relays its stdout and stderr
    /// to the terminal. Once stdout contains the readiness marker, a
    /// highlighted line with `public_address` is printed.
    ///
    /// Resolves when the server exits. A non-zero exit code is reported but
    /// is not an error.
    pub async fn launch(&mut self, public_address: &str) -> Result<ExitStatus> {
        if self.state != ServerState::NotStarted {
            return Err(Error::Io(io::Error::other(
                "the server process was already started",
            )));
        }

        info!("Accepting the Minecraft EULA...");
        accept_eula(&self.eula_path).await?;

        info!("Starting Minecraft server...");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::Io(io::Error::new(
                    e.kind(),
                    format!("could not start {:?}: {e}", self.program),
                ))
            })?;

        self.state = ServerState::Running { pid: child.id() };
        info!("Minecraft server started with PID: {:?}", child.id());

        let readiness = Readiness::new(&self.ready_marker, public_address);
        let stdout_relay = child
            .stdout
            .take()
            .map(|out| tokio::spawn(relay(out, tokio::io::stdout(), Some(readiness))));
        let stderr_relay = child
            .stderr
            .take()
            .map(|err| tokio::spawn(relay(err, tokio::io::stderr(), None)));

        let status = child.wait().await?;
        finish_relay("stdout", stdout_relay).await;
        finish_relay("stderr", stderr_relay).await;

        self.state = ServerState::Exited {
            code: status.code(),
        };
        match status.code() {
            Some(0) => info!("Minecraft server exited with code 0"),
            Some(code) => warn!("Minecraft server exited with code {code}"),
            None => warn!("Minecraft server was terminated by a signal ({status})"),
        }

        Ok(status)
    }
}

async fn finish_relay(name: &str, relay: Option<JoinHandle<io::Result<u64>>>) {
    let Some(relay) = relay else {
        return;
    };
    match relay.await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => error!("Relaying server {name} failed: {e}"),
        Err(e) => error!("Server {name} relay task failed: {e}"),
    }
}
