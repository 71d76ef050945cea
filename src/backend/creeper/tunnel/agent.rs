//! Runs the ngrok agent and opens a TCP tunnel through it.

use super::api::AgentApi;
use crate::utils::{Error, Result};
use log::{debug, info, warn};
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, Command};

/// Tunnel name registered with the agent.
const TUNNEL_NAME: &str = "minecraft";

/// `key=value` or `key="quoted \"value\""`.
const LOGFMT_PATTERN: &str = r#"(\w+)=("(?:[^"\\]|\\.)*"|\S*)"#;

static LOGFMT_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(LOGFMT_PATTERN).expect("logfmt pattern"));

/// What a single agent log line tells us while waiting for the tunnel session.
#[derive(Debug, PartialEq, Eq)]
pub enum AgentEvent {
    /// The local web API is listening on this `host:port`.
    WebService(String),
    SessionEstablished,
    Failed(String),
    Other,
}

/// Returns the value of `key` in a logfmt line, with quotes and escapes removed.
pub fn logfmt_field(line: &str, key: &str) -> Option<String> {
    LOGFMT_FIELD
        .captures_iter(line)
        .find(|caps| &caps[1] == key)
        .map(|caps| {
            let value = &caps[2];
            match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
                Some(quoted) => quoted.replace("\\\"", "\"").replace("\\\\", "\\"),
                None => value.to_string(),
            }
        })
}

pub fn classify(line: &str) -> AgentEvent {
    let level = logfmt_field(line, "lvl");
    let msg = logfmt_field(line, "msg").unwrap_or_default();

    if matches!(level.as_deref(), Some("eror" | "crit")) {
        let reason = logfmt_field(line, "err").unwrap_or_else(|| msg.clone());
        return AgentEvent::Failed(reason);
    }

    match msg.as_str() {
        "starting web service" => logfmt_field(line, "addr")
            .map(AgentEvent::WebService)
            .unwrap_or(AgentEvent::Other),
        "client session established" | "tunnel session started" => AgentEvent::SessionEstablished,
        _ => AgentEvent::Other,
    }
}

/// Where to find the agent and which region it connects to.
pub struct NgrokAgent {
    program: PathBuf,
    region: String,
}

/// An open tunnel. The agent process lives as long as this value.
pub struct Tunnel {
    public_url: String,
    _agent: Child,
}

impl Tunnel {
    /// Public address players connect to, e.g. `tcp://0.tcp.ngrok.io:14253`.
    pub fn public_url(&self) -> &str {
        &self.public_url
    }
}

impl NgrokAgent {
    pub fn new(program: impl Into<PathBuf>, region: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            region: region.into(),
        }
    }

    fn command(&self, auth_token: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["start", "--none", "--log", "stdout", "--log-format", "logfmt"])
            .args(["--region", &self.region])
            // Passed through the environment so it does not show up in `ps`.
            .env("NGROK_AUTHTOKEN", auth_token)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Starts the agent and exposes `local_port` over TCP.
    ///
    /// Fails with [`Error::Tunnel`] when the agent cannot be started, reports
    /// an error (bad authtoken, unreachable ngrok servers) or refuses the tunnel.
    pub async fn open_tunnel(&self, auth_token: &str, local_port: u16) -> Result<Tunnel> {
        info!("Creating ngrok tunnel in region {}...", self.region);

        let program = &self.program;
        let child = self
            .command(auth_token)
            .spawn()
            .map_err(|e| Error::Tunnel(format!("cannot run {program:?}: {e}")))?;

        let tunnel = establish(child, local_port).await?;
        info!("ngrok tunnel created: {}", tunnel.public_url);
        Ok(tunnel)
    }
}

/// Waits for the agent's web API and session, then asks it for the tunnel.
async fn establish(mut child: Child, local_port: u16) -> Result<Tunnel> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Tunnel("ngrok stdout not captured".to_string()))?;
    let mut lines = BufReader::new(stdout).lines();

    let mut api_addr = None;
    let mut session_up = false;
    while api_addr.is_none() || !session_up {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return Err(agent_exited(&mut child).await),
            Err(e) => return Err(Error::Tunnel(format!("could not read ngrok output: {e}"))),
        };
        debug!("ngrok: {line}");

        match classify(&line) {
            AgentEvent::WebService(addr) => api_addr = Some(addr),
            AgentEvent::SessionEstablished => session_up = true,
            AgentEvent::Failed(reason) => return Err(Error::Tunnel(reason)),
            AgentEvent::Other => {}
        }
    }

    // The agent blocks once a pipe fills up, so keep reading both.
    tokio::spawn(drain(lines));
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(drain(BufReader::new(stderr).lines()));
    }

    let api_addr = api_addr.unwrap_or_default();
    let api = AgentApi::new(&api_addr)?;
    let public_url = api.start_tcp_tunnel(TUNNEL_NAME, local_port).await?;

    Ok(Tunnel {
        public_url,
        _agent: child,
    })
}

async fn drain<R: AsyncRead + Unpin>(mut lines: Lines<BufReader<R>>) {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match classify(&line) {
                AgentEvent::Failed(reason) => warn!("ngrok: {reason}"),
                _ => debug!("ngrok: {line}"),
            },
            Ok(None) => break,
            Err(e) => {
                debug!("Stopped reading ngrok output: {e}");
                break;
            }
        }
    }
}

async fn agent_exited(child: &mut Child) -> Error {
    let mut stderr = String::new();
    if let Some(mut pipe) = child.stderr.take() {
        let _ = pipe.read_to_string(&mut stderr).await;
    }
    let status = match child.wait().await {
        Ok(status) => status.to_string(),
        Err(e) => e.to_string(),
    };

    let stderr = stderr.trim();
    if stderr.is_empty() {
        Error::Tunnel(format!(
            "ngrok agent exited before the tunnel was ready ({status})"
        ))
    } else {
        Error::Tunnel(format!("ngrok agent exited ({status}): {stderr}"))
    }
}
