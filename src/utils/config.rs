use crate::utils::Result;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Mojang's version catalog.
pub const MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// Default Minecraft server port; the tunnel always points here.
pub const SERVER_PORT: u16 = 25565;

/// ngrok region the tunnel is opened in.
pub const TUNNEL_REGION: &str = "us";

/// Printed by the server once the world is loaded (`Done (3.2s)! For help, type "help"`).
pub const READY_MARKER: &str = "Done";

pub const SERVER_JAR: &str = "server.jar";
pub const EULA_FILE: &str = "eula.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub manifest_url: String,
    /// Directory holding `server.jar`, `eula.txt` and the world the server creates.
    pub work_dir: PathBuf,
    pub java_path: PathBuf,
    pub ngrok_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest_url: MANIFEST_URL.to_string(),
            work_dir: PathBuf::from("."),
            java_path: PathBuf::from("java"),
            ngrok_path: PathBuf::from("ngrok"),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing keys keep their defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid config {}: {e}", path.display()),
            )
            .into()
        })
    }

    pub fn server_jar_path(&self) -> PathBuf {
        self.work_dir.join(SERVER_JAR)
    }

    pub fn eula_path(&self) -> PathBuf {
        self.work_dir.join(EULA_FILE)
    }
}
