use std::{
    collections::HashMap,
    fs::{self, File},
    io::prelude::*,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use base64::{engine::general_purpose::STANDARD, Engine};
use log::warn;
use net::{StatusDescription, StatusPayload, StatusPlayerSample, StatusPlayers, StatusVersion};
use serde::{Deserialize, Serialize};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Top-level configuration for the application, loaded from a TOML file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LodestoneConfig {
    /// Unique instance name or identifier.
    #[serde(default = "default_inst")]
    pub inst: String,

    /// Socket address to bind to, e.g. "0.0.0.0:25565".
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Maximum concurrent downstream connections.
    #[serde(default = "default_max_conn")]
    pub max_conn: u32,

    /// Accepted connections per second per client IP. 0 disables the limiter.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,

    /// Minimum back-off (seconds) reported to rate-limited clients.
    #[serde(default = "default_cooldown")]
    pub cooldown: u64,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub status: StatusConfig,

    #[serde(default)]
    pub login: LoginConfig,

    #[serde(flatten)]
    pub other_fields: HashMap<String, toml::Value>,
}

/// How long a client may take at each step.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Until the handshake frame is complete.
    pub handshake_ms: u64,
    /// For the whole status and ping exchange after the handshake.
    pub status_ms: u64,
}

/// Identity reported in the server list.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StatusConfig {
    pub version_name: String,
    pub protocol: i32,
    pub description: String,
    pub max_players: i32,
    pub online_players: i32,
    /// Path to a 64x64 PNG.
    pub favicon: Option<PathBuf>,
    pub enforces_secure_chat: bool,
    pub previews_chat: bool,
    pub sample: Vec<SampleConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SampleConfig {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoginConfig {
    /// Sent as a login disconnect to clients that try to join. Unset closes
    /// the connection without a message.
    pub disconnect_message: Option<String>,
}

fn default_inst() -> String {
    "main".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:25565".to_string()
}

fn default_max_conn() -> u32 {
    65535
}

fn default_rate_limit() -> u32 {
    10
}

fn default_cooldown() -> u64 {
    3
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            handshake_ms: 5_000,
            status_ms: 3_000,
        }
    }
}

impl TimeoutConfig {
    pub fn handshake(&self) -> Duration {
        Duration::from_millis(self.handshake_ms)
    }

    pub fn status(&self) -> Duration {
        Duration::from_millis(self.status_ms)
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            version_name: "Lodestone 1.20.1".to_string(),
            protocol: 763,
            description: "Hello from Lodestone!".to_string(),
            max_players: 20,
            online_players: 0,
            favicon: None,
            enforces_secure_chat: true,
            previews_chat: true,
            sample: Vec::new(),
        }
    }
}

impl Default for LodestoneConfig {
    fn default() -> Self {
        Self {
            inst: default_inst(),
            bind: default_bind(),
            max_conn: default_max_conn(),
            rate_limit: default_rate_limit(),
            cooldown: default_cooldown(),
            timeouts: TimeoutConfig::default(),
            status: StatusConfig::default(),
            login: LoginConfig::default(),
            other_fields: HashMap::new(),
        }
    }
}

impl LodestoneConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self, LodestoneConfigLoadError> {
        let raw = fs::read_to_string(path).map_err(LodestoneConfigLoadError::Io)?;
        let config: Self = toml::from_str(&raw).map_err(LodestoneConfigLoadError::Parse)?;

        for field in &config.other_fields {
            warn!(
                "Unknown configuration '{}' with value {:?}",
                field.0, field.1
            );
        }

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let config_str = toml::to_string(&self)?;
        let mut file = File::create(path)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }
}

impl StatusConfig {
    /// Builds the status body, reading the favicon from disk if configured.
    pub fn to_payload(&self) -> anyhow::Result<StatusPayload> {
        let favicon = match &self.favicon {
            Some(path) => {
                let png = fs::read(path)
                    .with_context(|| format!("failed to read favicon {}", path.display()))?;
                Some(favicon_data_uri(&png)?)
            }
            None => None,
        };

        Ok(StatusPayload {
            version: StatusVersion {
                name: self.version_name.clone(),
                protocol: self.protocol,
            },
            players: StatusPlayers {
                max: self.max_players,
                online: self.online_players,
                sample: self
                    .sample
                    .iter()
                    .map(|s| StatusPlayerSample {
                        name: s.name.clone(),
                        id: s.id.clone(),
                    })
                    .collect(),
            },
            description: StatusDescription {
                text: self.description.clone(),
            },
            favicon,
            enforces_secure_chat: self.enforces_secure_chat,
            previews_chat: self.previews_chat,
        })
    }
}

pub fn favicon_data_uri(png: &[u8]) -> anyhow::Result<String> {
    if !png.starts_with(&PNG_SIGNATURE) {
        bail!("favicon is not a PNG image");
    }
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

#[derive(Debug, thiserror::Error)]
pub enum LodestoneConfigLoadError {
    #[error("Could not open config")]
    Io(#[from] std::io::Error),
    #[error("Could not parse")]
    Parse(#[from] toml::de::Error),
}
