use std::path::PathBuf;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub socket: PathBuf,
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket: "/tmp/gesture-rps.sock".into(),
            workers: 4,
        }
    }
}

/// Where the external landmark process listens.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub socket: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            socket: "/tmp/landmarks.sock".into(),
        }
    }
}
