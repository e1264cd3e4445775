use std::{fs, path::PathBuf};

use error_stack::{Report, ResultExt};
use serde::Deserialize;

mod endpoints;
mod round;

pub use endpoints::{ServerConfig, SourceConfig};
pub use round::RoundConfig;

use crate::GError;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub round: RoundConfig,
    pub classifier: ClassifierConfig,
    pub server: ServerConfig,
    pub source: SourceConfig,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Swap Left/Right before the thumb test, for sources that were fed an
    /// un-flipped frame.
    pub mirror_handedness: bool,
}

impl Config {
    pub fn open(path: PathBuf) -> error_stack::Result<Self, GError> {
        Self::try_from(path)
    }

    /// Parses and validates a TOML document.
    pub fn parse(text: &str) -> error_stack::Result<Self, GError> {
        let config: Self = toml::from_str(text).change_context(GError::ConfigError)?;
        config.round.timing()?;
        Ok(config)
    }

    /// Falls back to defaults when no path is given.
    pub fn open_or_default(path: Option<PathBuf>) -> error_stack::Result<Self, GError> {
        path.map_or_else(|| Ok(Self::default()), Self::open)
    }
}

impl TryFrom<PathBuf> for Config {
    type Error = Report<GError>;

    fn try_from(value: PathBuf) -> Result<Self, Self::Error> {
        Self::parse(
            &fs::read_to_string(&value)
                .change_context(GError::ConfigError)
                .attach_printable_lazy(|| format!("Couldn't read the config file {}", value.display()))?,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::Config;

    #[test]
    fn parse_config() {
        let config_toml = r#"
        [round]
        countdown_secs = 5
        tick_ms = 16

        [classifier]
        mirror_handedness = true

        [server]
        socket = "/run/rps.sock"
        "#;

        let config: Config = toml::from_str(config_toml).unwrap();

        assert_eq!(config.round.countdown_secs, 5.0);
        assert_eq!(config.round.result_secs, 3.0);
        assert_eq!(config.round.tick_ms, 16);
        assert!(config.classifier.mirror_handedness);
        assert_eq!(config.server.socket.to_str(), Some("/run/rps.sock"));
        assert_eq!(config.server.workers, 4);
        assert_eq!(config.source.socket.to_str(), Some("/tmp/landmarks.sock"));
    }

    #[test]
    fn empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn open_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[round]\nresult_secs = 1.5").unwrap();

        let config = Config::open(file.path().to_path_buf()).unwrap();
        assert_eq!(config.round.result_secs, 1.5);

        assert!(Config::open("/definitely/not/here.toml".into()).is_err());
        assert!(Config::parse("[round]\nresult_secs = 2").is_ok());
        assert_eq!(Config::open_or_default(None).unwrap(), Config::default());
    }

    #[test]
    fn huge_countdown_is_rejected_at_load() {
        assert!(Config::parse("[round]\ncountdown_secs = 1e30").is_err());
        assert!(Config::parse("[round]\nresult_secs = inf").is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[round]\ncountdown_secs = 1e30").unwrap();
        assert!(Config::open(file.path().to_path_buf()).is_err());
    }
}
