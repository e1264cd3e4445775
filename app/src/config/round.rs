use std::time::Duration;

use error_stack::ResultExt;
use serde::Deserialize;

use crate::{game::RoundTiming, GError};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RoundConfig {
    pub countdown_secs: f64,
    pub result_secs: f64,
    pub tick_ms: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 3.0,
            result_secs: 3.0,
            tick_ms: 33,
        }
    }
}

impl RoundConfig {
    /// Negative values clamp to zero; values no `Duration` can hold are
    /// rejected.
    pub fn timing(&self) -> error_stack::Result<RoundTiming, GError> {
        Ok(RoundTiming {
            countdown: secs("countdown_secs", self.countdown_secs)?,
            result_display: secs("result_secs", self.result_secs)?,
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

fn secs(name: &str, value: f64) -> error_stack::Result<Duration, GError> {
    Duration::try_from_secs_f64(value.max(0.0))
        .change_context(GError::ConfigError)
        .attach_printable_lazy(|| format!("[round] {name} = {value} is out of range"))
}
