use std::fmt;

use error_stack::Context;

#[derive(Debug)]
pub enum GError {
    CommError,
    IpcError,
    ConfigError,
    PayloadError,
    SourceError,
}

impl fmt::Display for GError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommError => write!(f, "Error in channel"),
            Self::IpcError => write!(f, "Error while communicating with process"),
            Self::ConfigError => write!(f, "Error in loading config"),
            Self::PayloadError => write!(f, "Malformed payload"),
            Self::SourceError => write!(f, "Landmark source error"),
        }
    }
}

impl Context for GError {}
