use std::{collections::VecDeque, fs, os::unix::net::UnixStream, path::Path};

use error_stack::{Report, Result, ResultExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    landmarks::{HandObservation, LandmarkCountError, RawHand},
    traits::{LandmarkSource, WantIpc},
    GError,
};

/// Request code asking the landmark process for its next frame.
const NEXT_FRAME: u32 = 1;

/// Everything the landmark model reported for one frame.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(default)]
    pub hands: Vec<RawHand>,
}

impl LandmarkFrame {
    pub fn into_hands(self) -> std::result::Result<Vec<HandObservation>, LandmarkCountError> {
        self.hands.into_iter().map(HandObservation::try_from).collect()
    }
}

/// Client for an external landmark process listening on a unix socket.
pub struct IpcLandmarkSource {
    unix_stream: UnixStream,
}

impl IpcLandmarkSource {
    pub fn new(unix_stream: UnixStream) -> Self {
        Self { unix_stream }
    }

    pub fn connect(addr: impl AsRef<Path>) -> Result<Self, GError> {
        let addr = addr.as_ref();
        let unix_stream = UnixStream::connect(addr)
            .change_context(GError::IpcError)
            .attach_printable_lazy(|| format!("Couldn't reach landmark source at {}", addr.display()))?;
        debug!(addr = %addr.display(), "landmark source connected");
        Ok(Self::new(unix_stream))
    }
}

impl WantIpc for IpcLandmarkSource {
    fn unix_stream(&self) -> &UnixStream {
        &self.unix_stream
    }
}

impl LandmarkSource for IpcLandmarkSource {
    fn next_frame(&mut self) -> Result<Vec<HandObservation>, GError> {
        self.send_u32(NEXT_FRAME)?;
        let msg = self
            .recv_frame()?
            .ok_or_else(|| Report::new(GError::SourceError))
            .attach_printable("Landmark source closed the connection")?;

        let frame: LandmarkFrame = match serde_json::from_slice(&msg) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "undecodable landmark frame, treating as empty");
                return Ok(vec![]);
            }
        };

        Ok(frame.into_hands().unwrap_or_else(|e| {
            warn!(error = %e, "malformed hand in landmark frame, treating as empty");
            vec![]
        }))
    }
}

/// Plays back prepared frames; yields empty frames once it runs dry.
#[derive(Default, Debug, Clone)]
pub struct ScriptedSource {
    frames: VecDeque<Vec<HandObservation>>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = Vec<HandObservation>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// One `LandmarkFrame` JSON object per non-empty line.
    pub fn from_jsonl(path: impl AsRef<Path>) -> Result<Self, GError> {
        let text = fs::read_to_string(path.as_ref())
            .change_context(GError::SourceError)
            .attach_printable("Couldn't read the replay file")?;

        let mut frames = VecDeque::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let frame: LandmarkFrame = serde_json::from_str(line)
                .change_context(GError::PayloadError)
                .attach_printable_lazy(|| format!("line {}", lineno + 1))?;
            let hands = frame
                .into_hands()
                .change_context(GError::PayloadError)
                .attach_printable_lazy(|| format!("line {}", lineno + 1))?;
            frames.push_back(hands);
        }

        Ok(Self { frames })
    }

    pub fn push(&mut self, hands: Vec<HandObservation>) {
        self.frames.push_back(hands);
    }
}

impl LandmarkSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Vec<HandObservation>, GError> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }

    fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}
