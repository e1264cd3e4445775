//! Hand landmark data as delivered by the upstream pose model.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// (tip, reference joint) for the four fingers tested on the y-axis.
pub const FINGER_JOINTS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

/// Normalized image position; `x` and `y` lie in `[0, 1]`, smaller `y` is
/// higher on screen. `z` is relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    x: f32,
    y: f32,
    z: f32,
}

impl LandmarkPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn z(&self) -> f32 {
        self.z
    }
}

/// Which hand the source thinks it saw. The label is mirrored with respect to
/// a viewer facing the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::EnumIs)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "Left"),
            Self::Right => write!(f, "Right"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkCountError(pub usize);

impl fmt::Display for LandmarkCountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {LANDMARK_COUNT} landmarks, got {}", self.0)
    }
}

impl std::error::Error for LandmarkCountError {}

/// One hand as it appears on the wire, before the point count is checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHand {
    pub label: Handedness,
    pub landmarks: Vec<LandmarkPoint>,
}

/// Exactly 21 landmarks plus the source's handedness label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHand", into = "RawHand")]
pub struct HandObservation {
    landmarks: [LandmarkPoint; LANDMARK_COUNT],
    handedness: Handedness,
}

impl HandObservation {
    pub fn new(landmarks: [LandmarkPoint; LANDMARK_COUNT], handedness: Handedness) -> Self {
        Self {
            landmarks,
            handedness,
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn landmarks(&self) -> &[LandmarkPoint; LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn point(&self, idx: usize) -> &LandmarkPoint {
        &self.landmarks[idx]
    }

    /// Same geometry under the opposite label.
    pub fn with_handedness(&self, handedness: Handedness) -> Self {
        Self {
            landmarks: self.landmarks,
            handedness,
        }
    }
}

impl TryFrom<RawHand> for HandObservation {
    type Error = LandmarkCountError;

    fn try_from(value: RawHand) -> Result<Self, Self::Error> {
        let len = value.landmarks.len();
        let landmarks: [LandmarkPoint; LANDMARK_COUNT] = value
            .landmarks
            .try_into()
            .map_err(|_| LandmarkCountError(len))?;

        Ok(Self::new(landmarks, value.label))
    }
}

impl From<HandObservation> for RawHand {
    fn from(value: HandObservation) -> Self {
        Self {
            label: value.handedness,
            landmarks: value.landmarks.to_vec(),
        }
    }
}
