use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::landmarks::{Handedness, HandObservation, FINGER_JOINTS, THUMB_IP, THUMB_TIP};

#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::EnumIs,
)]
pub enum Gesture {
    Rock,
    Paper,
    Scissors,
    /// A hand was seen but its shape matched nothing.
    Unknown,
    /// No hand in the frame.
    #[default]
    None,
}

impl Gesture {
    pub fn as_move(self) -> Option<Move> {
        match self {
            Self::Rock => Some(Move::Rock),
            Self::Paper => Some(Move::Paper),
            Self::Scissors => Some(Move::Scissors),
            Self::Unknown | Self::None => None,
        }
    }

    pub fn is_playable(self) -> bool {
        self.as_move().is_some()
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rock => write!(f, "Rock"),
            Self::Paper => write!(f, "Paper"),
            Self::Scissors => write!(f, "Scissors"),
            Self::Unknown => write!(f, "Unknown"),
            Self::None => write!(f, "None"),
        }
    }
}

/// The three gestures that can actually be played.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::EnumCount,
)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];
}

impl From<Move> for Gesture {
    fn from(value: Move) -> Self {
        match value {
            Move::Rock => Gesture::Rock,
            Move::Paper => Gesture::Paper,
            Move::Scissors => Gesture::Scissors,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Gesture::from(*self).fmt(f)
    }
}

/// Thumb folds sideways, so it is tested on x. Source labels are mirrored:
/// a "Left" hand extends towards larger x, a "Right" hand towards smaller x.
pub fn thumb_extended(hand: &HandObservation) -> bool {
    let tip = hand.point(THUMB_TIP).x();
    let joint = hand.point(THUMB_IP).x();

    match hand.handedness() {
        Handedness::Left => tip > joint,
        Handedness::Right => tip < joint,
    }
}

pub fn extended_fingers(hand: &HandObservation) -> usize {
    let fingers = FINGER_JOINTS
        .iter()
        .filter(|(tip, joint)| hand.point(*tip).y() < hand.point(*joint).y())
        .count();

    fingers + usize::from(thumb_extended(hand))
}

pub fn classify(hand: &HandObservation) -> Gesture {
    match extended_fingers(hand) {
        0 => Gesture::Rock,
        2 => Gesture::Scissors,
        5 => Gesture::Paper,
        _ => Gesture::Unknown,
    }
}

/// First playable gesture in detection order, else whatever the first hand
/// showed.
pub fn primary_gesture(gestures: &[Gesture]) -> Gesture {
    gestures
        .iter()
        .copied()
        .find(|g| g.is_playable())
        .or_else(|| gestures.first().copied())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    mirror_handedness: bool,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            mirror_handedness: config.mirror_handedness,
        }
    }

    pub fn classify(&self, hand: &HandObservation) -> Gesture {
        if self.mirror_handedness {
            classify(&hand.with_handedness(hand.handedness().mirrored()))
        } else {
            classify(hand)
        }
    }

    pub fn classify_all(&self, hands: &[HandObservation]) -> Vec<Gesture> {
        hands.iter().map(|h| self.classify(h)).collect()
    }
}
