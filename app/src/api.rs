//! One-shot detect / play operations, shaped like the original web backend's
//! JSON payloads.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::game::{resolve, MoveSource, Outcome, Score};
use crate::landmarks::{HandObservation, Handedness, LandmarkPoint, RawHand};
use crate::models::{primary_gesture, Classifier, Gesture, Move};

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Request {
    Detect(DetectRequest),
    Play(PlayRequest),
    Health,
    Index,
    Score,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct DetectRequest {
    #[serde(default)]
    pub hands: Option<Vec<RawHand>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PlayRequest {
    #[serde(rename = "playerGesture", default, deserialize_with = "lenient_gesture")]
    pub player_gesture: Gesture,
}

/// Anything that isn't a known gesture name becomes `Unknown`, so a bad value
/// is declined by `play_round` instead of failing the whole request.
fn lenient_gesture<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Gesture, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or(Gesture::Unknown))
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HandReport {
    pub label: Handedness,
    pub gesture: Gesture,
    pub landmarks: Vec<LandmarkPoint>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DetectResponse {
    pub success: bool,
    pub gesture: Gesture,
    pub hands: Vec<HandReport>,
    pub hand_count: usize,
    pub message: String,
}

impl DetectResponse {
    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            success: false,
            gesture: Gesture::None,
            hands: vec![],
            hand_count: 0,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_gesture: Option<Move>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computer_gesture: Option<Move>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Outcome>,
    pub message: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IndexResponse {
    pub message: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Detect(DetectResponse),
    Play(PlayResponse),
    Health(HealthResponse),
    Index(IndexResponse),
    Score(Score),
}

pub fn detect(classifier: &Classifier, req: DetectRequest) -> DetectResponse {
    let Some(raw) = req.hands else {
        return DetectResponse::declined("No landmarks provided");
    };

    let mut hands = Vec::with_capacity(raw.len());
    for (i, hand) in raw.into_iter().enumerate() {
        match HandObservation::try_from(hand) {
            Ok(hand) => hands.push(hand),
            Err(e) => return DetectResponse::declined(format!("Invalid landmarks for hand {}: {e}", i + 1)),
        }
    }

    if hands.is_empty() {
        return DetectResponse {
            success: true,
            gesture: Gesture::None,
            hands: vec![],
            hand_count: 0,
            message: "No hand detected".to_owned(),
        };
    }

    let gestures = classifier.classify_all(&hands);
    let primary = primary_gesture(&gestures);
    let reports: Vec<HandReport> = hands
        .iter()
        .zip(&gestures)
        .map(|(hand, gesture)| HandReport {
            label: hand.handedness(),
            gesture: *gesture,
            landmarks: hand.landmarks().to_vec(),
        })
        .collect();

    DetectResponse {
        success: true,
        gesture: primary,
        hand_count: reports.len(),
        message: format!("Detected {} hand(s): {primary}", reports.len()),
        hands: reports,
    }
}

/// Declines `None`/`Unknown` without touching the move source.
pub fn play_round(player: Gesture, moves: &mut impl MoveSource) -> PlayResponse {
    let Some(player) = player.as_move() else {
        return PlayResponse {
            success: false,
            player_gesture: None,
            computer_gesture: None,
            result: None,
            message: "Invalid gesture".to_owned(),
        };
    };

    let computer = moves.next_move();
    let outcome = resolve(player, computer);

    PlayResponse {
        success: true,
        player_gesture: Some(player),
        computer_gesture: Some(computer),
        result: Some(outcome),
        message: outcome.message().to_owned(),
    }
}

pub fn health() -> HealthResponse {
    HealthResponse {
        status: "healthy",
        message: "Backend server is running",
    }
}

pub fn index() -> IndexResponse {
    IndexResponse {
        message: "Rock Paper Scissors gesture API",
        endpoints: BTreeMap::from([
            ("detect", "Classify every hand in a landmark frame"),
            ("play", "Play one round against the computer"),
            ("score", "Running score of played rounds"),
            ("health", "Health check"),
        ]),
    }
}

/// Request dispatch shared by every connection. Stateless apart from the move
/// source and the scoreboard, both behind mutexes.
pub struct Service<M> {
    classifier: Classifier,
    moves: Mutex<M>,
    scoreboard: Mutex<Score>,
}

impl<M: MoveSource> Service<M> {
    pub fn new(classifier: Classifier, moves: M) -> Self {
        Self {
            classifier,
            moves: Mutex::new(moves),
            scoreboard: Mutex::new(Score::default()),
        }
    }

    pub fn score(&self) -> Score {
        *self.scoreboard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn handle(&self, req: Request) -> Response {
        match req {
            Request::Detect(req) => Response::Detect(detect(&self.classifier, req)),
            Request::Play(req) => Response::Play(self.play(req)),
            Request::Health => Response::Health(health()),
            Request::Index => Response::Index(index()),
            Request::Score => Response::Score(self.score()),
        }
    }

    /// Undecodable input is answered, never propagated.
    pub fn handle_bytes(&self, msg: &[u8]) -> Response {
        match serde_json::from_slice::<Request>(msg) {
            Ok(req) => self.handle(req),
            Err(e) => {
                warn!(error = %e, "rejecting undecodable request");
                Response::Detect(DetectResponse::declined(format!("Invalid payload: {e}")))
            }
        }
    }

    fn play(&self, req: PlayRequest) -> PlayResponse {
        let res = {
            let mut moves = self.moves.lock().unwrap_or_else(PoisonError::into_inner);
            play_round(req.player_gesture, &mut *moves)
        };

        if let Some(outcome) = res.result {
            let mut score = self.scoreboard.lock().unwrap_or_else(PoisonError::into_inner);
            score.record(outcome);
            debug!(%outcome, player = score.player, computer = score.computer, "round played");
        }

        res
    }
}
