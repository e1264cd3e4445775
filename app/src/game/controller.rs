//! Live-session round state machine.
//!
//! Waiting --start--> Countdown --deadline passed, valid gesture--> Result --expiry--> Waiting.
//! A countdown that ends without a playable gesture re-arms itself.
//! All deadlines are absolute readings of the injected [`Clock`], so a late or
//! irregular tick never shifts them.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{resolve, Clock, MoveSource, Outcome, Score};
use crate::models::{Gesture, Move};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum_macros::EnumIs)]
pub enum RoundState {
    #[default]
    Waiting,
    Countdown,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTiming {
    pub countdown: Duration,
    pub result_display: Duration,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            countdown: Duration::from_secs(3),
            result_display: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundResult {
    pub player: Move,
    pub computer: Move,
    pub outcome: Outcome,
}

/// What a tick changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Idle,
    /// Countdown ran out with nothing playable and started over.
    Rearmed,
    Locked(RoundResult),
    /// Result display is over, back to waiting.
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    score: Score,
    state: RoundState,
    locked_player_gesture: Gesture,
    computer_gesture: Gesture,
    candidate: Gesture,
    result_text: String,
    last_result: Option<RoundResult>,
    countdown_deadline: Option<Duration>,
    result_expiry: Option<Duration>,
}

impl Session {
    pub fn score(&self) -> Score {
        self.score
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// `Gesture::None` outside of `Result`.
    pub fn locked_player_gesture(&self) -> Gesture {
        self.locked_player_gesture
    }

    /// `Gesture::None` outside of `Result`.
    pub fn computer_gesture(&self) -> Gesture {
        self.computer_gesture
    }

    pub fn candidate(&self) -> Gesture {
        self.candidate
    }

    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    pub fn last_result(&self) -> Option<RoundResult> {
        self.last_result
    }

    pub fn countdown_deadline(&self) -> Option<Duration> {
        self.countdown_deadline
    }

    pub fn result_expiry(&self) -> Option<Duration> {
        self.result_expiry
    }
}

pub struct RoundController<C, M> {
    session: Session,
    timing: RoundTiming,
    clock: C,
    moves: M,
}

impl<C: Clock, M: MoveSource> RoundController<C, M> {
    pub fn new(timing: RoundTiming, clock: C, moves: M) -> Self {
        Self {
            session: Session::default(),
            timing,
            clock,
            moves,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> RoundState {
        self.session.state
    }

    pub fn score(&self) -> Score {
        self.session.score
    }

    /// Only honoured while waiting.
    pub fn start(&mut self) -> bool {
        if !self.session.state.is_waiting() {
            return false;
        }

        let now = self.clock.now();
        self.session.locked_player_gesture = Gesture::None;
        self.session.computer_gesture = Gesture::None;
        self.session.result_text.clear();
        self.session.last_result = None;
        self.arm_countdown(now);
        true
    }

    pub fn tick(&mut self, observed: Gesture) -> Transition {
        let now = self.clock.now();

        match self.session.state {
            RoundState::Waiting => Transition::Idle,
            RoundState::Countdown => self.tick_countdown(now, observed),
            RoundState::Result => self.tick_result(now),
        }
    }

    /// Whole seconds left, rounded up. `None` outside of a countdown.
    pub fn countdown_display(&self) -> Option<u64> {
        self.remaining()
            .map(|remaining| remaining.as_secs_f64().ceil() as u64)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.session
            .countdown_deadline
            .map(|deadline| deadline.saturating_sub(self.clock.now()))
    }

    fn arm_countdown(&mut self, now: Duration) {
        self.session.state = RoundState::Countdown;
        self.session.candidate = Gesture::None;
        self.session.result_expiry = None;
        self.session.countdown_deadline = Some(now.saturating_add(self.timing.countdown));
    }

    fn tick_countdown(&mut self, now: Duration, observed: Gesture) -> Transition {
        let Some(deadline) = self.session.countdown_deadline else {
            self.arm_countdown(now);
            return Transition::Rearmed;
        };

        if now <= deadline {
            // a frame without a hand keeps the previous candidate
            if !observed.is_none() {
                self.session.candidate = observed;
            }
            return Transition::Idle;
        }

        let Some(player) = self.session.candidate.as_move() else {
            debug!(candidate = %self.session.candidate, "no playable gesture, countdown re-armed");
            self.arm_countdown(now);
            return Transition::Rearmed;
        };

        let computer = self.moves.next_move();
        let outcome = resolve(player, computer);
        let result = RoundResult {
            player,
            computer,
            outcome,
        };

        self.session.score.record(outcome);
        self.session.state = RoundState::Result;
        self.session.locked_player_gesture = player.into();
        self.session.computer_gesture = computer.into();
        self.session.candidate = Gesture::None;
        self.session.countdown_deadline = None;
        self.session.result_expiry = Some(now.saturating_add(self.timing.result_display));
        self.session.result_text = outcome.message().to_owned();
        self.session.last_result = Some(result);

        Transition::Locked(result)
    }

    fn tick_result(&mut self, now: Duration) -> Transition {
        if self.session.result_expiry.is_some_and(|expiry| now <= expiry) {
            return Transition::Idle;
        }

        self.session.state = RoundState::Waiting;
        self.session.locked_player_gesture = Gesture::None;
        self.session.computer_gesture = Gesture::None;
        self.session.result_expiry = None;
        Transition::Finished
    }
}
