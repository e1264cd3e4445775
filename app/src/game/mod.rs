mod clock;
mod controller;
mod moves;
mod round;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{RoundController, RoundResult, RoundState, RoundTiming, Session, Transition};
pub use moves::{MoveSource, XorShiftMoves};
pub use round::{resolve, Outcome, Score};
