use std::{
    io::{self, BufRead},
    thread,
    time::{Duration, Instant},
};

use error_stack::ResultExt;
use flume::{Receiver, Sender};
use tracing::{debug, info, warn};

use config::Config;
use game::{Clock, MoveSource, RoundController, Transition};
use models::{primary_gesture, Classifier, Gesture};

mod error;

pub mod api;
pub mod config;
pub mod game;
pub mod landmarks;
pub mod models;
pub mod server;
pub mod traits;

pub use error::GError;
pub use traits::{LandmarkSource, WantIpc};

/// Keyboard input for the live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "s" | "start" => Some(Self::Start),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Reads commands from stdin on a helper thread. The channel closes at EOF.
pub fn spawn_stdin_commands() -> error_stack::Result<Receiver<Command>, GError> {
    let (tx, rx) = flume::unbounded();
    thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || read_commands(io::stdin().lock(), tx))
        .change_context(GError::CommError)?;
    Ok(rx)
}

fn read_commands(input: impl BufRead, tx: Sender<Command>) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        match Command::parse(&line) {
            Some(cmd) => {
                if tx.send(cmd).is_err() {
                    break;
                }
            }
            None => warn!(input = line.trim(), "unknown command, use enter/s to start or q to quit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Live session: capture, classify, drive the round controller, one tick at
/// a time.
pub struct App<S, C, M> {
    classifier: Classifier,
    source: S,
    controller: RoundController<C, M>,
    commands: Receiver<Command>,
    auto_start: bool,
    last_display: Option<u64>,
    last_primary: Gesture,
}

impl<S: LandmarkSource, C: Clock, M: MoveSource> App<S, C, M> {
    pub fn new(
        config: &Config,
        source: S,
        clock: C,
        moves: M,
        commands: Receiver<Command>,
    ) -> error_stack::Result<Self, GError> {
        Ok(Self {
            classifier: Classifier::new(&config.classifier),
            source,
            controller: RoundController::new(config.round.timing()?, clock, moves),
            commands,
            auto_start: false,
            last_display: None,
            last_primary: Gesture::None,
        })
    }

    /// Begin a new round whenever the previous one is over.
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn controller(&self) -> &RoundController<C, M> {
        &self.controller
    }

    pub fn step(&mut self) -> error_stack::Result<Flow, GError> {
        let pending: Vec<Command> = self.commands.try_iter().collect();
        for cmd in pending {
            match cmd {
                Command::Start => self.start(),
                Command::Quit => return Ok(Flow::Stop),
            }
        }

        if self.auto_start && self.controller.state().is_waiting() && !self.source.is_exhausted() {
            self.start();
        }

        let hands = self.source.next_frame()?;
        let gestures = self.classifier.classify_all(&hands);
        let primary = primary_gesture(&gestures);
        if primary != self.last_primary {
            debug!(gesture = %primary, hands = hands.len(), "gesture changed");
            self.last_primary = primary;
        }

        let transition = self.controller.tick(primary);
        self.report(transition);

        let out_of_frames = self.source.is_exhausted()
            && (self.controller.state().is_waiting() || transition == Transition::Rearmed);
        if out_of_frames {
            info!("landmark source exhausted");
            return Ok(Flow::Stop);
        }

        Ok(Flow::Continue)
    }

    pub fn run(&mut self, tick: Duration) -> error_stack::Result<(), GError> {
        info!("press enter to start a round, q to quit");
        loop {
            let start = Instant::now();
            if self.step()? == Flow::Stop {
                let score = self.controller.score();
                info!(player = score.player, computer = score.computer, "final score");
                return Ok(());
            }
            thread::sleep(tick.saturating_sub(start.elapsed()));
        }
    }

    fn start(&mut self) {
        if self.controller.start() {
            info!("round started, show your gesture");
        } else {
            debug!(state = ?self.controller.state(), "start ignored");
        }
    }

    fn report(&mut self, transition: Transition) {
        let display = self.controller.countdown_display();
        if display != self.last_display {
            match display {
                Some(0) => info!("shoot!"),
                Some(n) => info!(remaining = n, candidate = %self.controller.session().candidate(), "countdown"),
                None => {}
            }
            self.last_display = display;
        }

        match transition {
            Transition::Idle => {}
            Transition::Rearmed => info!("no valid gesture captured, countdown restarted"),
            Transition::Locked(result) => {
                let score = self.controller.score();
                info!(
                    you = %result.player,
                    computer = %result.computer,
                    player_score = score.player,
                    computer_score = score.computer,
                    "{}",
                    result.outcome
                );
            }
            Transition::Finished => info!("press enter to start a round"),
        }
    }
}
