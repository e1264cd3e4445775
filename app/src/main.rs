use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use gesture_rps::api::{play_round, Service};
use gesture_rps::config::Config;
use gesture_rps::game::{SystemClock, XorShiftMoves};
use gesture_rps::models::{Classifier, Gesture, IpcLandmarkSource, ScriptedSource};
use gesture_rps::server::Server;
use gesture_rps::{spawn_stdin_commands, App, GError};

/// Rock Paper Scissors against the computer, played with hand gestures
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML config; built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Serve the detect/play operations on a unix socket
    Serve {
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Live session fed by a landmark process or a replay file
    Live {
        /// JSON-lines file of landmark frames instead of the landmark socket
        #[arg(long)]
        replay: Option<PathBuf>,
        /// Start the next round as soon as the previous one ends
        #[arg(long, default_value_t = false)]
        auto_start: bool,
    },
    /// Play a single round with the given gesture
    Play {
        #[arg(short, long)]
        gesture: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_rps=info".into()),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            error!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> error_stack::Result<(), GError> {
    let mut config = Config::open_or_default(args.config)?;

    match args.command {
        Cmd::Serve { socket } => {
            if let Some(socket) = socket {
                config.server.socket = socket;
            }
            let service = Service::new(Classifier::new(&config.classifier), XorShiftMoves::from_entropy());
            Server::bind(&config.server, service)?.run()
        }
        Cmd::Live { replay, auto_start } => {
            let commands = spawn_stdin_commands()?;
            let tick = config.round.tick_interval();
            let clock = SystemClock::new();
            let moves = XorShiftMoves::from_entropy();

            match replay {
                Some(path) => {
                    let source = ScriptedSource::from_jsonl(path)?;
                    App::new(&config, source, clock, moves, commands)?
                        .with_auto_start(auto_start)
                        .run(tick)
                }
                None => {
                    let source = IpcLandmarkSource::connect(&config.source.socket)?;
                    App::new(&config, source, clock, moves, commands)?
                        .with_auto_start(auto_start)
                        .run(tick)
                }
            }
        }
        Cmd::Play { gesture } => {
            let gesture: Gesture = serde_json::from_value(serde_json::Value::String(gesture))
                .unwrap_or(Gesture::Unknown);
            let res = play_round(gesture, &mut XorShiftMoves::from_entropy());
            info!(
                success = res.success,
                computer = ?res.computer_gesture,
                "{}",
                res.message
            );
            println!(
                "{}",
                serde_json::to_string(&res).unwrap_or_else(|_| res.message.clone())
            );
            Ok(())
        }
    }
}
