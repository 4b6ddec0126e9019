use std::{path::PathBuf, time::Duration};

use brikx_engine::{
    Command, GameSession, PieceSeed, Preferences, SessionConfig, SessionSnapshot, SessionState,
};
use log::{debug, info};
use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{command::SessionArg, util::Output};

/// Simulated time between two random inputs.
const STEP: Duration = Duration::from_millis(50);

/// Inputs the random player picks from, with relative weights.
const INPUTS: &[(Command, u32)] = &[
    (Command::MoveLeft, 4),
    (Command::MoveRight, 4),
    (Command::Rotate, 3),
    (Command::SoftDrop, 3),
    (Command::HardDrop, 2),
    (Command::Hold, 1),
];

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    session: SessionArg,
    /// Piece seed (32 hex digits) [default: random]
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Seed of the random player's inputs [default: random]
    #[clap(long)]
    input_seed: Option<u64>,
    /// Stop after this many pieces have settled
    #[clap(long, default_value_t = 100)]
    pieces: u64,
    /// Record the high score in the preferences file
    #[clap(long)]
    persist: bool,
    /// Include the final session snapshot in the summary
    #[clap(long)]
    snapshot: bool,
    /// Output file path [default: stdout]
    #[clap(long)]
    output: Option<PathBuf>,
}

/// Result of a simulated game.
#[derive(Debug, Serialize)]
pub(crate) struct SimulationSummary {
    seed: PieceSeed,
    input_seed: u64,
    state: SessionState,
    settled_pieces: u64,
    score: u64,
    high_score: u64,
    level: u32,
    lines: u64,
    /// Settles by number of lines cleared, from zero to four.
    line_clear_counter: [u64; 5],
    play_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<SessionSnapshot>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    env_logger::init();

    let config = arg.session.load_config()?;
    let preferences = if arg.persist {
        arg.session.prefs.load()
    } else {
        Preferences::in_memory()
    };
    let seed = arg.seed.unwrap_or_else(rand::random);
    let input_seed = arg.input_seed.unwrap_or_else(rand::random);

    let summary = simulate(config, preferences, seed, input_seed, arg.pieces, arg.snapshot);
    info!(
        "simulation finished: {} pieces, score {}, {:?}",
        summary.settled_pieces, summary.score, summary.state
    );
    Output::save_json(&summary, arg.output.clone())
}

/// Plays one game with random inputs until `pieces` pieces have settled or
/// the game ends.
pub(crate) fn simulate(
    config: SessionConfig,
    preferences: Preferences,
    seed: PieceSeed,
    input_seed: u64,
    pieces: u64,
    with_snapshot: bool,
) -> SimulationSummary {
    let mut rng = Pcg32::seed_from_u64(input_seed);
    let mut session = GameSession::with_seed(config, preferences, seed);

    session.apply_command(Command::StartGame);
    while session.state().is_countdown() {
        session.tick(config.countdown_step());
    }
    info!("simulating {pieces} pieces (seed {seed}, input seed {input_seed})");

    while session.state().is_playing() && session.scoreboard().settled_pieces() < pieces {
        if let Ok((command, _)) = INPUTS.choose_weighted(&mut rng, |(_, weight)| *weight) {
            let applied = session.apply_command(*command);
            if applied && rng.random_ratio(1, 64) {
                debug!("input {command:?}: score {}", session.score());
            }
        }
        session.tick(STEP);
    }

    let scoreboard = session.scoreboard();
    SimulationSummary {
        seed,
        input_seed,
        state: session.state(),
        settled_pieces: scoreboard.settled_pieces(),
        score: session.score(),
        high_score: session.high_score(),
        level: session.level(),
        lines: session.lines(),
        line_clear_counter: *scoreboard.line_clear_counter(),
        play_time_ms: u64::try_from(session.play_time().as_millis()).unwrap_or(u64::MAX),
        snapshot: with_snapshot.then(|| session.snapshot()),
    }
}
