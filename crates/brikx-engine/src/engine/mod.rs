//! Game engine logic and state management.
//!
//! This module builds the game rules on top of the core data structures:
//!
//! - [`PieceBuffer`] - 7-bag piece generation, seeded by a [`PieceSeed`]
//! - [`PieceQueue`] - Lookahead queue and the hold slot
//! - [`Scoreboard`] - Line-clear scoring, combos, levels and gravity speed
//! - [`Preferences`] - High score, player name and sound flag, backed by a
//!   [`PreferenceStore`]
//! - [`GameSession`] - The session state machine that drives all of the above
//! - [`SessionSnapshot`] - Serializable view of a session for front ends
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] and send [`Command::StartGame`]
//! 2. Call [`GameSession::tick`] with elapsed time; the countdown runs, then
//!    the first piece spawns
//! 3. Forward player input with [`GameSession::apply_command`]
//! 4. Settled pieces are merged, completed rows are scored and, after a short
//!    delay, removed
//! 5. The game ends when a new piece collides at its spawn position
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use brikx_engine::{Command, GameSession, PieceSeed, Preferences, SessionConfig};
//!
//! let seed = PieceSeed::from_bytes([7; 16]);
//! let mut session = GameSession::with_seed(SessionConfig::default(), Preferences::in_memory(), seed);
//!
//! session.apply_command(Command::StartGame);
//! session.tick(Duration::from_secs(4));
//!
//! while session.state().is_playing() {
//!     session.apply_command(Command::HardDrop);
//!     session.tick(Duration::from_millis(150));
//! }
//!
//! assert!(session.state().is_game_over());
//! assert!(session.high_score() >= session.score());
//! ```

pub use self::{
    config::*, piece_buffer::*, piece_queue::*, preferences::*, scoring::*, session::*,
    snapshot::*,
};

mod config;
mod piece_buffer;
mod piece_queue;
mod preferences;
mod scoring;
mod session;
mod snapshot;
