//! Simulation engine for Brikx, a falling-block puzzle game.
//!
//! - [`core`] - Board grid, pieces, shapes and colors
//! - [`engine`] - Bag randomizer, queue and hold, scoring, preferences and the
//!   session state machine
//!
//! The engine does no I/O of its own. Time is fed in through
//! [`GameSession::tick`], player input through [`GameSession::apply_command`],
//! and preferences through an injected [`PreferenceStore`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting active piece")]
pub struct PieceCollisionError;

/// Reasons a move, rotation or drop was not applied.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum MoveError {
    #[display("piece colliding when moving piece")]
    PieceCollision(PieceCollisionError),
    #[display("session is not playing")]
    NotPlaying,
    #[display("no active piece while rows are clearing")]
    NoActivePiece,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum HoldError {
    #[display("hold already used in this turn")]
    HoldAlreadyUsed,
    #[display("session is not playing")]
    NotPlaying,
    #[display("no active piece while rows are clearing")]
    NoActivePiece,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PreferenceError {
    #[display("preference storage unavailable: {reason}")]
    Unavailable { reason: String },
    #[display("value too long to store ({len} bytes)")]
    ValueTooLong { len: usize },
}
