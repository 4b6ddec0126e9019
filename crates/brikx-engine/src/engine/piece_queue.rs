use std::{collections::VecDeque, mem};

use crate::{HoldError, core::Piece};

use super::piece_buffer::PieceBuffer;

/// Upcoming pieces, the hold slot, and the once-per-drop hold gate.
///
/// The lookahead is refilled one-for-one from the [`PieceBuffer`] as pieces
/// are taken, so it always holds the same number of pieces.
///
/// # Hold System
///
/// - Only one piece can be held at a time
/// - The first hold stores the active piece and takes the next queued piece
/// - Later holds swap the active piece with the held one, keeping rotation
/// - Holding is allowed once per spawn
#[derive(Debug, Clone)]
pub struct PieceQueue {
    buffer: PieceBuffer,
    next: VecDeque<Piece>,
    held: Option<Piece>,
    can_hold: bool,
}

impl PieceQueue {
    /// Creates a queue showing `lookahead` upcoming pieces (at least one).
    #[must_use]
    pub fn new(mut buffer: PieceBuffer, lookahead: usize) -> Self {
        let lookahead = lookahead.max(1);
        let next = (0..lookahead).map(|_| buffer.next_piece()).collect();
        Self {
            buffer,
            next,
            held: None,
            can_hold: true,
        }
    }

    fn take_next(&mut self) -> Piece {
        let piece = self.next.pop_front();
        self.next.push_back(self.buffer.next_piece());
        piece
            .unwrap_or_else(|| self.buffer.next_piece())
            .centered()
    }

    /// Takes the head of the lookahead as the new active piece.
    ///
    /// The piece is centered horizontally at `y = 0` and hold is re-enabled.
    /// The caller checks the spawn position for collision.
    pub fn spawn_next(&mut self) -> Piece {
        self.can_hold = true;
        self.take_next()
    }

    /// Swaps `active` into the hold slot.
    ///
    /// With a held piece, the two are swapped; otherwise `active` is stored and
    /// replaced by the next queued piece. The new active piece is re-centered
    /// at `y = 0` and hold is disabled until the next spawn.
    ///
    /// # Errors
    ///
    /// Returns [`HoldError::HoldAlreadyUsed`] if hold was already used since
    /// the last spawn. `active` is left untouched.
    pub fn hold(&mut self, active: &mut Piece) -> Result<(), HoldError> {
        if !self.can_hold {
            return Err(HoldError::HoldAlreadyUsed);
        }
        let incoming = match self.held.take() {
            Some(held) => held.centered(),
            None => self.take_next(),
        };
        self.held = Some(mem::replace(active, incoming));
        self.can_hold = false;
        Ok(())
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.next.iter()
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<&Piece> {
        self.held.as_ref()
    }

    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.can_hold
    }
}
