pub use self::{board::*, piece::*};

pub(crate) mod board;
pub(crate) mod piece;

/// Number of visible rows on the board.
pub const ROWS: usize = 20;
/// Number of columns on the board.
pub const COLS: usize = 10;
