use arrayvec::ArrayVec;

use super::{
    COLS, ROWS,
    piece::{Piece, PieceColor},
};

/// A board cell: empty, or the color of the piece block that settled there.
pub type Cell = Option<PieceColor>;

/// One row of the board, left to right.
pub type Row = [Cell; COLS];

/// Fixed 20×10 grid of settled blocks.
///
/// The board only knows about settled blocks. The active piece lives outside
/// it until [`Board::merge`] writes it in.
///
/// # Coordinates
///
/// - `(0, 0)` is the top-left cell
/// - Rows above the grid (`y < 0`) are open space: pieces may overlap them
///   without colliding, which lets tall pieces spawn partially off-grid
///
/// # Example
///
/// ```
/// use brikx_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::new();
/// let piece = Piece::new(PieceKind::O).with_position(4, 18);
///
/// assert!(!board.is_colliding(&piece));
/// board.merge(&piece);
/// assert!(board.is_colliding(&piece));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [Row; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const ROWS: usize = ROWS;
    pub const COLS: usize = COLS;

    pub const EMPTY_ROW: Row = [None; COLS];

    /// Creates an empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: [Self::EMPTY_ROW; ROWS],
        }
    }

    /// Returns the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows[y][x]
    }

    /// Sets the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y][x] = cell;
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &Row {
        &self.rows[y]
    }

    /// Iterates the rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    fn occupied_at(&self, x: i32, y: i32) -> bool {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return false;
        };
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .is_some_and(Option::is_some)
    }

    /// Whether `piece`, placed with its origin at `(x, y)`, would collide.
    ///
    /// A cell collides when it is left of column 0, right of the last column,
    /// below the last row, or on an occupied cell inside the grid. Cells above
    /// the grid never collide.
    #[must_use]
    pub fn collides(&self, piece: &Piece, x: i32, y: i32) -> bool {
        piece.occupied_positions_at(x, y).any(|(cx, cy)| {
            let outside = cx < 0 || cx >= Self::COLS_I32 || cy >= Self::ROWS_I32;
            outside || (cy >= 0 && self.occupied_at(cx, cy))
        })
    }

    /// Whether `piece` collides at its own position.
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        self.collides(piece, piece.x(), piece.y())
    }

    /// Number of rows `piece` can fall from its current position.
    ///
    /// This is the hard-drop distance and the ghost-piece offset.
    #[must_use]
    pub fn drop_distance(&self, piece: &Piece) -> i32 {
        let (x, y) = piece.position();
        let mut distance = 0;
        while !self.collides(piece, x, y + distance + 1) {
            distance += 1;
        }
        distance
    }

    /// Writes `piece`'s color into every cell it covers.
    ///
    /// Only called after a non-colliding placement; cells outside the grid are
    /// skipped.
    pub fn merge(&mut self, piece: &Piece) {
        let color = piece.color();
        for (x, y) in piece.occupied_positions() {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = Some(color);
            }
        }
    }

    /// Indices of the rows whose every cell is occupied, top to bottom.
    #[must_use]
    pub fn completed_rows(&self) -> ArrayVec<usize, ROWS> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(Option::is_some))
            .map(|(y, _)| y)
            .collect()
    }

    /// Removes the given rows and inserts as many empty rows at the top.
    ///
    /// The remaining rows keep their relative order. Indices outside the grid
    /// and duplicates are ignored.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        let mut write = ROWS;
        for y in (0..ROWS).rev() {
            if rows.contains(&y) {
                continue;
            }
            write -= 1;
            if write != y {
                self.rows[write] = self.rows[y];
            }
        }
        self.rows[..write].fill(Self::EMPTY_ROW);
    }

    /// Whether every cell is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.iter().all(Option::is_none))
    }

    /// Whether the board would be empty once `rows` are cleared.
    #[must_use]
    pub fn is_empty_after_clearing(&self, rows: &[usize]) -> bool {
        self.rows
            .iter()
            .enumerate()
            .filter(|(y, _)| !rows.contains(y))
            .all(|(_, row)| row.iter().all(Option::is_none))
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| cell.is_some())
            .count()
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    const COLS_I32: i32 = COLS as i32;
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    const ROWS_I32: i32 = ROWS as i32;
}
