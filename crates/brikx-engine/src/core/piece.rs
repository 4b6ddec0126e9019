use arrayvec::ArrayVec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::COLS;

/// Largest width or height of any piece shape.
pub const MAX_SHAPE_SIZE: usize = 4;

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const COLS_I32: i32 = COLS as i32;

/// A falling piece: its kind, current shape matrix, color and board origin.
///
/// A `Piece` is owned by exactly one slot at a time (active, held or queued).
/// It is deliberately not `Copy`; moving it between slots moves the value.
///
/// # Coordinate System
///
/// - `(x, y)` is the board position of the top-left cell of the shape matrix
/// - X increases rightward, Y increases downward
/// - `y` may be negative while a piece is partially above the visible grid
///
/// # Example
///
/// ```
/// use brikx_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::T);
/// let rotated = piece.rotated();
///
/// assert_eq!(piece.shape().width(), 3);
/// assert_eq!(rotated.shape().width(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    shape: PieceShape,
    color: PieceColor,
    x: i32,
    y: i32,
}

impl Piece {
    /// Creates a piece in its canonical orientation at origin `(0, 0)`.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            color: kind.color(),
            x: 0,
            y: 0,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &PieceShape {
        &self.shape
    }

    #[must_use]
    pub fn color(&self) -> PieceColor {
        self.color
    }

    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    #[must_use]
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.set_position(x, y);
        self
    }

    /// Column that centers this piece's current shape over the board.
    #[must_use]
    pub fn spawn_x(&self) -> i32 {
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let width = self.shape.width() as i32;
        COLS_I32 / 2 - width / 2
    }

    /// Moves the piece to its spawn position: horizontally centered, top row.
    #[must_use]
    pub fn centered(self) -> Self {
        let x = self.spawn_x();
        self.with_position(x, 0)
    }

    /// Returns a new piece rotated 90° clockwise around its shape matrix.
    ///
    /// Position, kind and color are kept. Collision is not checked; that is
    /// up to the caller before committing the rotation.
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            kind: self.kind,
            shape: self.shape.rotated(),
            color: self.color,
            x: self.x,
            y: self.y,
        }
    }

    /// Board coordinates of every occupied cell.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .occupied_cells()
            .map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Occupied cells if this piece had its origin at `(x, y)`.
    pub fn occupied_positions_at(&self, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .occupied_cells()
            .map(move |(dx, dy)| (x + dx, y + dy))
    }
}

/// A piece's 0/1 cell matrix.
///
/// Rows are stored top to bottom. Shapes are rectangular and at most
/// [`MAX_SHAPE_SIZE`] cells on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceShape {
    rows: ArrayVec<ArrayVec<bool, MAX_SHAPE_SIZE>, MAX_SHAPE_SIZE>,
}

impl PieceShape {
    fn from_bits(bits: &[&[u8]]) -> Self {
        let rows = bits
            .iter()
            .map(|row| row.iter().map(|&cell| cell != 0).collect())
            .collect();
        Self { rows }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, ArrayVec::len)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.rows.iter().map(ArrayVec::as_slice)
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// Offsets `(dx, dy)` of the occupied cells, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows.iter().zip(0..).flat_map(|(row, dy)| {
            row.iter()
                .zip(0..)
                .filter(|(cell, _)| **cell)
                .map(move |(_, dx)| (dx, dy))
        })
    }

    /// Clockwise rotation: transpose, then reverse each row.
    ///
    /// Row `i` of the result is column `i` of `self` read bottom to top.
    #[must_use]
    pub fn rotated(&self) -> Self {
        let height = self.height();
        let rows = (0..self.width())
            .map(|x| (0..height).rev().map(|y| self.rows[y][x]).collect())
            .collect();
        Self { rows }
    }
}

/// Opaque color identity of a piece. Board cells store it after a piece settles.
///
/// Serialized as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("#{r:02x}{g:02x}{b:02x}")]
pub struct PieceColor {
    r: u8,
    g: u8,
    b: u8,
}

impl PieceColor {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for PieceColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PieceColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid color: expected '#rrggbb', got '{s}'"))
        })
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// Every piece kind, in declaration order.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// The canonical (spawn orientation) shape of this kind.
    #[must_use]
    pub fn shape(self) -> PieceShape {
        PieceShape::from_bits(PIECE_SHAPES[self as usize])
    }

    /// The canonical color of this kind.
    #[must_use]
    pub const fn color(self) -> PieceColor {
        PIECE_COLORS[self as usize]
    }
}

const PIECE_SHAPES: [&[&[u8]]; PieceKind::LEN] = [
    // I-piece
    &[&[1, 1, 1, 1]],
    // O-piece
    &[&[1, 1], &[1, 1]],
    // T-piece
    &[&[0, 1, 0], &[1, 1, 1]],
    // S-piece
    &[&[0, 1, 1], &[1, 1, 0]],
    // Z-piece
    &[&[1, 1, 0], &[0, 1, 1]],
    // J-piece
    &[&[1, 0, 0], &[1, 1, 1]],
    // L-piece
    &[&[0, 0, 1], &[1, 1, 1]],
];

const PIECE_COLORS: [PieceColor; PieceKind::LEN] = [
    PieceColor::new(0x00, 0xf0, 0xf0),
    PieceColor::new(0xf0, 0xf0, 0x00),
    PieceColor::new(0xa0, 0x00, 0xf0),
    PieceColor::new(0x00, 0xf0, 0x00),
    PieceColor::new(0xf0, 0x00, 0x00),
    PieceColor::new(0x00, 0x00, 0xf0),
    PieceColor::new(0xf0, 0xa0, 0x00),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_bits(shape: &PieceShape) -> Vec<Vec<u8>> {
        shape
            .rows()
            .map(|row| row.iter().map(|&c| u8::from(c)).collect())
            .collect()
    }

    #[test]
    fn test_canonical_shapes() {
        assert_eq!(shape_bits(&PieceKind::I.shape()), vec![vec![1, 1, 1, 1]]);
        assert_eq!(shape_bits(&PieceKind::O.shape()), vec![vec![1, 1], vec![1, 1]]);
        assert_eq!(
            shape_bits(&PieceKind::T.shape()),
            vec![vec![0, 1, 0], vec![1, 1, 1]]
        );
        assert_eq!(
            shape_bits(&PieceKind::L.shape()),
            vec![vec![0, 0, 1], vec![1, 1, 1]]
        );
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in PieceKind::ALL {
            assert_eq!(kind.shape().occupied_cells().count(), 4, "{kind:?}");
        }
    }

    #[test]
    fn test_rotation_is_transpose_then_reverse() {
        let t = Piece::new(PieceKind::T).rotated();
        assert_eq!(
            shape_bits(t.shape()),
            vec![vec![1, 0], vec![1, 1], vec![1, 0]]
        );

        let i = Piece::new(PieceKind::I).rotated();
        assert_eq!(shape_bits(i.shape()), vec![vec![1], vec![1], vec![1], vec![1]]);

        let j = Piece::new(PieceKind::J).rotated();
        assert_eq!(
            shape_bits(j.shape()),
            vec![vec![1, 1], vec![1, 0], vec![1, 0]]
        );
    }

    #[test]
    fn test_rotation_does_not_mutate_input() {
        let piece = Piece::new(PieceKind::S).with_position(3, 5);
        let rotated = piece.rotated();
        assert_eq!(piece.shape(), &PieceKind::S.shape());
        assert_eq!(rotated.position(), (3, 5));
        assert_ne!(rotated.shape(), piece.shape());
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        for kind in PieceKind::ALL {
            let piece = Piece::new(kind);
            let back = piece.rotated().rotated().rotated().rotated();
            assert_eq!(back, piece, "{kind:?}");
        }
    }

    #[test]
    fn test_spawn_x_centers_by_shape_width() {
        assert_eq!(Piece::new(PieceKind::I).spawn_x(), 3);
        assert_eq!(Piece::new(PieceKind::O).spawn_x(), 4);
        assert_eq!(Piece::new(PieceKind::T).spawn_x(), 4);
        assert_eq!(Piece::new(PieceKind::I).rotated().spawn_x(), 5);

        let spawned = Piece::new(PieceKind::Z).with_position(0, 7).centered();
        assert_eq!(spawned.position(), (4, 0));
    }

    #[test]
    fn test_occupied_positions_follow_origin() {
        let piece = Piece::new(PieceKind::T).with_position(2, -1);
        let cells: Vec<_> = piece.occupied_positions().collect();
        assert_eq!(cells, vec![(3, -1), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn test_color_display_and_serialization() {
        let color = PieceKind::L.color();
        assert_eq!(color.to_string(), "#f0a000");

        let serialized = serde_json::to_string(&color).unwrap();
        assert_eq!(serialized, "\"#f0a000\"");
        let deserialized: PieceColor = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, color);

        assert!(serde_json::from_str::<PieceColor>("\"f0a000\"").is_err());
        assert!(serde_json::from_str::<PieceColor>("\"#f0a0\"").is_err());
        assert!(serde_json::from_str::<PieceColor>("\"#zzzzzz\"").is_err());
    }
}
