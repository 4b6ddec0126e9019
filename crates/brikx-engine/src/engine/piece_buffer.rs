use std::{fmt::Write as _, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Piece, PieceKind};

/// Piece generator using the 7-bag randomization algorithm.
///
/// # 7-Bag System
///
/// 1. The bag holds a shuffled permutation of all 7 piece kinds
/// 2. Pieces are drawn from the end of the bag
/// 3. A new permutation is generated only once the bag is empty
///
/// Every run of 7 draws aligned to a bag boundary therefore contains each kind
/// exactly once.
///
/// # Example
///
/// ```
/// use brikx_engine::{PieceBuffer, PieceKind};
///
/// let mut buffer = PieceBuffer::new();
///
/// let mut kinds: Vec<PieceKind> = (0..7).map(|_| buffer.next_piece().kind()).collect();
/// kinds.sort_by_key(|kind| *kind as u8);
/// assert_eq!(kinds, PieceKind::ALL);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    bag: ArrayVec<PieceKind, { PieceKind::LEN }>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the bag's random number generator. The same seed always
/// yields the same piece sequence, which makes sessions reproducible for
/// debugging, headless simulation and tests.
///
/// Serialized as a 32-character hex string.
///
/// # Example
///
/// ```
/// use brikx_engine::{PieceBuffer, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
///
/// let mut a = PieceBuffer::with_seed(seed);
/// let mut b = PieceBuffer::with_seed(seed);
/// assert_eq!(a.next_piece().kind(), b.next_piece().kind());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseSeedError {
    #[display("invalid hex: expected 32 characters, got {len}")]
    InvalidLength { len: usize },
    #[display("invalid hex: {input}")]
    InvalidDigit { input: String },
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError::InvalidLength { len: s.len() });
        }
        // `from_str_radix` accepts a leading sign, which is not a hex digit.
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseSeedError::InvalidDigit {
                input: s.to_owned(),
            });
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParseSeedError::InvalidDigit {
            input: s.to_owned(),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl std::fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let num = u128::from_be_bytes(self.0);
        write!(f, "{num:032x}")
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    /// Creates a generator seeded from the thread-local random source.
    ///
    /// For deterministic sequences, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    ///
    /// The bag starts empty and is filled on the first draw.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            bag: ArrayVec::new(),
        }
    }

    fn fill_bag(&mut self) {
        let mut new_bag = PieceKind::ALL;
        new_bag.shuffle(&mut self.rng);
        self.bag.extend(new_bag);
    }

    /// Draws the next kind from the bag, refilling it first if it is empty.
    pub fn next_kind(&mut self) -> PieceKind {
        loop {
            if let Some(kind) = self.bag.pop() {
                return kind;
            }
            self.fill_bag();
        }
    }

    /// Draws the next piece: a fresh canonical piece at origin `(0, 0)`.
    pub fn next_piece(&mut self) -> Piece {
        Piece::new(self.next_kind())
    }

    /// Number of kinds left in the current bag.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bag.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(byte: u8) -> PieceSeed {
        PieceSeed([byte; 16])
    }

    fn sorted(mut kinds: Vec<PieceKind>) -> Vec<PieceKind> {
        kinds.sort_by_key(|kind| *kind as u8);
        kinds
    }

    #[test]
    fn test_first_seven_pieces_are_a_permutation() {
        let mut buffer = PieceBuffer::with_seed(seed(0x42));
        assert_eq!(buffer.remaining(), 0);

        let kinds: Vec<_> = (0..7).map(|_| buffer.next_piece().kind()).collect();
        assert_eq!(sorted(kinds), PieceKind::ALL);
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_every_bag_window_is_a_permutation() {
        let mut buffer = PieceBuffer::with_seed(seed(7));
        for _ in 0..50 {
            let kinds: Vec<_> = (0..7).map(|_| buffer.next_kind()).collect();
            assert_eq!(sorted(kinds), PieceKind::ALL);
        }
    }

    #[test]
    fn test_bag_refills_only_when_empty() {
        let mut buffer = PieceBuffer::with_seed(seed(1));
        buffer.next_kind();
        assert_eq!(buffer.remaining(), 6);
        for _ in 0..6 {
            buffer.next_kind();
        }
        assert_eq!(buffer.remaining(), 0);
        buffer.next_kind();
        assert_eq!(buffer.remaining(), 6);
    }

    #[test]
    fn test_next_piece_is_canonical_at_origin() {
        let mut buffer = PieceBuffer::with_seed(seed(3));
        for _ in 0..14 {
            let piece = buffer.next_piece();
            assert_eq!(piece.position(), (0, 0));
            assert_eq!(piece.shape(), &piece.kind().shape());
            assert_eq!(piece.color(), piece.kind().color());
        }
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let seed = PieceSeed([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ]);

        let mut buffer1 = PieceBuffer::with_seed(seed);
        let mut buffer2 = PieceBuffer::with_seed(seed);

        for _ in 0..20 {
            assert_eq!(buffer1.next_kind(), buffer2.next_kind());
        }
    }

    mod piece_seed_serialization {
        use super::*;

        #[test]
        fn test_roundtrip_random_seed() {
            let seed: PieceSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn test_known_value_sequential_bytes() {
            let seed = PieceSeed([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();

            // Big-endian: bytes appear in order as hex pairs
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
            assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
        }

        #[test]
        fn test_known_value_all_zeros() {
            let serialized = serde_json::to_string(&seed(0)).unwrap();
            assert_eq!(serialized, "\"00000000000000000000000000000000\"");
        }

        #[test]
        fn test_deserialize_uppercase_hex() {
            let json = "\"0123456789ABCDEFFEDCBA9876543210\"";
            let deserialized: PieceSeed = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized.to_bytes()[..2], [0x01, 0x23]);
        }

        #[test]
        fn test_error_invalid_hex_characters() {
            let json = "\"ghijklmnopqrstuvwxyzghijklmnopqr\"";
            let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
            assert!(err.to_string().contains("invalid hex"));
        }

        #[test]
        fn test_error_wrong_length() {
            for json in ["\"\"", "\"0123456789abcdef0123456789abcde\""] {
                let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
                assert!(err.to_string().contains("invalid hex"));
            }
        }

        #[test]
        fn test_parse_rejects_sign_prefix() {
            let input = "+123456789abcdef0123456789abcdef";
            assert_eq!(
                input.parse::<PieceSeed>(),
                Err(ParseSeedError::InvalidDigit {
                    input: input.to_owned()
                })
            );
        }
    }
}
