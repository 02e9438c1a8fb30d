use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{PieceKind, config::Randomizer};

/// Supplies the kinds of the pieces to spawn, with a short preview queue.
///
/// With [`Randomizer::Uniform`] every kind is drawn independently. With
/// [`Randomizer::Bag`] the kinds come in shuffled runs of seven so that every kind
/// appears exactly once per run.
///
/// # Example
///
/// ```
/// use qtris_engine::{PieceGenerator, PieceSeed, Randomizer};
///
/// let seed: PieceSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
/// let mut a = PieceGenerator::with_seed(Randomizer::Bag, seed);
/// let mut b = PieceGenerator::with_seed(Randomizer::Bag, seed);
///
/// let upcoming: Vec<_> = a.next_pieces().take(3).collect();
/// for kind in upcoming {
///     assert_eq!(a.pop_next(), kind);
///     assert_eq!(b.pop_next(), kind);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    randomizer: Randomizer,
    queue: VecDeque<PieceKind>,
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the PCG32 generator. The same seed and randomizer always
/// produce the same piece sequence. Serialized as a 32-character hex string.
///
/// ```
/// use qtris_engine::PieceSeed;
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// assert_eq!(seed.to_string().parse::<PieceSeed>().unwrap(), seed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: expected 32 hex digits, got {input:?}")]
pub struct ParsePieceSeedError {
    input: String,
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParsePieceSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 {
            return Err(error());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| error())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
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

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceGenerator {
    /// Number of upcoming kinds kept in the preview queue.
    pub const PREVIEW_LEN: usize = PieceKind::LEN;

    /// Creates a generator seeded from the thread-local random source.
    #[must_use]
    pub fn new(randomizer: Randomizer) -> Self {
        Self::with_seed(randomizer, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(randomizer: Randomizer, seed: PieceSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            randomizer,
            queue: VecDeque::with_capacity(PieceKind::LEN * 2),
        };
        this.fill_queue();
        this
    }

    #[must_use]
    pub fn randomizer(&self) -> Randomizer {
        self.randomizer
    }

    fn fill_queue(&mut self) {
        while self.queue.len() <= Self::PREVIEW_LEN {
            match self.randomizer {
                Randomizer::Uniform => {
                    let kind = self.rng.random();
                    self.queue.push_back(kind);
                }
                Randomizer::Bag => {
                    let mut bag = PieceKind::ALL;
                    bag.shuffle(&mut self.rng);
                    self.queue.extend(bag);
                }
            }
        }
    }

    /// Draws the next kind.
    pub fn pop_next(&mut self) -> PieceKind {
        self.fill_queue();
        let next = self.queue.pop_front();
        next.unwrap_or_else(|| self.rng.random())
    }

    /// Returns the upcoming kinds in the order [`Self::pop_next`] will return them.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> PieceSeed {
        PieceSeed(bytes)
    }

    #[test]
    fn test_seed_serialization() {
        let seed = seed_from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");

        let deserialized: PieceSeed =
            serde_json::from_str("\"0123456789ABCDEFFEDCBA9876543210\"").unwrap();
        assert_eq!(deserialized, seed);
    }

    #[test]
    fn test_seed_rejects_malformed_hex() {
        for input in [
            "",
            "0123456789abcdef0123456789abcde",
            "0123456789abcdef0123456789abcdef0",
            "ghijklmnopqrstuvwxyzghijklmnopqr",
        ] {
            let err = input.parse::<PieceSeed>().unwrap_err();
            assert!(err.to_string().contains("invalid hex"), "{input}");
            assert!(serde_json::from_str::<PieceSeed>(&format!("\"{input}\"")).is_err());
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let seed: PieceSeed = rand::rng().random();
        for randomizer in [Randomizer::Uniform, Randomizer::Bag] {
            let mut a = PieceGenerator::with_seed(randomizer, seed);
            let mut b = PieceGenerator::with_seed(randomizer, seed);
            for _ in 0..50 {
                assert_eq!(a.pop_next(), b.pop_next());
            }
        }
    }

    #[test]
    fn test_bag_contains_every_kind_once_per_run() {
        let mut generator = PieceGenerator::with_seed(Randomizer::Bag, rand::rng().random());
        for _ in 0..5 {
            let run: HashSet<_> = (0..PieceKind::LEN).map(|_| generator.pop_next()).collect();
            assert_eq!(run.len(), PieceKind::LEN);
        }
    }

    #[test]
    fn test_preview_matches_draws() {
        let mut generator = PieceGenerator::with_seed(Randomizer::Uniform, rand::rng().random());
        let preview: Vec<_> = generator.next_pieces().collect();
        assert!(preview.len() > PieceGenerator::PREVIEW_LEN);
        for kind in preview {
            assert_eq!(generator.pop_next(), kind);
        }
    }
}
