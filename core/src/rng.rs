//! Deterministic random number generation.
//!
//! RULE: Nothing in the engine may call a platform RNG, with the single
//! exception of the opt-in `SecureDice` source.
//! All other randomness flows through GameRng instances derived from
//! an explicit seed supplied by the caller.
//!
//! Each consumer gets its own stream, seeded from (seed XOR slot * φ):
//!   - Adding a new slot never changes existing streams.
//!   - Each stream is reproducible in isolation, on every replica.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Mix a seed with a stable slot index.
pub fn derive_seed(seed: u64, slot: u64) -> u64 {
    seed ^ slot.wrapping_mul(GOLDEN_GAMMA)
}

/// A named, deterministic RNG stream.
pub struct GameRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl GameRng {
    pub fn new(seed: u64, slot: RngSlot) -> Self {
        Self {
            name: slot.name(),
            inner: Pcg64Mcg::seed_from_u64(derive_seed(seed, slot as u64)),
        }
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::Rng;
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        use rand::seq::SliceRandom;
        items.shuffle(&mut self.inner);
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Dice = 0,
    ChanceDeck = 1,
    CommunityDeck = 2,
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dice => "dice",
            Self::ChanceDeck => "chance_deck",
            Self::CommunityDeck => "community_deck",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_are_reproducible() {
        let mut a = GameRng::new(7, RngSlot::ChanceDeck);
        let mut b = GameRng::new(7, RngSlot::ChanceDeck);
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn slots_do_not_share_streams() {
        let mut a = GameRng::new(7, RngSlot::ChanceDeck);
        let mut b = GameRng::new(7, RngSlot::CommunityDeck);
        let left: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let right: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();
        assert_ne!(left, right);
    }
}
