//! Registry of consumed one-time VRF seeds.
//!
//! A seed fixes the VRF output in advance, so a reused seed would make the
//! outcome predictable before the wager is placed. The registry is
//! append-only; a seed is marked used at game creation and never released.

use crate::errors::{GameError, GameResult};
use crate::vrf::PUBLIC_KEY_LENGTH;
use std::collections::HashSet;

/// One-time seed tracking plus the VRF public key expected to sign them.
pub struct SeedRegistry {
    used_seeds: HashSet<Vec<u8>>,
    vrf_pubkey: [u8; PUBLIC_KEY_LENGTH],
}

impl SeedRegistry {
    pub fn new(vrf_pubkey: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self {
            used_seeds: HashSet::new(),
            vrf_pubkey,
        }
    }

    /// Check a two-seed batch against the registry without mutating it.
    ///
    /// Rejects a seed already consumed by an earlier game as well as a batch
    /// that repeats the same seed twice.
    pub fn check_available(&self, seeds: &[Vec<u8>; 2]) -> GameResult<()> {
        if seeds[0] == seeds[1] {
            return Err(GameError::SeedAlreadyUsed(hex::encode(&seeds[1])));
        }
        for seed in seeds {
            if self.used_seeds.contains(seed) {
                return Err(GameError::SeedAlreadyUsed(hex::encode(seed)));
            }
        }
        Ok(())
    }

    /// Mark a two-seed batch as consumed.
    ///
    /// All-or-nothing: the batch is validated in full before the first
    /// insert, so a failing batch leaves the registry untouched.
    pub fn register(&mut self, seeds: &[Vec<u8>; 2]) -> GameResult<()> {
        self.check_available(seeds)?;
        for seed in seeds {
            self.used_seeds.insert(seed.clone());
        }
        Ok(())
    }

    pub fn is_used(&self, seed: &[u8]) -> bool {
        self.used_seeds.contains(seed)
    }

    /// Number of consumed seeds.
    pub fn len(&self) -> usize {
        self.used_seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used_seeds.is_empty()
    }

    pub fn vrf_pubkey(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.vrf_pubkey
    }

    /// Rotate the VRF public key. Consumed seeds are kept: a seed signed by
    /// a previous key is still burned.
    pub fn rotate_key(&mut self, vrf_pubkey: [u8; PUBLIC_KEY_LENGTH]) {
        self.vrf_pubkey = vrf_pubkey;
    }
}
