//! Random single-cycle generation.

use super::errors::{ChainError, ChainResult};
use super::models::{Assignment, Participant};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Build a uniformly random single cycle over `participants`.
///
/// Shuffles a copy of the input and links each participant to the next one,
/// wrapping around at the end. Every permutation is equally likely and a
/// circular reading of a permutation is always one cycle of length N, so no
/// rejection sampling is needed: each of the (N-1)! cycles comes out N times
/// among the N! shuffles.
///
/// # Errors
///
/// * `ChainError::InvalidInput` - Fewer than 2 participants
///
/// # Examples
///
/// ```
/// use assassin::chain::{Participant, generate};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let players = vec![
///     Participant::new("Ana", "ana@example.com"),
///     Participant::new("Ben", "ben@example.com"),
/// ];
/// let assignment = generate(&players, &mut StdRng::seed_from_u64(1)).unwrap();
/// assert_eq!(assignment.target_of("Ana").unwrap().name, "Ben");
/// ```
pub fn generate<R>(participants: &[Participant], rng: &mut R) -> ChainResult<Assignment>
where
    R: Rng + ?Sized,
{
    if participants.len() < 2 {
        return Err(ChainError::InvalidInput(participants.len()));
    }

    let mut cycle = participants.to_vec();
    cycle.shuffle(rng);

    Ok(Assignment::from_cycle(cycle))
}

/// Chain generator owning its random source
pub struct ChainGenerator<R = StdRng> {
    rng: R,
}

impl ChainGenerator<StdRng> {
    /// Create a generator seeded from the operating system
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Create a reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ChainGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a chain, see [`generate`]
    pub fn generate(&mut self, participants: &[Participant]) -> ChainResult<Assignment> {
        generate(participants, &mut self.rng)
    }
}

impl Default for ChainGenerator<StdRng> {
    fn default() -> Self {
        Self::from_os_rng()
    }
}
