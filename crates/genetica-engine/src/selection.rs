//! Roulette-wheel parent selection.
//!
//! Each individual owns a slice of the wheel proportional to its fitness. A
//! single uniform spin `u` in `[0, 1)` is scaled by the total fitness and the
//! population is walked in order until the spin lands inside a slice.
//!
//! The wheel cannot always answer: when the total fitness is zero (or
//! negative, or not finite) there is nothing to land on, and floating-point
//! rounding can also carry the spin past the last slice. Those cases are
//! reported as [`SelectionExhaustedError`] instead of an absent parent. The
//! error keeps the spin so that the caller can fall back to
//! [`uniform_index`] without drawing again.

use rand::Rng;

use crate::Genome;

/// The roulette wheel had no slice for the spin.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("roulette wheel exhausted (total fitness {total_fitness})")]
pub struct SelectionExhaustedError {
    /// The uniform draw in `[0, 1)` used for this selection.
    pub spin: f32,
    /// Total fitness the wheel was built from.
    pub total_fitness: f32,
}

/// Picks an index by fitness-proportional selection.
///
/// Exactly one random value is drawn, whatever the outcome.
///
/// `population` is walked in the given order. The engine passes it sorted
/// best first, which keeps the walk short but does not change the
/// probabilities.
///
/// # Errors
///
/// Returns [`SelectionExhaustedError`] if the walk ends without a pick.
///
/// # Examples
///
/// ```
/// use genetica_engine::{Genome, selection};
/// use rand::{SeedableRng as _, rngs::StdRng};
///
/// let mut population = vec![
///     Genome::from_genes(vec![1]).unwrap(),
///     Genome::from_genes(vec![2]).unwrap(),
/// ];
/// population[0].evaluate_fitness(&|_: &[i32]| 0.0);
/// population[1].evaluate_fitness(&|_: &[i32]| 1.0);
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let index = selection::roulette_wheel(&population, 1.0, &mut rng).unwrap();
/// assert_eq!(index, 1);
/// ```
pub fn roulette_wheel<T, R>(
    population: &[Genome<T>],
    total_fitness: f32,
    rng: &mut R,
) -> Result<usize, SelectionExhaustedError>
where
    R: Rng + ?Sized,
{
    let spin = rng.random::<f32>();
    let exhausted = SelectionExhaustedError {
        spin,
        total_fitness,
    };
    if !(total_fitness.is_finite() && total_fitness > 0.0) {
        return Err(exhausted);
    }

    let mut remaining = spin * total_fitness;
    for (i, genome) in population.iter().enumerate() {
        let fitness = genome.score();
        if remaining < fitness {
            return Ok(i);
        }
        remaining -= fitness;
    }
    Err(exhausted)
}

/// Maps a spin in `[0, 1)` to an index in `0..len` with equal probability.
///
/// Used as the fallback when [`roulette_wheel`] is exhausted.
///
/// # Panics
///
/// Panics if `len` is zero.
#[must_use]
pub fn uniform_index(spin: f32, len: usize) -> usize {
    assert!(len > 0, "cannot pick from an empty population");
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let index = (spin * len as f32) as usize;
    index.min(len - 1)
}
