//! Generational genetic-algorithm engine.
//!
//! This crate evolves a population of fixed-length genomes toward a
//! caller-supplied fitness objective. The caller provides the gene domain
//! (a gene generator), the objective (a fitness function) and a random
//! source; the engine provides the generational transition.
//!
//! # How a Generation Works
//!
//! 1. **Evaluate** - Every genome is scored by the fitness function
//! 2. **Rank** - The population is stably sorted by fitness, best first
//! 3. **Elitism** - The top `elitism` genomes are carried over unchanged
//! 4. **Selection** - Parents are picked by roulette-wheel selection
//! 5. **Crossover** - Uniform per-gene crossover produces a child
//! 6. **Mutation** - Each gene of the child is regenerated with probability `mutation_rate`
//!
//! # Key Components
//!
//! - [`Genome`] - A candidate solution (genes + last evaluated fitness)
//! - [`PopulationEngine`] - Owns the population and runs [`PopulationEngine::step`]
//! - [`EngineParams`] - Validated construction parameters
//! - [`selection`] - Roulette-wheel selection and its exhaustion result
//! - [`FitnessStats`] - Summary of the last evaluated population
//!
//! # Example
//!
//! ```
//! use genetica_engine::{EngineParams, PopulationEngine};
//! use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
//!
//! const TARGET: &[u8] = b"ABAB";
//!
//! let params = EngineParams {
//!     population_size: 20,
//!     genome_length: TARGET.len(),
//!     elitism: 2,
//!     mutation_rate: 0.05,
//! };
//! let mut engine = PopulationEngine::new(
//!     params,
//!     StdRng::seed_from_u64(7),
//!     |rng: &mut StdRng| if rng.random_bool(0.5) { b'A' } else { b'B' },
//!     |genes: &[u8]| {
//!         let hits = genes.iter().zip(TARGET).filter(|(a, b)| a == b).count();
//!         hits as f32 / TARGET.len() as f32
//!     },
//! )
//! .unwrap();
//!
//! while engine.best_fitness() != Some(1.0) && engine.generation() < 500 {
//!     engine.step();
//! }
//! assert_eq!(engine.population().len(), 20);
//! ```
//!
//! # Determinism
//!
//! The engine never touches a global random source. Every random draw goes
//! through the `R: Rng` handed to the constructor, including the draws made by
//! the gene generator, so a seeded source reproduces a run exactly.

pub use self::{
    genome::Genome,
    population::{EngineParams, PopulationEngine},
    stats::FitnessStats,
};

pub mod genome;
pub mod population;
pub mod selection;
pub mod stats;

/// A construction parameter is out of range.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvalidArgumentError {
    #[display("population size must be positive")]
    EmptyPopulation,
    #[display("genome length must be positive")]
    EmptyGenome,
    #[display("elitism ({elitism}) exceeds population size ({population_size})")]
    ElitismTooLarge {
        elitism: usize,
        population_size: usize,
    },
    #[display("mutation rate must be within [0, 1], got {_0}")]
    MutationRateOutOfRange(#[error(not(source))] f32),
    #[display("{seeds} seed genomes do not fit in a population of {population_size}")]
    TooManySeeds {
        seeds: usize,
        population_size: usize,
    },
    #[display("seed genome #{index} has length {actual}, expected {expected}")]
    SeedLengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Two genomes of different lengths were crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cannot cross genomes of length {left} and {right}")]
pub struct LengthMismatchError {
    pub left: usize,
    pub right: usize,
}
