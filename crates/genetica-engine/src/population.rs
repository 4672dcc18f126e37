//! The population engine and its generational transition.
//!
//! [`PopulationEngine`] owns a fixed-size population of equal-length genomes
//! together with everything needed to advance it: the random source, the gene
//! generator and the fitness function. Each call to
//! [`PopulationEngine::step`] performs exactly one generation:
//!
//! 1. **Evaluate** - Score every genome in population order, summing fitness
//!    and remembering the first genome with the highest fitness
//! 2. **Rank** - Stable sort by fitness, best first; ties keep their order
//! 3. **Elitism** - Copy the top `elitism` genomes into the next generation unchanged
//! 4. **Reproduce** - Fill every other slot with a child: two roulette-wheel
//!    parents, uniform crossover, then mutation
//! 5. **Advance** - Replace the population and increment the generation counter
//!
//! # Selection Fallback
//!
//! When every genome scores zero the roulette wheel has nothing to land on.
//! Instead of failing the generation, the engine falls back to a uniform pick
//! using the spin it already drew (see [`selection::uniform_index`]), so the
//! sequence of random draws does not depend on whether the fallback fired.
//! [`PopulationEngine::fallback_selections`] reports how often this happened
//! in the last step.
//!
//! # Best Genome
//!
//! [`PopulationEngine::best_genes`] and [`PopulationEngine::best_fitness`]
//! describe the best genome of the most recent evaluation only. If a later
//! generation is worse, the snapshot is worse too; callers that want the best
//! genome ever seen must keep it themselves.

use std::{cmp::Ordering, fmt, mem};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Genome, InvalidArgumentError, selection, stats::FitnessStats};

/// Construction parameters of a [`PopulationEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Number of genomes in every generation
    pub population_size: usize,
    /// Number of genes in every genome
    pub genome_length: usize,
    /// Number of top genomes carried over unchanged
    pub elitism: usize,
    /// Per-gene mutation probability, in `[0, 1]`
    pub mutation_rate: f32,
}

impl EngineParams {
    /// Checks every parameter against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), InvalidArgumentError> {
        if self.population_size == 0 {
            return Err(InvalidArgumentError::EmptyPopulation);
        }
        if self.genome_length == 0 {
            return Err(InvalidArgumentError::EmptyGenome);
        }
        if self.elitism > self.population_size {
            return Err(InvalidArgumentError::ElitismTooLarge {
                elitism: self.elitism,
                population_size: self.population_size,
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(InvalidArgumentError::MutationRateOutOfRange(
                self.mutation_rate,
            ));
        }
        Ok(())
    }
}

/// A generational genetic algorithm over genes of type `T`.
///
/// - `R` is the random source every operator draws from
/// - `G` generates one random gene (`FnMut(&mut R) -> T`)
/// - `F` scores a genome's genes (`Fn(&[T]) -> f32`)
pub struct PopulationEngine<T, R, G, F> {
    params: EngineParams,
    population: Vec<Genome<T>>,
    generation: usize,
    best_fitness: Option<f32>,
    best_genes: Option<Vec<T>>,
    fallback_selections: usize,
    last_stats: Option<FitnessStats>,
    rng: R,
    generator: G,
    fitness_fn: F,
}

impl<T, R, G, F> fmt::Debug for PopulationEngine<T, R, G, F>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopulationEngine")
            .field("params", &self.params)
            .field("generation", &self.generation)
            .field("best_fitness", &self.best_fitness)
            .field("best_genes", &self.best_genes)
            .field("population", &self.population)
            .finish_non_exhaustive()
    }
}

impl<T, R, G, F> PopulationEngine<T, R, G, F>
where
    T: Clone,
    R: Rng,
    G: FnMut(&mut R) -> T,
    F: Fn(&[T]) -> f32,
{
    /// Creates an engine with a fully random initial population.
    ///
    /// The generation counter starts at 1.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError`] if `params` is out of range.
    pub fn new(
        params: EngineParams,
        rng: R,
        generator: G,
        fitness_fn: F,
    ) -> Result<Self, InvalidArgumentError> {
        Self::with_seeds(params, Vec::new(), rng, generator, fitness_fn)
    }

    /// Creates an engine whose first individuals are the given gene vectors.
    ///
    /// Seeds occupy the first `seeds.len()` positions in order; the remaining
    /// positions are filled randomly.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError`] if `params` is out of range, if there
    /// are more seeds than `population_size`, or if a seed's length differs
    /// from `genome_length`.
    ///
    /// # Examples
    ///
    /// ```
    /// use genetica_engine::{EngineParams, PopulationEngine};
    /// use rand::{SeedableRng as _, rngs::StdRng};
    ///
    /// let params = EngineParams {
    ///     population_size: 3,
    ///     genome_length: 2,
    ///     elitism: 1,
    ///     mutation_rate: 0.0,
    /// };
    /// let engine = PopulationEngine::with_seeds(
    ///     params,
    ///     vec![vec![9, 9]],
    ///     StdRng::seed_from_u64(0),
    ///     |_: &mut StdRng| 0,
    ///     |genes: &[i32]| genes.iter().sum::<i32>() as f32,
    /// )
    /// .unwrap();
    /// assert_eq!(engine.population()[0].genes(), [9, 9]);
    /// assert_eq!(engine.population()[1].genes(), [0, 0]);
    /// ```
    pub fn with_seeds(
        params: EngineParams,
        seeds: Vec<Vec<T>>,
        mut rng: R,
        mut generator: G,
        fitness_fn: F,
    ) -> Result<Self, InvalidArgumentError> {
        params.validate()?;
        if seeds.len() > params.population_size {
            return Err(InvalidArgumentError::TooManySeeds {
                seeds: seeds.len(),
                population_size: params.population_size,
            });
        }
        if let Some((index, seed)) = seeds
            .iter()
            .enumerate()
            .find(|(_, seed)| seed.len() != params.genome_length)
        {
            return Err(InvalidArgumentError::SeedLengthMismatch {
                index,
                expected: params.genome_length,
                actual: seed.len(),
            });
        }

        let random_count = params.population_size - seeds.len();
        let mut population = Vec::with_capacity(params.population_size);
        for genes in seeds {
            population.push(Genome::from_genes(genes)?);
        }
        for _ in 0..random_count {
            population.push(Genome::random(
                params.genome_length,
                &mut rng,
                &mut generator,
            )?);
        }

        Ok(Self {
            params,
            population,
            generation: 1,
            best_fitness: None,
            best_genes: None,
            fallback_selections: 0,
            last_stats: None,
            rng,
            generator,
            fitness_fn,
        })
    }

    /// Runs one generation.
    ///
    /// See the [module documentation](self) for the exact sequence. Does
    /// nothing if the population is empty.
    pub fn step(&mut self) {
        if self.population.is_empty() {
            return;
        }

        let total_fitness = self.evaluate();
        self.last_stats = FitnessStats::from_genomes(&self.population);
        self.rank();

        let parents = mem::take(&mut self.population);
        let mut next = Vec::with_capacity(parents.len());
        next.extend(parents[..self.params.elitism].iter().cloned());

        self.fallback_selections = 0;
        while next.len() < parents.len() {
            let p1 = self.select_parent(&parents, total_fitness);
            let p2 = self.select_parent(&parents, total_fitness);
            let mut child = parents[p1].crossover_same_length(&parents[p2], &mut self.rng);
            child.mutate(
                self.params.mutation_rate,
                &mut self.rng,
                &mut self.generator,
            );
            next.push(child);
        }

        self.population = next;
        self.generation += 1;
    }

    /// Scores every genome and records the best one. Returns the fitness sum.
    fn evaluate(&mut self) -> f32 {
        let mut total_fitness = 0.0;
        let mut best = 0;
        let mut best_fitness = f32::NEG_INFINITY;
        for (i, genome) in self.population.iter_mut().enumerate() {
            let fitness = genome.evaluate_fitness(&self.fitness_fn);
            total_fitness += fitness;
            // ties keep the earlier genome
            if i == 0 || rank_key(fitness) > rank_key(best_fitness) {
                best = i;
                best_fitness = fitness;
            }
        }

        let best = &self.population[best];
        self.best_fitness = best.fitness();
        self.best_genes = Some(best.genes().to_vec());
        total_fitness
    }

    /// Stable sort, best first.
    fn rank(&mut self) {
        self.population
            .sort_by(|a, b| descending_fitness(a.score(), b.score()));
    }

    fn select_parent(&mut self, parents: &[Genome<T>], total_fitness: f32) -> usize {
        match selection::roulette_wheel(parents, total_fitness, &mut self.rng) {
            Ok(index) => index,
            Err(exhausted) => {
                self.fallback_selections += 1;
                selection::uniform_index(exhausted.spin, parents.len())
            }
        }
    }
}

impl<T, R, G, F> PopulationEngine<T, R, G, F> {
    /// Returns the parameters the engine was built with.
    #[must_use]
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Returns the current population.
    ///
    /// Between steps this is the population produced by the last step, in
    /// assembly order: elites first, then children.
    #[must_use]
    pub fn population(&self) -> &[Genome<T>] {
        &self.population
    }

    /// Returns the generation counter, starting at 1.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the best fitness of the most recent evaluation.
    ///
    /// `None` before the first [`step`](Self::step).
    #[must_use]
    pub fn best_fitness(&self) -> Option<f32> {
        self.best_fitness
    }

    /// Returns a copy of the best genes of the most recent evaluation.
    ///
    /// `None` before the first [`step`](Self::step).
    #[must_use]
    pub fn best_genes(&self) -> Option<&[T]> {
        self.best_genes.as_deref()
    }

    /// Returns how many parent picks in the last step used the uniform
    /// fallback instead of the roulette wheel.
    #[must_use]
    pub fn fallback_selections(&self) -> usize {
        self.fallback_selections
    }

    /// Returns fitness statistics of the most recent evaluation, covering
    /// every genome scored in the last step.
    ///
    /// `None` before the first [`step`](Self::step).
    #[must_use]
    pub fn fitness_stats(&self) -> Option<FitnessStats> {
        self.last_stats
    }
}

/// Ranking order, best first.
///
/// IEEE-equal fitness values compare equal so the stable sort keeps their
/// order, and NaN never outranks a number.
fn descending_fitness(a: f32, b: f32) -> Ordering {
    rank_key(b).total_cmp(&rank_key(a))
}

/// Maps NaN to negative infinity and `-0.0` to `0.0`.
fn rank_key(fitness: f32) -> f32 {
    if fitness.is_nan() {
        f32::NEG_INFINITY
    } else {
        fitness + 0.0
    }
}
