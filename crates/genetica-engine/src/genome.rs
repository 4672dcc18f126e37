//! Fixed-length genomes and their genetic operators.
//!
//! A [`Genome`] is one candidate solution: an ordered sequence of genes plus
//! the fitness computed for it by the most recent evaluation. The operators
//! defined here are the building blocks of
//! [`PopulationEngine::step`](crate::PopulationEngine::step):
//!
//! - **Initialization**: [`Genome::random`] fills every position from the gene generator
//! - **Evaluation**: [`Genome::evaluate_fitness`] scores the genes with the fitness function
//! - **Crossover**: [`Genome::crossover`] performs uniform per-gene crossover
//! - **Mutation**: [`Genome::mutate`] regenerates genes at a per-gene rate
//!
//! Every operator takes the random source explicitly, so the same seed always
//! yields the same genomes.

use rand::Rng;

use crate::{InvalidArgumentError, LengthMismatchError};

/// Probability of inheriting a gene from the first parent during crossover.
const CROSSOVER_BIAS: f32 = 0.5;

/// A candidate solution: a fixed-length gene sequence and its fitness.
///
/// The length is fixed at construction and never changes. Fitness is `None`
/// until [`Genome::evaluate_fitness`] is called.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome<T> {
    genes: Vec<T>,
    fitness: Option<f32>,
}

impl<T> Genome<T> {
    /// Creates a genome of `length` genes, each produced by an independent
    /// call to `generator`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError::EmptyGenome`] if `length` is zero.
    pub fn random<R, G>(
        length: usize,
        rng: &mut R,
        generator: &mut G,
    ) -> Result<Self, InvalidArgumentError>
    where
        R: Rng + ?Sized,
        G: FnMut(&mut R) -> T,
    {
        if length == 0 {
            return Err(InvalidArgumentError::EmptyGenome);
        }
        let genes = (0..length).map(|_| generator(rng)).collect();
        Ok(Self {
            genes,
            fitness: None,
        })
    }

    /// Creates a genome from explicit genes.
    ///
    /// Used for seeding a population with known individuals. Fitness starts
    /// undefined.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError::EmptyGenome`] if `genes` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use genetica_engine::Genome;
    ///
    /// let genome = Genome::from_genes(vec!['A', 'B']).unwrap();
    /// assert_eq!(genome.genes(), ['A', 'B']);
    /// assert_eq!(genome.fitness(), None);
    /// assert!(Genome::<char>::from_genes(vec![]).is_err());
    /// ```
    pub fn from_genes(genes: Vec<T>) -> Result<Self, InvalidArgumentError> {
        if genes.is_empty() {
            return Err(InvalidArgumentError::EmptyGenome);
        }
        Ok(Self {
            genes,
            fitness: None,
        })
    }

    /// Returns the genes of this genome.
    #[must_use]
    pub fn genes(&self) -> &[T] {
        &self.genes
    }

    /// Returns the number of genes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Always `false`; genomes cannot be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Returns the fitness from the last evaluation, if any.
    #[must_use]
    pub fn fitness(&self) -> Option<f32> {
        self.fitness
    }

    /// Fitness used for ranking and selection; unevaluated genomes rank last.
    pub(crate) fn score(&self) -> f32 {
        self.fitness.unwrap_or(f32::NEG_INFINITY)
    }

    /// Scores this genome with `fitness_fn`, stores the result and returns it.
    ///
    /// The returned value is not range-checked; normalizing it is the fitness
    /// function's job.
    pub fn evaluate_fitness<F>(&mut self, fitness_fn: &F) -> f32
    where
        F: Fn(&[T]) -> f32 + ?Sized,
    {
        let fitness = fitness_fn(&self.genes);
        self.fitness = Some(fitness);
        fitness
    }

    /// Replaces each gene with a fresh `generator` call with probability `rate`.
    ///
    /// One uniform draw in `[0, 1)` is made per position and compared against
    /// `rate`, so `rate = 0.0` never mutates and `rate = 1.0` replaces every
    /// gene. Each position is decided independently.
    pub fn mutate<R, G>(&mut self, rate: f32, rng: &mut R, generator: &mut G)
    where
        R: Rng + ?Sized,
        G: FnMut(&mut R) -> T,
    {
        for gene in &mut self.genes {
            if rng.random::<f32>() < rate {
                *gene = generator(rng);
            }
        }
    }
}

impl<T> Genome<T>
where
    T: Clone,
{
    /// Produces a child by uniform crossover with `other`.
    ///
    /// For every position a uniform value in `[0, 1)` is drawn; below 0.5 the
    /// child takes the gene from `self`, otherwise from `other`. The child's
    /// fitness is undefined.
    ///
    /// # Errors
    ///
    /// Returns [`LengthMismatchError`] if the genomes differ in length. No
    /// random values are drawn in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use genetica_engine::Genome;
    /// use rand::{SeedableRng as _, rngs::StdRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let a = Genome::from_genes(vec![0; 8]).unwrap();
    /// let b = Genome::from_genes(vec![1; 8]).unwrap();
    /// let child = a.crossover(&b, &mut rng).unwrap();
    /// assert_eq!(child.len(), 8);
    /// assert!(child.genes().iter().all(|g| *g == 0 || *g == 1));
    ///
    /// let short = Genome::from_genes(vec![1; 3]).unwrap();
    /// assert!(a.crossover(&short, &mut rng).is_err());
    /// ```
    pub fn crossover<R>(&self, other: &Self, rng: &mut R) -> Result<Self, LengthMismatchError>
    where
        R: Rng + ?Sized,
    {
        if self.len() != other.len() {
            return Err(LengthMismatchError {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(self.crossover_same_length(other, rng))
    }

    /// Crossover for genomes already known to share a length.
    pub(crate) fn crossover_same_length<R>(&self, other: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        debug_assert_eq!(self.len(), other.len());
        let genes = self
            .genes
            .iter()
            .zip(&other.genes)
            .map(|(mine, theirs)| {
                if rng.random::<f32>() < CROSSOVER_BIAS {
                    mine.clone()
                } else {
                    theirs.clone()
                }
            })
            .collect();
        Self {
            genes,
            fitness: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    fn bit(rng: &mut Pcg32) -> u8 {
        u8::from(rng.random_bool(0.5))
    }

    #[test]
    fn test_random_has_requested_length() {
        let mut rng = Pcg32::seed_from_u64(0);
        let genome = Genome::random(12, &mut rng, &mut bit).unwrap();
        assert_eq!(genome.len(), 12);
        assert_eq!(genome.fitness(), None);
    }

    #[test]
    fn test_random_rejects_zero_length() {
        let mut rng = Pcg32::seed_from_u64(0);
        let err = Genome::random(0, &mut rng, &mut bit).unwrap_err();
        assert_eq!(err, InvalidArgumentError::EmptyGenome);
    }

    #[test]
    fn test_random_calls_generator_once_per_gene() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut calls = 0;
        let genome = Genome::random(5, &mut rng, &mut |_: &mut Pcg32| {
            calls += 1;
            calls
        })
        .unwrap();
        assert_eq!(genome.genes(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_evaluate_fitness_stores_result() {
        let mut genome = Genome::from_genes(vec![1, 1, 0, 1]).unwrap();
        let score = |genes: &[i32]| genes.iter().sum::<i32>() as f32 / 4.0;
        assert_eq!(genome.evaluate_fitness(&score), 0.75);
        assert_eq!(genome.fitness(), Some(0.75));
    }

    #[test]
    fn test_evaluate_fitness_does_not_clamp() {
        let mut genome = Genome::from_genes(vec![0]).unwrap();
        assert_eq!(genome.evaluate_fitness(&|_: &[i32]| 42.5), 42.5);
        assert_eq!(genome.evaluate_fitness(&|_: &[i32]| -3.0), -3.0);
    }

    #[test]
    fn test_crossover_is_deterministic_under_seed() {
        let a = Genome::from_genes((0..32).collect::<Vec<i32>>()).unwrap();
        let b = Genome::from_genes((100..132).collect::<Vec<i32>>()).unwrap();

        let first = a.crossover(&b, &mut Pcg32::seed_from_u64(99)).unwrap();
        let second = a.crossover(&b, &mut Pcg32::seed_from_u64(99)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_crossover_takes_each_gene_from_a_parent_at_same_position() {
        let a = Genome::from_genes((0..64).collect::<Vec<i32>>()).unwrap();
        let b = Genome::from_genes((100..164).collect::<Vec<i32>>()).unwrap();
        let child = a.crossover(&b, &mut Pcg32::seed_from_u64(3)).unwrap();

        assert_eq!(child.fitness(), None);
        for (i, gene) in child.genes().iter().enumerate() {
            assert!(*gene == a.genes()[i] || *gene == b.genes()[i]);
        }
        // with 64 positions both parents contribute
        assert!(child.genes().iter().any(|g| *g < 100));
        assert!(child.genes().iter().any(|g| *g >= 100));
    }

    #[test]
    fn test_crossover_length_mismatch() {
        let a = Genome::from_genes(vec![0; 4]).unwrap();
        let b = Genome::from_genes(vec![0; 5]).unwrap();
        let err = a.crossover(&b, &mut Pcg32::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, LengthMismatchError { left: 4, right: 5 });
    }

    #[test]
    fn test_crossover_mismatch_draws_no_randomness() {
        let a = Genome::from_genes(vec![0; 4]).unwrap();
        let b = Genome::from_genes(vec![0; 5]).unwrap();
        let mut rng = Pcg32::seed_from_u64(5);
        let _ = a.crossover(&b, &mut rng);
        let mut fresh = Pcg32::seed_from_u64(5);
        assert_eq!(rng.random::<u64>(), fresh.random::<u64>());
    }

    #[test]
    fn test_mutate_rate_zero_keeps_genes() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut genome = Genome::from_genes(vec![7u8; 100]).unwrap();
        genome.mutate(0.0, &mut rng, &mut |_: &mut Pcg32| 0);
        assert!(genome.genes().iter().all(|g| *g == 7));
    }

    #[test]
    fn test_mutate_rate_one_replaces_every_gene() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut genome = Genome::from_genes(vec![7u8; 100]).unwrap();
        genome.mutate(1.0, &mut rng, &mut |_: &mut Pcg32| 0);
        assert!(genome.genes().iter().all(|g| *g == 0));
    }

    #[test]
    fn test_mutate_keeps_length() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut genome = Genome::random(20, &mut rng, &mut bit).unwrap();
        genome.mutate(0.5, &mut rng, &mut bit);
        assert_eq!(genome.len(), 20);
    }
}
