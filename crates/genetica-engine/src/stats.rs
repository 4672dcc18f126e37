use serde::{Deserialize, Serialize};

use crate::Genome;

/// Summary of the fitness values of an evaluated population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessStats {
    /// Lowest fitness.
    pub min: f32,
    /// Highest fitness.
    pub max: f32,
    /// Arithmetic mean.
    pub mean: f32,
    /// Upper median (the middle value of the sorted fitnesses).
    pub median: f32,
    /// Population standard deviation.
    pub std_dev: f32,
    /// Number of evaluated genomes the summary covers.
    pub count: usize,
}

impl FitnessStats {
    /// Summarizes the fitness of every evaluated genome.
    ///
    /// Genomes that were never evaluated are skipped. Returns `None` if no
    /// genome has a fitness.
    ///
    /// # Examples
    ///
    /// ```
    /// use genetica_engine::{FitnessStats, Genome};
    ///
    /// let mut genomes: Vec<_> = (1..=5)
    ///     .map(|i| Genome::from_genes(vec![i]).unwrap())
    ///     .collect();
    /// assert_eq!(FitnessStats::from_genomes(&genomes), None);
    ///
    /// for genome in &mut genomes {
    ///     genome.evaluate_fitness(&|genes: &[i32]| genes[0] as f32);
    /// }
    /// let stats = FitnessStats::from_genomes(&genomes).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn from_genomes<T>(genomes: &[Genome<T>]) -> Option<Self> {
        let mut values = genomes
            .iter()
            .filter_map(Genome::fitness)
            .collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);

        let min = *values.first()?;
        let max = *values.last()?;
        let count = values.len();
        #[expect(clippy::cast_precision_loss)]
        let n = count as f32;
        let mean = values.iter().sum::<f32>() / n;
        let median = values[count / 2];
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
            count,
        })
    }
}
