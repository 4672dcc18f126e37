use chrono::{DateTime, Utc};
use genetica_engine::{EngineParams, FitnessStats};
use serde::{Deserialize, Serialize};

/// Result of a `match-string` run, written as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub target: String,
    pub charset: String,
    pub seed: u64,
    pub params: EngineParams,
    pub max_generations: usize,
    /// Number of generations evaluated
    pub generations: usize,
    pub solved: bool,
    /// Best genome of the last evaluated generation
    pub last_best: BestGenome,
    /// Best genome over the whole run
    pub best_ever: BestGenome,
    pub last_stats: Option<FitnessStats>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestGenome {
    pub genes: String,
    pub fitness: f32,
    pub generation: usize,
}
