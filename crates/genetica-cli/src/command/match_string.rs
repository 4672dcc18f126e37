use std::{collections::HashSet, num::NonZeroUsize, path::PathBuf};

use anyhow::{Context as _, bail};
use chrono::Utc;
use genetica_engine::{EngineParams, PopulationEngine};
use log::{Level, debug, info, log_enabled, warn};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    schema::{
        run_config::RunConfig,
        run_report::{BestGenome, RunReport},
    },
    util::{self, Output},
};

const DEFAULT_TARGET: &str = "Hello World!";
const DEFAULT_CHARSET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ,.|#$%&/()=?!-+:;@123456789 ";
const DEFAULT_POPULATION_SIZE: usize = 200;
const DEFAULT_MUTATION_RATE: f32 = 0.01;
const DEFAULT_ELITISM: usize = 5;
const DEFAULT_MAX_GENERATIONS: usize = 10_000;

const SOLVED_FITNESS: f32 = 1.0;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct MatchStringArg {
    /// String to evolve toward [default: "Hello World!"]
    #[arg(long)]
    target: Option<String>,
    /// Characters genes are drawn from
    #[arg(long)]
    charset: Option<String>,
    /// Number of individuals per generation [default: 200]
    #[arg(long)]
    population_size: Option<usize>,
    /// Per-character mutation probability [default: 0.01]
    #[arg(long)]
    mutation_rate: Option<f32>,
    /// Number of top individuals kept unchanged [default: 5]
    #[arg(long)]
    elitism: Option<usize>,
    /// Stop after this many generations [default: 10000]
    #[arg(long)]
    max_generations: Option<usize>,
    /// Random seed; a random one is chosen and logged if omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Run configuration file (JSON); flags take precedence over it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path for the JSON run report
    #[arg(long)]
    output: Option<PathBuf>,
    /// Log progress every N generations [default: 1]
    #[arg(long)]
    report_every: Option<NonZeroUsize>,
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    target: Vec<char>,
    charset: Vec<char>,
    params: EngineParams,
    max_generations: usize,
    seed: u64,
}

impl Settings {
    /// Merges flags over the config file over built-in defaults.
    fn resolve(arg: &MatchStringArg, config: RunConfig) -> anyhow::Result<Self> {
        let target: Vec<char> = arg
            .target
            .clone()
            .or(config.target)
            .unwrap_or_else(|| DEFAULT_TARGET.to_owned())
            .chars()
            .collect();
        if target.is_empty() {
            bail!("Target string is empty");
        }

        let mut charset: Vec<char> = arg
            .charset
            .clone()
            .or(config.charset)
            .unwrap_or_else(|| DEFAULT_CHARSET.to_owned())
            .chars()
            .collect();
        // duplicates would skew the gene distribution
        let mut seen = HashSet::with_capacity(charset.len());
        charset.retain(|c| seen.insert(*c));
        if charset.is_empty() {
            bail!("Character set is empty");
        }

        let params = EngineParams {
            population_size: arg
                .population_size
                .or(config.population_size)
                .unwrap_or(DEFAULT_POPULATION_SIZE),
            genome_length: target.len(),
            elitism: arg.elitism.or(config.elitism).unwrap_or(DEFAULT_ELITISM),
            mutation_rate: arg
                .mutation_rate
                .or(config.mutation_rate)
                .unwrap_or(DEFAULT_MUTATION_RATE),
        };
        params.validate().context("Invalid run parameters")?;

        let max_generations = arg
            .max_generations
            .or(config.max_generations)
            .unwrap_or(DEFAULT_MAX_GENERATIONS);
        if max_generations == 0 {
            bail!("Maximum generation count must be positive");
        }

        let seed = arg
            .seed
            .or(config.seed)
            .unwrap_or_else(|| rand::rng().random());

        Ok(Self {
            target,
            charset,
            params,
            max_generations,
            seed,
        })
    }
}

/// Fraction of positions where `genes` matches `target`.
#[expect(clippy::cast_precision_loss)]
fn match_fraction(genes: &[char], target: &[char]) -> f32 {
    let hits = genes.iter().zip(target).filter(|(g, t)| g == t).count();
    hits as f32 / target.len() as f32
}

pub(crate) fn run(arg: &MatchStringArg) -> anyhow::Result<()> {
    let config = match &arg.config {
        Some(path) => util::read_json_file("run configuration", path)?,
        None => RunConfig::default(),
    };
    let settings = Settings::resolve(arg, config)?;
    let report_every = arg.report_every.map_or(1, NonZeroUsize::get);

    info!(
        "Target: {:?} ({} genes over {} characters)",
        settings.target.iter().collect::<String>(),
        settings.target.len(),
        settings.charset.len()
    );
    info!("Seed: {}", settings.seed);
    info!(
        "Population: {}, elitism: {}, mutation rate: {}",
        settings.params.population_size, settings.params.elitism, settings.params.mutation_rate
    );
    if let Some(c) = settings
        .target
        .iter()
        .find(|c| !settings.charset.contains(c))
    {
        warn!("Target character {c:?} is not in the character set; the target cannot be reached");
    }

    let report = evolve(&settings, report_every)?;

    if report.solved {
        eprintln!("Solved at generation #{}", report.generations);
    } else {
        eprintln!(
            "Stopped after {} generations without a solution",
            report.generations
        );
    }
    let best_ever = &report.best_ever;
    eprintln!(
        "  Best ever: {:?} => {:.3} (generation #{})",
        best_ever.genes, best_ever.fitness, best_ever.generation
    );

    Output::save_json(&report, arg.output.as_deref())?;
    if let Some(path) = &arg.output {
        eprintln!("Report saved to {}", path.display());
    }

    Ok(())
}

/// Runs generations until the target is matched or the cap is reached.
fn evolve(settings: &Settings, report_every: usize) -> anyhow::Result<RunReport> {
    let gene_pool = settings.charset.clone();
    let fitness_target = settings.target.clone();
    let mut engine = PopulationEngine::new(
        settings.params,
        Pcg32::seed_from_u64(settings.seed),
        move |rng: &mut Pcg32| gene_pool[rng.random_range(0..gene_pool.len())],
        move |genes: &[char]| match_fraction(genes, &fitness_target),
    )?;

    let mut best_ever: Option<BestGenome> = None;
    let mut last_best: Option<BestGenome> = None;
    let mut solved = false;
    for _ in 0..settings.max_generations {
        engine.step();
        // the generation that was just evaluated
        let generation = engine.generation() - 1;
        let (Some(fitness), Some(genes)) = (engine.best_fitness(), engine.best_genes()) else {
            bail!("Generation #{generation} produced no best genome");
        };
        let best = BestGenome {
            genes: genes.iter().collect(),
            fitness,
            generation,
        };

        if engine.fallback_selections() > 0 {
            warn!(
                "Generation #{generation}: {} parent picks fell back to uniform selection",
                engine.fallback_selections()
            );
        }
        if generation % report_every == 0 {
            let mean = engine.fitness_stats().map_or(f32::NAN, |s| s.mean);
            info!(
                "Generation #{generation}: {:?} => {:.3} (mean {mean:.3})",
                best.genes, best.fitness
            );
        }
        if log_enabled!(Level::Debug) {
            for (i, genome) in engine.population().iter().enumerate() {
                debug!("  {i:4}: {}", genome.genes().iter().collect::<String>());
            }
        }

        if best_ever.as_ref().is_none_or(|b| best.fitness > b.fitness) {
            best_ever = Some(best.clone());
        }
        solved = best.fitness >= SOLVED_FITNESS;
        last_best = Some(best);
        if solved {
            break;
        }
    }

    let last_best = last_best.context("No generation was evaluated")?;
    let best_ever = best_ever.context("No generation was evaluated")?;
    Ok(RunReport {
        target: settings.target.iter().collect(),
        charset: settings.charset.iter().collect(),
        seed: settings.seed,
        params: settings.params,
        max_generations: settings.max_generations,
        generations: last_best.generation,
        solved,
        last_best,
        best_ever,
        last_stats: engine.fitness_stats(),
        finished_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&MatchStringArg::default(), RunConfig::default()).unwrap();
        assert_eq!(settings.target, chars(DEFAULT_TARGET));
        assert_eq!(settings.charset, chars(DEFAULT_CHARSET));
        assert_eq!(
            settings.params,
            EngineParams {
                population_size: DEFAULT_POPULATION_SIZE,
                genome_length: DEFAULT_TARGET.len(),
                elitism: DEFAULT_ELITISM,
                mutation_rate: DEFAULT_MUTATION_RATE,
            }
        );
        assert_eq!(settings.max_generations, DEFAULT_MAX_GENERATIONS);
    }

    #[test]
    fn test_flags_override_config() {
        let arg = MatchStringArg {
            target: Some("ABAB".to_owned()),
            elitism: Some(1),
            seed: Some(3),
            ..MatchStringArg::default()
        };
        let config = RunConfig {
            target: Some("XYZ".to_owned()),
            charset: Some("AB".to_owned()),
            elitism: Some(4),
            population_size: Some(10),
            seed: Some(99),
            ..RunConfig::default()
        };
        let settings = Settings::resolve(&arg, config).unwrap();
        assert_eq!(settings.target, chars("ABAB"));
        assert_eq!(settings.charset, chars("AB"));
        assert_eq!(settings.params.genome_length, 4);
        assert_eq!(settings.params.elitism, 1);
        assert_eq!(settings.params.population_size, 10);
        assert_eq!(settings.seed, 3);
    }

    #[test]
    fn test_duplicate_charset_entries_are_dropped() {
        let arg = MatchStringArg {
            charset: Some("ABBA".to_owned()),
            ..MatchStringArg::default()
        };
        let settings = Settings::resolve(&arg, RunConfig::default()).unwrap();
        assert_eq!(settings.charset, chars("AB"));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let empty_target = MatchStringArg {
            target: Some(String::new()),
            ..MatchStringArg::default()
        };
        assert!(Settings::resolve(&empty_target, RunConfig::default()).is_err());

        let empty_charset = MatchStringArg {
            charset: Some(String::new()),
            ..MatchStringArg::default()
        };
        assert!(Settings::resolve(&empty_charset, RunConfig::default()).is_err());

        let too_many_elites = MatchStringArg {
            population_size: Some(3),
            elitism: Some(4),
            ..MatchStringArg::default()
        };
        assert!(Settings::resolve(&too_many_elites, RunConfig::default()).is_err());

        let no_generations = MatchStringArg {
            max_generations: Some(0),
            ..MatchStringArg::default()
        };
        assert!(Settings::resolve(&no_generations, RunConfig::default()).is_err());
    }

    #[test]
    fn test_match_fraction() {
        let target = chars("Hello");
        assert_eq!(match_fraction(&chars("Hello"), &target), 1.0);
        assert_eq!(match_fraction(&chars("Hxllx"), &target), 0.6);
        assert_eq!(match_fraction(&chars("xxxxx"), &target), 0.0);
    }

    fn settings(target: &str, charset: &str, max_generations: usize) -> Settings {
        let arg = MatchStringArg {
            target: Some(target.to_owned()),
            charset: Some(charset.to_owned()),
            population_size: Some(20),
            elitism: Some(2),
            mutation_rate: Some(0.05),
            max_generations: Some(max_generations),
            seed: Some(10),
            ..MatchStringArg::default()
        };
        Settings::resolve(&arg, RunConfig::default()).unwrap()
    }

    #[test]
    fn test_evolve_stops_when_solved() {
        let report = evolve(&settings("ABAB", "AB", 500), 1).unwrap();
        assert!(report.solved);
        assert_eq!(report.last_best.genes, "ABAB");
        assert_eq!(report.last_best.fitness, 1.0);
        assert_eq!(report.last_best.generation, report.generations);
        assert!(report.generations < 500);
        assert_eq!(report.best_ever, report.last_best);
        assert_eq!(report.target, "ABAB");
        assert_eq!(report.seed, 10);
    }

    #[test]
    fn test_evolve_stops_at_generation_cap() {
        // 'C' can never be generated
        let report = evolve(&settings("ABC", "AB", 1), 1).unwrap();
        assert!(!report.solved);
        assert_eq!(report.generations, 1);
        assert!(report.best_ever.fitness >= report.last_best.fitness);

        let report = evolve(&settings("ABCABC", "AB", 7), 3).unwrap();
        assert!(!report.solved);
        assert_eq!(report.generations, 7);
        assert!(report.best_ever.generation <= 7);
        assert!(report.best_ever.fitness >= report.last_best.fitness);
        assert!(report.best_ever.fitness < 1.0);
    }

    #[test]
    fn test_evolve_is_reproducible() {
        let first = evolve(&settings("ABBA", "AB", 50), 1).unwrap();
        let second = evolve(&settings("ABBA", "AB", 50), 1).unwrap();
        assert_eq!(first.generations, second.generations);
        assert_eq!(first.best_ever, second.best_ever);
    }

    #[test]
    fn test_report_is_written_as_json() {
        let report = evolve(&settings("ABAB", "AB", 500), 1).unwrap();
        let path = std::env::temp_dir().join(format!(
            "genetica-report-{}-{}.json",
            std::process::id(),
            report.generations
        ));
        Output::save_json(&report, Some(path.as_path())).unwrap();
        let read: RunReport = util::read_json_file("run report", &path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(read.solved);
        assert_eq!(read.generations, report.generations);
        assert_eq!(read.best_ever, report.best_ever);
        assert_eq!(read.params, report.params);
    }
}
