//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! initialization → evaluation → elitism → selection → crossover →
//! mutation → repair → evaluation → local search → replacement → repeat.

use super::config::GaConfig;
use super::evaluator::evaluate_batch;
use super::population::Population;
use super::types::{CrossoverOperator, MutationOperator, Operators, SelectionOperator};
use crate::error::{Error, Result};
use crate::problem::{Genome, PermutationProblem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const STATS_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Snapshot of one generation, recorded every `log_interval` generations.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// Generation index (0 is the initial population).
    pub generation: usize,
    /// Lowest fitness in the population.
    pub best_fitness: f64,
    /// Mean fitness of the population.
    pub mean_fitness: f64,
    /// Highest fitness in the population.
    pub worst_fitness: f64,
    /// Mean pairwise Hamming fraction, see [`Population::diversity`].
    pub diversity: f64,
    /// Wall time since the run started.
    pub elapsed: Duration,
}

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The best genome found during the entire run.
    pub best_genome: Genome,

    /// Fitness of `best_genome`.
    pub best_fitness: f64,

    /// Number of generations whose replacement step completed.
    pub generations: usize,

    /// Fitness evaluations spent, counting each local-search call as one.
    pub evaluations: usize,

    /// Whether the run stopped because the stagnation limit was reached.
    pub converged: bool,

    /// Total wall time.
    pub elapsed: Duration,

    /// Statistics recorded every `log_interval` generations.
    pub stats: Vec<GenerationStats>,

    /// All-time best fitness after initialization and after each generation.
    pub fitness_history: Vec<f64>,
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```
/// use u_permevo::ga::{
///     GaConfig, GaRunner, Operators, PermutationCrossover, PermutationMutation, Selection,
/// };
/// use u_permevo::local::TwoOpt;
/// use u_permevo::problem::TspProblem;
///
/// let points: Vec<(f64, f64)> = (0..12)
///     .map(|i| {
///         let a = i as f64 * std::f64::consts::TAU / 12.0;
///         (a.cos(), a.sin())
///     })
///     .collect();
/// let problem = TspProblem::from_coordinates(&points).unwrap();
/// let mut operators: Operators<TspProblem, _, _, _> = Operators::new(
///     Selection::Tournament(3),
///     PermutationCrossover::Order,
///     PermutationMutation::Invert,
/// )
/// .with_local_search(TwoOpt::first_improvement());
/// let config = GaConfig::default()
///     .with_population_size(20)
///     .with_max_generations(10)
///     .with_seed(42);
///
/// let result = GaRunner::run(&problem, &mut operators, &config).unwrap();
/// assert_eq!(result.best_genome.len(), 12);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `config` fails [`GaConfig::validate`].
    /// - [`Error::EmptyProblem`] if the problem has no items.
    /// - [`Error::GenomeLength`] if a generated, recombined, mutated, or
    ///   repaired genome does not have `problem.size()` items.
    pub fn run<P, S, C, M>(
        problem: &P,
        operators: &mut Operators<P, S, C, M>,
        config: &GaConfig,
    ) -> Result<GaResult>
    where
        P: PermutationProblem,
        S: SelectionOperator,
        C: CrossoverOperator<P>,
        M: MutationOperator<P>,
    {
        config.validate()?;
        let n = problem.size();
        if n == 0 {
            return Err(Error::EmptyProblem);
        }

        let start = Instant::now();
        let pop_size = config.population_size;
        let elite_count = config.elite_count();
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        // Diversity sampling draws from its own stream so that the logging
        // interval never shifts the search.
        let mut stats_rng = StdRng::seed_from_u64(seed ^ STATS_STREAM);

        info!(
            event = "ga_start",
            population_size = pop_size,
            problem_size = n,
            elite_count = elite_count,
            local_search = operators.local_search.is_some(),
        );

        // 1. Initialize and evaluate
        let mut genomes = Vec::with_capacity(pop_size);
        for _ in 0..pop_size {
            let mut genome = problem.random_genome(&mut rng);
            if let Some(repair) = &operators.repair {
                repair.repair(problem, &mut genome);
            }
            check_length(&genome, n)?;
            genomes.push(genome);
        }
        let fitnesses = evaluate_batch(problem, &genomes, config.parallel);
        let mut evaluations = pop_size;

        let mut population = Population::with_capacity(pop_size);
        for (genome, fitness) in genomes.into_iter().zip(fitnesses) {
            population.push(genome, fitness);
        }

        // 2. Track best
        let (mut best_genome, mut best_fitness) = best_of(&population);
        let mut fitness_history = Vec::with_capacity(config.max_generations.min(4096) + 1);
        fitness_history.push(best_fitness);

        let mut stats = Vec::new();
        if config.log_interval > 0 {
            stats.push(record_stats(&population, 0, config, start, &mut stats_rng));
        }

        let mut generations = 0usize;
        let mut stagnation = 0usize;
        let mut converged = false;

        // 3. Evolutionary loop
        while !budget_exhausted(config, start.elapsed(), evaluations, generations) {
            let ranked = population.ranked_indices();
            let mut next = Population::with_capacity(pop_size);

            // Elite preservation
            for &i in ranked.iter().take(elite_count) {
                next.push(population.genome(i).to_vec(), population.fitness(i));
            }

            // Generate offspring
            let target = pop_size - next.len();
            let mut offspring: Vec<Genome> = Vec::with_capacity(target);
            while offspring.len() < target {
                let p1 = operators.selection.select(population.fitnesses(), &mut rng);
                let p2 = operators.selection.select(population.fitnesses(), &mut rng);

                let (first, second) = if rng.random_bool(config.crossover_prob) {
                    let (c1, c2) = operators.crossover.cross(
                        problem,
                        population.genome(p1),
                        population.genome(p2),
                        &mut rng,
                    );
                    (c1, Some(c2))
                } else {
                    (population.genome(p1).to_vec(), None)
                };

                for mut child in std::iter::once(first).chain(second) {
                    if offspring.len() >= target {
                        break;
                    }
                    if rng.random_bool(config.mutation_prob) {
                        operators.mutation.mutate(problem, &mut child, &mut rng);
                    }
                    if let Some(repair) = &operators.repair {
                        repair.repair(problem, &mut child);
                    }
                    check_length(&child, n)?;
                    offspring.push(child);
                }
            }

            // Evaluate, then refine sequentially
            let mut offspring_fitness = evaluate_batch(problem, &offspring, config.parallel);
            evaluations += offspring.len();
            if let Some(local_search) = operators.local_search.as_mut() {
                for (genome, fitness) in offspring.iter_mut().zip(offspring_fitness.iter_mut()) {
                    *fitness = local_search.improve(problem, genome);
                    evaluations += 1;
                }
            }

            for (genome, fitness) in offspring.into_iter().zip(offspring_fitness) {
                next.push(genome, fitness);
            }
            population = next;
            generations += 1;

            // Update best
            let (gen_best_genome, gen_best_fitness) = best_of(&population);
            if gen_best_fitness < best_fitness {
                best_genome = gen_best_genome;
                best_fitness = gen_best_fitness;
                stagnation = 0;
            } else {
                stagnation += 1;
            }
            fitness_history.push(best_fitness);

            if config.log_interval > 0 && generations % config.log_interval == 0 {
                stats.push(record_stats(&population, generations, config, start, &mut stats_rng));
            }

            // Stagnation check
            if config.stagnation_limit > 0 && stagnation >= config.stagnation_limit {
                debug!(
                    event = "stagnation",
                    generation = generations,
                    limit = config.stagnation_limit,
                    best_fitness = best_fitness,
                );
                converged = true;
                break;
            }
        }

        let elapsed = start.elapsed();
        info!(
            event = "ga_end",
            generations = generations,
            evaluations = evaluations,
            best_fitness = best_fitness,
            converged = converged,
            duration_ms = elapsed.as_millis() as u64,
        );

        Ok(GaResult {
            best_genome,
            best_fitness,
            generations,
            evaluations,
            converged,
            elapsed,
            stats,
            fitness_history,
        })
    }
}

fn budget_exhausted(
    config: &GaConfig,
    elapsed: Duration,
    evaluations: usize,
    generations: usize,
) -> bool {
    generations >= config.max_generations
        || (config.max_evaluations > 0 && evaluations >= config.max_evaluations)
        || (!config.time_limit.is_zero() && elapsed >= config.time_limit)
}

fn check_length(genome: &[usize], expected: usize) -> Result<()> {
    if genome.len() != expected {
        return Err(Error::GenomeLength {
            expected,
            actual: genome.len(),
        });
    }
    Ok(())
}

/// Best genome and fitness in `population`.
fn best_of(population: &Population) -> (Genome, f64) {
    population
        .best_index()
        .map(|i| (population.genome(i).to_vec(), population.fitness(i)))
        .unwrap_or_else(|| (Vec::new(), f64::INFINITY))
}

fn record_stats<R: Rng + ?Sized>(
    population: &Population,
    generation: usize,
    config: &GaConfig,
    start: Instant,
    rng: &mut R,
) -> GenerationStats {
    let summary = population.summary();
    let diversity = population.diversity(
        config.diversity_threshold,
        config.diversity_max_samples,
        rng,
    );
    let stats = GenerationStats {
        generation,
        best_fitness: summary.map_or(f64::INFINITY, |s| s.best),
        mean_fitness: summary.map_or(f64::INFINITY, |s| s.mean),
        worst_fitness: summary.map_or(f64::INFINITY, |s| s.worst),
        diversity,
        elapsed: start.elapsed(),
    };
    debug!(
        event = "generation",
        generation = stats.generation,
        best_fitness = stats.best_fitness,
        mean_fitness = stats.mean_fitness,
        worst_fitness = stats.worst_fitness,
        diversity = stats.diversity,
    );
    stats
}

// ============================================================================
// Tests
// ============================================================================
