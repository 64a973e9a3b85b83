//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use crate::error::{Error, Result};
use std::time::Duration;

/// Configuration for the evolutionary loop.
///
/// Controls population size, operator probabilities, elitism, termination
/// conditions, statistics sampling, and parallel evaluation. Operators
/// themselves are passed separately as an [`Operators`](super::Operators) set.
///
/// # Defaults
///
/// ```
/// use u_permevo::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 500);
/// assert_eq!(config.max_evaluations, 0);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use std::time::Duration;
/// use u_permevo::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_elite_ratio(0.1)
///     .with_mutation_prob(0.2)
///     .with_time_limit(Duration::from_secs(5))
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals per generation.
    ///
    /// Typical range: 50–500.
    pub population_size: usize,

    /// Hard cap on the number of generations.
    pub max_generations: usize,

    /// Stop once this many evaluations have been spent. 0 = unlimited.
    ///
    /// A local-search refinement counts as one extra evaluation.
    pub max_evaluations: usize,

    /// Wall-clock budget. `Duration::ZERO` = unlimited.
    ///
    /// Checked at the start of each generation, so the run may overshoot by
    /// up to one generation's worth of work.
    pub time_limit: Duration,

    /// Probability of recombining a selected pair (0.0–1.0).
    ///
    /// When crossover is skipped, the first parent is carried forward alone.
    pub crossover_prob: f64,

    /// Probability of mutating each offspring (0.0–1.0).
    pub mutation_prob: f64,

    /// Fraction of the population copied unchanged into the next
    /// generation (0.0–1.0). Typical range: 0.05–0.2.
    pub elite_ratio: f64,

    /// Random seed for reproducibility. `None` draws one from the OS.
    pub seed: Option<u64>,

    /// Populations up to this size measure diversity over every pair.
    pub diversity_threshold: usize,

    /// Number of sampled pairs used above `diversity_threshold`.
    pub diversity_max_samples: usize,

    /// Generations without a strictly better best before declaring
    /// convergence. 0 disables.
    pub stagnation_limit: usize,

    /// Record [`GenerationStats`](super::GenerationStats) every this many
    /// generations. 0 disables statistics.
    pub log_interval: usize,

    /// Whether to evaluate offspring in parallel using rayon.
    ///
    /// Results are identical either way. Ignored without the `parallel`
    /// feature.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            max_evaluations: 0,
            time_limit: Duration::ZERO,
            crossover_prob: 0.9,
            mutation_prob: 0.1,
            elite_ratio: 0.1,
            seed: None,
            diversity_threshold: 100,
            diversity_max_samples: 1000,
            stagnation_limit: 50,
            log_interval: 1,
            parallel: true,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the evaluation budget (0 = unlimited).
    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    /// Sets the wall-clock budget (`Duration::ZERO` = unlimited).
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the wall-clock budget in milliseconds (0 = unlimited).
    pub fn with_time_limit_ms(self, ms: u64) -> Self {
        self.with_time_limit(Duration::from_millis(ms))
    }

    /// Sets the crossover probability.
    pub fn with_crossover_prob(mut self, p: f64) -> Self {
        self.crossover_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_prob(mut self, p: f64) -> Self {
        self.mutation_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the diversity sampling cap: exhaustive up to `threshold`
    /// individuals, `max_samples` random pairs above it.
    pub fn with_diversity_sampling(mut self, threshold: usize, max_samples: usize) -> Self {
        self.diversity_threshold = threshold;
        self.diversity_max_samples = max_samples;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the statistics interval (0 to disable).
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of individuals preserved by elitism.
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elite_ratio) as usize
    }

    /// Preset for fast optimization: small population, few generations.
    ///
    /// - Population: 50, Generations: 100, Time limit: 10s
    /// - Stagnation limit: 20
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            stagnation_limit: 20,
            time_limit: Duration::from_secs(10),
            ..Self::default()
        }
    }

    /// Preset for balanced optimization.
    ///
    /// - Population: 100, Generations: 300, Time limit: 30s
    /// - Stagnation limit: 50
    pub fn balanced() -> Self {
        Self {
            population_size: 100,
            max_generations: 300,
            stagnation_limit: 50,
            time_limit: Duration::from_secs(30),
            ..Self::default()
        }
    }

    /// Preset for quality optimization: large population, many generations.
    ///
    /// - Population: 150, Generations: 500, Time limit: 60s
    /// - Stagnation limit: 80
    pub fn quality() -> Self {
        Self {
            population_size: 150,
            max_generations: 500,
            stagnation_limit: 80,
            time_limit: Duration::from_secs(60),
            ..Self::default()
        }
    }

    /// Selects a preset based on the number of items in a genome.
    ///
    /// - `item_count < 50` → [`fast()`](Self::fast)
    /// - `50 ≤ item_count < 200` → [`balanced()`](Self::balanced)
    /// - `item_count ≥ 200` → [`quality()`](Self::quality)
    pub fn auto_select(item_count: usize) -> Self {
        if item_count < 50 {
            Self::fast()
        } else if item_count < 200 {
            Self::balanced()
        } else {
            Self::quality()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(invalid("population_size must be at least 2"));
        }
        if self.max_generations == 0 {
            return Err(invalid("max_generations must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.elite_ratio) {
            return Err(invalid("elite_ratio must be within [0, 1]"));
        }
        if self.elite_count() >= self.population_size {
            return Err(invalid("elite_ratio too high: elites fill entire population"));
        }
        if !(0.0..=1.0).contains(&self.crossover_prob) {
            return Err(invalid("crossover_prob must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.mutation_prob) {
            return Err(invalid("mutation_prob must be within [0, 1]"));
        }
        if self.diversity_max_samples == 0 {
            return Err(invalid("diversity_max_samples must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> Error {
    Error::InvalidConfig(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_generations, 500);
        assert_eq!(config.max_evaluations, 0);
        assert_eq!(config.time_limit, Duration::ZERO);
        assert!((config.elite_ratio - 0.1).abs() < 1e-10);
        assert!((config.crossover_prob - 0.9).abs() < 1e-10);
        assert!((config.mutation_prob - 0.1).abs() < 1e-10);
        assert_eq!(config.stagnation_limit, 50);
        assert_eq!(config.log_interval, 1);
        assert_eq!(config.diversity_threshold, 100);
        assert_eq!(config.diversity_max_samples, 1000);
        assert!(config.parallel);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(200)
            .with_max_generations(1000)
            .with_max_evaluations(50_000)
            .with_elite_ratio(0.2)
            .with_crossover_prob(0.8)
            .with_mutation_prob(0.05)
            .with_stagnation_limit(100)
            .with_log_interval(10)
            .with_diversity_sampling(64, 256)
            .with_parallel(false)
            .with_seed(42);

        assert_eq!(config.population_size, 200);
        assert_eq!(config.max_generations, 1000);
        assert_eq!(config.max_evaluations, 50_000);
        assert!((config.elite_ratio - 0.2).abs() < 1e-10);
        assert!((config.crossover_prob - 0.8).abs() < 1e-10);
        assert!((config.mutation_prob - 0.05).abs() < 1e-10);
        assert_eq!(config.stagnation_limit, 100);
        assert_eq!(config.log_interval, 10);
        assert_eq!(config.diversity_threshold, 64);
        assert_eq!(config.diversity_max_samples, 256);
        assert!(!config.parallel);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_validate_ok() {
        assert!(GaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = GaConfig::default().with_population_size(1);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_zero_generations() {
        let config = GaConfig::default().with_max_generations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_elite_too_high() {
        let config = GaConfig::default()
            .with_population_size(10)
            .with_elite_ratio(1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unclamped_fields() {
        let config = GaConfig {
            mutation_prob: 1.5,
            ..GaConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GaConfig {
            diversity_max_samples: 0,
            ..GaConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_probabilities() {
        let config = GaConfig::default()
            .with_elite_ratio(1.5)
            .with_crossover_prob(-0.5)
            .with_mutation_prob(2.0);

        assert!((config.elite_ratio - 1.0).abs() < 1e-10);
        assert!((config.crossover_prob - 0.0).abs() < 1e-10);
        assert!((config.mutation_prob - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_elite_count_floors() {
        let config = GaConfig::default()
            .with_population_size(15)
            .with_elite_ratio(0.1);
        assert_eq!(config.elite_count(), 1);
    }

    #[test]
    fn test_time_limit_ms() {
        let config = GaConfig::default().with_time_limit_ms(5000);
        assert_eq!(config.time_limit, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    // ---- Presets ----

    #[test]
    fn test_presets_valid() {
        for config in [GaConfig::fast(), GaConfig::balanced(), GaConfig::quality()] {
            assert!(config.validate().is_ok());
        }
        assert_eq!(GaConfig::fast().population_size, 50);
        assert_eq!(GaConfig::balanced().max_generations, 300);
        assert_eq!(GaConfig::quality().time_limit, Duration::from_secs(60));
    }

    #[test]
    fn test_preset_chainable() {
        let config = GaConfig::fast().with_population_size(75).with_seed(42);
        assert_eq!(config.population_size, 75);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.time_limit, Duration::from_secs(10));
    }

    #[test]
    fn test_auto_select_boundaries() {
        assert_eq!(GaConfig::auto_select(49).population_size, 50);
        assert_eq!(GaConfig::auto_select(50).population_size, 100);
        assert_eq!(GaConfig::auto_select(199).population_size, 100);
        assert_eq!(GaConfig::auto_select(200).population_size, 150);
    }
}
