//! Run configuration for evolution.
//!
//! Every section defaults independently, so a JSON file only needs the keys
//! it overrides:
//!
//! ```json
//! { "population_size": 1000, "crossover": { "max_height": 12 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gp::crossover::CrossoverConfig;
use crate::gp::evolution::PipelineConfig;
use crate::gp::generate::GenerateConfig;
use crate::gp::mutation::MutationConfig;
use crate::gp::selection::SelectionConfig;

/// Configuration for a complete evolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of individuals per generation.
    pub population_size: usize,
    /// Number of generations evaluated, including the initial one.
    pub max_generations: usize,
    /// Random seed; `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Stop once the best fitness is at or below this value.
    pub target_fitness: Option<f64>,
    /// Tree generation parameters.
    pub generate: GenerateConfig,
    /// Selection parameters.
    pub selection: SelectionConfig,
    /// Crossover parameters.
    pub crossover: CrossoverConfig,
    /// Mutation parameters.
    pub mutation: MutationConfig,
    /// Operator rates and elitism.
    pub pipeline: PipelineConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 512,
            max_generations: 50,
            seed: None,
            target_fitness: None,
            generate: GenerateConfig::default(),
            selection: SelectionConfig::default(),
            crossover: CrossoverConfig::default(),
            mutation: MutationConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl EvolutionConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`EvolutionConfig::from_json_str`].
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.population_size == 0 {
            return invalid("population_size must be positive".to_string());
        }
        if self.max_generations == 0 {
            return invalid("max_generations must be positive".to_string());
        }

        let generate = &self.generate;
        if generate.min_height == 0 {
            return invalid("generate.min_height must be positive".to_string());
        }
        if generate.min_height > generate.max_height || generate.min_height > generate.init_max_height {
            return invalid(format!(
                "generate.min_height {} exceeds a maximum height",
                generate.min_height
            ));
        }
        if !(0.0..=1.0).contains(&generate.full_probability) {
            return invalid(format!(
                "generate.full_probability {} is outside [0, 1]",
                generate.full_probability
            ));
        }
        if generate.unique_population && generate.collision_factor == 0 {
            return invalid("generate.collision_factor must be positive".to_string());
        }

        if self.selection.tournament_size == 0 {
            return invalid("selection.tournament_size must be positive".to_string());
        }
        if self.crossover.max_height < generate.init_max_height {
            return invalid(format!(
                "crossover.max_height {} is below generate.init_max_height {}",
                self.crossover.max_height, generate.init_max_height
            ));
        }
        if let Some(rate) = self.crossover.internal_point_rate
            && !(0.0..=1.0).contains(&rate)
        {
            return invalid(format!("crossover.internal_point_rate {rate} is outside [0, 1]"));
        }
        if self.mutation.max_height < generate.max_height {
            return invalid(format!(
                "mutation.max_height {} is below generate.max_height {}",
                self.mutation.max_height, generate.max_height
            ));
        }

        let pipeline = &self.pipeline;
        let rates = [
            pipeline.mutation_rate,
            pipeline.crossover_rate,
            pipeline.reproduction_rate,
        ];
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return invalid(format!("operator rates {rates:?} must be finite and non-negative"));
        }
        if rates.iter().sum::<f64>() <= 0.0 {
            return invalid("at least one operator rate must be positive".to_string());
        }
        if pipeline.number_elite > self.population_size {
            return invalid(format!(
                "pipeline.number_elite {} exceeds population_size {}",
                pipeline.number_elite, self.population_size
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        EvolutionConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EvolutionConfig::from_json_str(
            r#"{ "population_size": 100, "crossover": { "max_height": 12 } }"#,
        )
        .unwrap();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.crossover.max_height, 12);
        assert_eq!(config.crossover.max_iterations, 100);
        assert_eq!(config.selection.tournament_size, 4);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EvolutionConfig {
            seed: Some(7),
            target_fitness: Some(0.0),
            ..EvolutionConfig::default()
        };
        let json = config.to_json_pretty().unwrap();
        assert_eq!(EvolutionConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            r#"{ "population_size": 0 }"#,
            r#"{ "generate": { "min_height": 5, "max_height": 4 } }"#,
            r#"{ "generate": { "full_probability": 2.0 } }"#,
            r#"{ "selection": { "tournament_size": 0 } }"#,
            r#"{ "crossover": { "max_height": 3 } }"#,
            r#"{ "pipeline": { "mutation_rate": -1.0 } }"#,
            r#"{ "pipeline": { "mutation_rate": 0.0, "crossover_rate": 0.0, "reproduction_rate": 0.0 } }"#,
            r#"{ "population_size": 2, "pipeline": { "number_elite": 3 } }"#,
        ];
        for json in cases {
            let err = EvolutionConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{json}: {err}");
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = EvolutionConfig::from_json_str("{ population_size: }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_generations": 9, "seed": 3 }}"#).unwrap();
        let config = EvolutionConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_generations, 9);
        assert_eq!(config.seed, Some(3));

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            EvolutionConfig::from_json_file(&missing),
            Err(ConfigError::Io(_))
        ));
    }
}
