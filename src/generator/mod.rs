//! Staged model generation.
//!
//! A [`ModelGenerator`] owns everything one run needs: the validated
//! configuration, the run's [`RandomSource`], the entity factory and fresh
//! fixture values. Stages run in a fixed order (repository, system,
//! allocation, usage), each reading only the previous stage's output, so the
//! sequence of random draws and therefore the model is fixed by the seed.

mod allocation;
mod repository;
mod system;
mod usage;

pub use allocation::partition_evenly;
pub use repository::feasible_role_max;

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::factory::{DirectFactory, EntityFactory};
use crate::fixtures::{ResourceEnvironment, StandardDefinitions};
use crate::literal::LiteralRanges;
use crate::model::Model;
use crate::random::RandomSource;

pub struct ModelGenerator<F: EntityFactory = DirectFactory> {
    config: GeneratorConfig,
    rng: RandomSource,
    factory: F,
    standard: StandardDefinitions,
    environment: ResourceEnvironment,
    literals: LiteralRanges,
}

impl ModelGenerator<DirectFactory> {
    /// Validates `config` before the random source is used.
    pub fn new(config: GeneratorConfig, rng: RandomSource) -> Result<Self, GenerateError> {
        Self::with_factory(config, rng, DirectFactory)
    }
}

impl<F: EntityFactory> ModelGenerator<F> {
    pub fn with_factory(
        config: GeneratorConfig,
        rng: RandomSource,
        factory: F,
    ) -> Result<Self, GenerateError> {
        config.validate()?;
        let literals = LiteralRanges::from(&config);
        Ok(Self {
            config,
            rng,
            factory,
            standard: StandardDefinitions::new(),
            environment: ResourceEnvironment::default_layout(),
            literals,
        })
    }

    /// Replaces the default single-container environment.
    pub fn with_environment(mut self, environment: ResourceEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn standard(&self) -> &StandardDefinitions {
        &self.standard
    }

    pub fn environment(&self) -> &ResourceEnvironment {
        &self.environment
    }

    /// Runs all four stages and moves the fixtures into the finished model.
    pub fn generate_complete_model(mut self, num_interfaces: usize, num_components: usize) -> Model {
        let seed = self.rng.seed();
        tracing::debug!(
            seed,
            num_interfaces,
            num_components,
            containers = self.environment.containers.len(),
            "generating model"
        );

        let repository = self.generate_repository(num_interfaces, num_components);
        let system = self.generate_system(&repository);
        let environment = std::mem::take(&mut self.environment);
        let allocation = self.generate_allocation(&system, &environment);
        let usage = self.generate_usage_model(&repository, &system);

        let model = Model {
            standard: self.standard,
            environment,
            repository,
            system,
            allocation,
            usage,
        };

        let stats = model.stats();
        tracing::debug!(
            seed,
            interfaces = stats.interfaces,
            components = stats.components,
            connectors = stats.connectors,
            exposed_roles = stats.exposed_roles,
            allocation_groups = stats.allocation_groups,
            entry_calls = stats.entry_calls,
            "model generated"
        );
        model
    }
}

/// Generates one model with the default factory and single-container environment.
///
/// Without a seed the run seeds itself from OS entropy.
pub fn generate_complete_model(
    num_interfaces: usize,
    num_components: usize,
    config: &GeneratorConfig,
    seed: Option<u64>,
) -> Result<Model, GenerateError> {
    let rng = match seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    };
    let generator = ModelGenerator::new(config.clone(), rng)?;
    Ok(generator.generate_complete_model(num_interfaces, num_components))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use assert_matches::assert_matches;

    #[test]
    fn test_invalid_config_rejected_before_generation() {
        let config = GeneratorConfig {
            min_calls: 5,
            max_calls: 1,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            generate_complete_model(3, 2, &config, Some(1)),
            Err(GenerateError::Config(ConfigError::InvertedRange { key: "calls", .. }))
        );
    }

    #[test]
    fn test_oversized_double_range_rejected_before_generation() {
        let config = GeneratorConfig {
            double_param_min: -1e308,
            double_param_max: 1e308,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            generate_complete_model(8, 8, &config, Some(1)),
            Err(GenerateError::Config(ConfigError::TooLarge { key: "doubleParamMin", .. }))
        );
    }

    #[test]
    fn test_same_seed_same_model() {
        let config = GeneratorConfig::default();
        let a = generate_complete_model(5, 4, &config, Some(99)).unwrap();
        let b = generate_complete_model(5, 4, &config, Some(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let config = GeneratorConfig::default();
        let a = generate_complete_model(5, 4, &config, Some(1)).unwrap();
        let b = generate_complete_model(5, 4, &config, Some(2)).unwrap();
        assert_ne!(a.repository.name, b.repository.name);
    }

    #[test]
    fn test_custom_environment_is_moved_into_model() {
        let generator = ModelGenerator::new(GeneratorConfig::default(), RandomSource::seeded(3))
            .unwrap()
            .with_environment(ResourceEnvironment::with_containers(3));
        assert_eq!(generator.environment().containers.len(), 3);
        let model = generator.generate_complete_model(4, 6);
        assert_eq!(model.environment.containers.len(), 3);
        assert!(model.allocation.groups.len() <= 3);
    }
}
