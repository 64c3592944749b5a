//! Seeded random generator of component-based software architecture models.
//!
//! One run turns a validated [`GeneratorConfig`] and a [`RandomSource`] into a
//! complete [`Model`]: a repository of interfaces and components, a system
//! wiring one assembly per component, an allocation of assemblies to
//! containers and a usage model calling the system's entry points.

pub mod batch;
pub mod config;
pub mod error;
pub mod factory;
pub mod fixtures;
pub mod generator;
pub mod integrity;
pub mod literal;
pub mod logging;
pub mod model;
pub mod persist;
pub mod random;
pub mod sampling;

pub use batch::{BatchConfig, BatchSummary, RunOutcome, RunShape, ShapeLimits, run_batch, run_single};
pub use config::{CliArgs, GeneratorConfig, RunSettings, load_config_file};
pub use error::{ConfigError, GenerateError, PersistError};
pub use factory::{DirectFactory, EntityFactory};
pub use fixtures::{ResourceEnvironment, StandardDefinitions};
pub use generator::{ModelGenerator, generate_complete_model};
pub use integrity::{IntegrityReport, ModelIntegrityChecker, Severity, Violation};
pub use logging::{LoggingConfig, init_logging};
pub use model::{Model, ModelStats};
pub use persist::{JsonModelWriter, ModelWriter, OutputFormat, YamlModelWriter, writer_for};
pub use random::RandomSource;

/// JSON schema of the persisted [`Model`] document.
pub fn model_schema() -> anyhow::Result<String> {
    let schema = schemars::schema_for!(Model);
    Ok(serde_json::to_string_pretty(&schema)?)
}
