//! Multi-model batch generation.
//!
//! Every run is independent: it derives its own seeds from the batch seed and
//! its index, draws its own shape, builds a private [`ModelGenerator`] and
//! writes its own files. Runs execute on the blocking pool, bounded by a
//! semaphore of `jobs` permits, and may finish in any order.

use crate::config::GeneratorConfig;
use crate::fixtures::ResourceEnvironment;
use crate::generator::ModelGenerator;
use crate::integrity::ModelIntegrityChecker;
use crate::model::ModelStats;
use crate::persist::{IntegritySummary, OutputFormat, RunMetadata, writer_for};
use crate::random::{RandomSource, derive_run_seed};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Mixed into a run seed to seed the run's shape draws.
const SHAPE_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed of the shape draws of the run seeded with `run_seed`.
///
/// Never equal to the model seed of any other run in the same batch.
fn shape_seed(run_seed: u64) -> u64 {
    run_seed ^ SHAPE_SEED_MIX
}

/// Upper limits from which each run draws its shape.
///
/// The optional limits fall back to the corresponding value of the base
/// [`GeneratorConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeLimits {
    pub max_interfaces: usize,
    pub max_components: usize,
    pub max_containers: usize,
    pub max_params: Option<usize>,
    pub min_sigs: Option<usize>,
    pub max_sigs: Option<usize>,
    pub min_provided: Option<usize>,
    pub min_required: Option<usize>,
}

impl ShapeLimits {
    pub fn draw(&self, base: &GeneratorConfig, rng: &mut RandomSource) -> RunShape {
        let interfaces = if self.max_interfaces <= 1 {
            1
        } else {
            rng.between(5.min(self.max_interfaces), self.max_interfaces)
        };
        let components = if self.max_components <= 1 {
            1
        } else {
            rng.between(2.min(self.max_components), self.max_components)
        };
        let containers = if self.max_containers == 0 {
            0
        } else {
            rng.between(1, self.max_containers)
        };

        let max_parameters = rng.between(
            1,
            self.max_params.unwrap_or(base.max_parameters_per_signature),
        );
        let min_signatures = rng.between(
            1,
            self.min_sigs.unwrap_or(base.min_signatures_per_interface),
        );
        let max_signatures = rng.between(
            min_signatures,
            self.max_sigs
                .unwrap_or(base.max_signatures_per_interface)
                .max(min_signatures),
        );
        let min_provided = rng.between(
            1,
            self.min_provided
                .unwrap_or(base.min_provided_interfaces_per_component),
        );
        let min_required = rng.between(
            1,
            self.min_required
                .unwrap_or(base.min_required_interfaces_per_component),
        );

        RunShape {
            interfaces,
            components,
            containers,
            max_parameters,
            min_signatures,
            max_signatures,
            min_provided,
            min_required,
        }
    }
}

/// Sizes and per-run overrides drawn for one model of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunShape {
    pub interfaces: usize,
    pub components: usize,
    pub containers: usize,
    pub max_parameters: usize,
    pub min_signatures: usize,
    pub max_signatures: usize,
    pub min_provided: usize,
    pub min_required: usize,
}

impl RunShape {
    /// The base configuration with this run's overrides applied.
    pub fn apply(&self, base: &GeneratorConfig) -> GeneratorConfig {
        GeneratorConfig {
            max_parameters_per_signature: self.max_parameters,
            min_signatures_per_interface: self.min_signatures,
            max_signatures_per_interface: self.max_signatures,
            min_provided_interfaces_per_component: self.min_provided,
            min_required_interfaces_per_component: self.min_required,
            ..base.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub models: usize,
    pub jobs: usize,
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub format: OutputFormat,
    pub verify: bool,
    pub limits: ShapeLimits,
}

impl BatchConfig {
    /// Name of run `run_index`; suffixed with the index only when there are several runs.
    fn model_name(&self, run_index: usize) -> String {
        if self.models == 1 {
            self.output_name.clone()
        } else {
            format!("{}_{}", self.output_name, run_index)
        }
    }

    fn model_path(&self, run_index: usize, format: OutputFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.model_name(run_index), format.extension()))
    }
}

/// Result of one successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run_index: usize,
    pub seed: u64,
    pub model_file: PathBuf,
    pub metadata_file: PathBuf,
    pub stats: ModelStats,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<RunOutcome>,
    pub failed: usize,
}

/// Generates, verifies (when asked) and persists one model of a batch.
pub fn run_single(base: &GeneratorConfig, batch: &BatchConfig, run_index: usize) -> Result<RunOutcome> {
    let (mut shape_rng, run_rng) = match batch.seed {
        Some(seed) => {
            let run_seed = derive_run_seed(seed, run_index as u64);
            (
                RandomSource::seeded(shape_seed(run_seed)),
                RandomSource::seeded(run_seed),
            )
        }
        None => (RandomSource::from_entropy(), RandomSource::from_entropy()),
    };
    let seed = run_rng.seed();

    let span = tracing::info_span!("generate_model", seed, run_index);
    let _guard = span.enter();

    let shape = batch.limits.draw(base, &mut shape_rng);
    let config = shape.apply(base);
    tracing::debug!(?shape, "run shape drawn");

    let started = Instant::now();
    let generator = ModelGenerator::new(config.clone(), run_rng)
        .context("run configuration rejected")?
        .with_environment(ResourceEnvironment::with_containers(shape.containers));
    let model = generator.generate_complete_model(shape.interfaces, shape.components);

    let integrity = if batch.verify {
        let report = ModelIntegrityChecker::new(&config).check(&model);
        if !report.is_valid() {
            return Err(anyhow!("generated model failed integrity check:\n{report}"));
        }
        Some(IntegritySummary {
            errors: report.error_count(),
            warnings: report.warning_count(),
        })
    } else {
        None
    };

    let writer = writer_for(batch.format);
    let model_file = batch.model_path(run_index, writer.format());
    let sha256 = writer
        .write(&model, &model_file)
        .with_context(|| format!("failed to persist model {}", model_file.display()))?;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let stats = model.stats();
    let metadata = RunMetadata {
        model_name: batch.model_name(run_index),
        model_file: model_file.clone(),
        format: writer.format(),
        seed,
        run_index,
        shape,
        stats,
        sha256,
        generated_at: chrono::Utc::now().to_rfc3339(),
        duration_ms,
        integrity,
    };
    let metadata_file = metadata
        .write()
        .context("failed to write run metadata")?;

    tracing::info!(
        file = %model_file.display(),
        interfaces = stats.interfaces,
        components = stats.components,
        connectors = stats.connectors,
        allocation_groups = stats.allocation_groups,
        entry_calls = stats.entry_calls,
        duration_ms,
        "model written"
    );

    Ok(RunOutcome {
        run_index,
        seed,
        model_file,
        metadata_file,
        stats,
    })
}

/// Runs every model of the batch with at most `jobs` generating at once.
///
/// Failed runs are logged and counted; the batch fails if any run failed.
pub async fn run_batch(base: GeneratorConfig, batch: BatchConfig) -> Result<BatchSummary> {
    base.validate().context("generator configuration is invalid")?;

    let base = Arc::new(base);
    let batch = Arc::new(batch);
    let permits = Arc::new(Semaphore::new(batch.jobs.max(1)));
    tracing::info!(
        models = batch.models,
        jobs = batch.jobs,
        seed = ?batch.seed,
        output_dir = %batch.output_dir.display(),
        "starting batch"
    );

    let mut handles = Vec::with_capacity(batch.models);
    for run_index in 0..batch.models {
        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .context("batch semaphore closed")?;
        let handle = tokio::task::spawn_blocking({
            let base = base.clone();
            let batch = batch.clone();
            move || {
                let _permit = permit;
                run_single(&base, &batch, run_index)
            }
        });
        handles.push((run_index, handle));
    }

    let mut summary = BatchSummary::default();
    for (run_index, handle) in handles {
        match handle.await {
            Ok(Ok(outcome)) => summary.succeeded.push(outcome),
            Ok(Err(error)) => {
                tracing::error!(run_index, error = %format!("{error:#}"), "model generation failed");
                summary.failed += 1;
            }
            Err(join_error) => {
                tracing::error!(run_index, error = %join_error, "generation task panicked");
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        succeeded = summary.succeeded.len(),
        failed = summary.failed,
        "batch finished"
    );
    if summary.failed > 0 {
        return Err(anyhow!(
            "{} of {} models failed",
            summary.failed,
            batch.models
        ));
    }
    Ok(summary)
}
