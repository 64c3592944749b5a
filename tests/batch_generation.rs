use archgen::persist::{RunMetadata, compute_digest, load_model};
use archgen::{BatchConfig, GeneratorConfig, OutputFormat, ShapeLimits, run_batch, run_single};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn batch(dir: &Path, models: usize, jobs: usize, format: OutputFormat) -> BatchConfig {
    BatchConfig {
        models,
        jobs,
        seed: Some(500),
        output_dir: dir.to_path_buf(),
        output_name: "generated".to_string(),
        format,
        verify: true,
        limits: ShapeLimits {
            max_interfaces: 6,
            max_components: 5,
            max_containers: 3,
            ..ShapeLimits::default()
        },
    }
}

#[tokio::test]
async fn batch_writes_every_model_with_metadata() {
    let dir = TempDir::new().unwrap();
    let summary = run_batch(
        GeneratorConfig::default(),
        batch(dir.path(), 4, 2, OutputFormat::Json),
    )
    .await
    .unwrap();

    assert_eq!(summary.failed, 0);
    assert_eq!(summary.succeeded.len(), 4);
    for outcome in &summary.succeeded {
        assert_eq!(outcome.seed, 500 + outcome.run_index as u64);
        let file_name = outcome.model_file.file_name().unwrap().to_string_lossy();
        assert_eq!(file_name, format!("generated_{}.json", outcome.run_index));

        let written = fs::read_to_string(&outcome.model_file).unwrap();
        let metadata: RunMetadata =
            serde_json::from_str(&fs::read_to_string(&outcome.metadata_file).unwrap()).unwrap();
        assert_eq!(metadata.sha256, compute_digest(&written));
        assert_eq!(metadata.model_name, format!("generated_{}", outcome.run_index));
        assert_eq!(metadata.format, OutputFormat::Json);
        assert_eq!(metadata.seed, outcome.seed);
        assert_eq!(metadata.stats, outcome.stats);
        assert_eq!(metadata.integrity.map(|i| i.errors), Some(0));
        assert!(chrono::DateTime::parse_from_rfc3339(&metadata.generated_at).is_ok());

        let model = load_model(&outcome.model_file).unwrap();
        assert_eq!(model.repository.interfaces.len(), metadata.shape.interfaces);
        assert_eq!(model.repository.components.len(), metadata.shape.components);
        assert_eq!(model.environment.containers.len(), metadata.shape.containers);
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let base = GeneratorConfig::default();

    let a = run_single(&base, &batch(first.path(), 3, 1, OutputFormat::Yaml), 1).unwrap();
    let b = run_single(&base, &batch(second.path(), 3, 1, OutputFormat::Yaml), 1).unwrap();

    assert_eq!(a.stats, b.stats);
    assert_eq!(
        fs::read_to_string(&a.model_file).unwrap(),
        fs::read_to_string(&b.model_file).unwrap()
    );
}

#[tokio::test]
async fn single_model_uses_plain_name() {
    let dir = TempDir::new().unwrap();
    let summary = run_batch(
        GeneratorConfig::default(),
        batch(dir.path(), 1, 4, OutputFormat::Yaml),
    )
    .await
    .unwrap();
    assert_eq!(summary.succeeded.len(), 1);
    assert!(dir.path().join("generated.yaml").exists());
    let metadata: RunMetadata = serde_json::from_str(
        &fs::read_to_string(dir.path().join("generated.metadata.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(metadata.model_name, "generated");
    assert_eq!(metadata.format, OutputFormat::Yaml);
}

#[tokio::test]
async fn invalid_base_config_fails_before_any_run() {
    let dir = TempDir::new().unwrap();
    let config = GeneratorConfig {
        min_exposed_interfaces: 4,
        max_exposed_interfaces: 2,
        ..GeneratorConfig::default()
    };
    let result = run_batch(config, batch(dir.path(), 2, 1, OutputFormat::Json)).await;
    assert!(result.is_err());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
