use archgen::{CliArgs, ConfigError, GeneratorConfig, OutputFormat, RunSettings, load_config_file};
use assert_matches::assert_matches;
use clap::Parser;
use std::fs;
use tempfile::TempDir;

#[test]
fn loads_yaml_with_camel_case_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("generator.yaml");
    fs::write(
        &path,
        "maxParametersPerSignature: 2\nminSignaturesPerInterface: 3\nmaxSignaturesPerInterface: 4\nattachHddRole: false\n",
    )
    .unwrap();

    let config = load_config_file(&path).unwrap();
    assert_eq!(config.max_parameters_per_signature, 2);
    assert_eq!(config.min_signatures_per_interface, 3);
    assert_eq!(config.max_signatures_per_interface, 4);
    assert!(!config.attach_hdd_role);
    assert_eq!(config.max_user_count, GeneratorConfig::default().max_user_count);
}

#[test]
fn loads_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("generator.json");
    fs::write(&path, r#"{"thinkTimeMin": 1.0, "thinkTimeMax": 2.0}"#).unwrap();

    let config = load_config_file(&path).unwrap();
    assert_eq!(config.think_time_min, 1.0);
    assert_eq!(config.think_time_max, 2.0);
}

#[test]
fn rejects_unknown_keys_and_extensions() {
    let dir = TempDir::new().unwrap();
    let typo = dir.path().join("typo.yaml");
    fs::write(&typo, "maxCall: 4\n").unwrap();
    assert_matches!(load_config_file(&typo), Err(ConfigError::Load { .. }));

    let toml = dir.path().join("generator.toml");
    fs::write(&toml, "maxCalls = 4\n").unwrap();
    assert_matches!(load_config_file(&toml), Err(ConfigError::Load { reason, .. }) if reason.contains("toml"));

    let missing = dir.path().join("missing.yaml");
    assert_matches!(load_config_file(&missing), Err(ConfigError::Load { .. }));
}

#[test]
fn cli_resolves_config_file_and_flags() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("generator.yaml");
    fs::write(&path, "minCalls: 2\nmaxCalls: 3\n").unwrap();

    let args = CliArgs::parse_from([
        "archgen",
        "--config",
        path.to_str().unwrap(),
        "--output",
        "bench",
        "--output-dir",
        dir.path().to_str().unwrap(),
        "--format",
        "yaml",
        "--max-params",
        "4",
        "-i",
        "9",
        "--verify",
    ]);
    let settings = RunSettings::from_args(args).unwrap();
    settings.validate().unwrap();

    assert_eq!(settings.generator.min_calls, 2);
    assert_eq!(settings.generator.max_calls, 3);
    assert_eq!(settings.batch.output_name, "bench");
    assert_eq!(settings.batch.format, OutputFormat::Yaml);
    assert_eq!(settings.batch.limits.max_params, Some(4));
    assert_eq!(settings.batch.limits.max_interfaces, 9);
    assert!(settings.batch.verify);
}

#[test]
fn inverted_file_config_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("generator.yml");
    fs::write(&path, "intParamMin: 10\nintParamMax: 1\n").unwrap();

    let args = CliArgs::parse_from(["archgen", "--config", path.to_str().unwrap()]);
    let settings = RunSettings::from_args(args).unwrap();
    let err = settings.validate().unwrap_err();
    assert!(format!("{err:#}").contains("intParam"));
}
