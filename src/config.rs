use crate::batch::{BatchConfig, ShapeLimits};
use crate::error::ConfigError;
use crate::persist::OutputFormat;
use anyhow::{Context, Result};
use clap::Parser;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_NAME: &str = "generated";
const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Numeric bounds steering one generation run.
///
/// Field names serialize to the camelCase configuration keys
/// (`maxParametersPerSignature`, `intParamMin`, ...). Unknown keys are
/// rejected when a configuration file is loaded, and [`GeneratorConfig::validate`]
/// rejects inverted or infeasible bounds before any generation starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct GeneratorConfig {
    pub max_parameters_per_signature: usize,
    pub min_signatures_per_interface: usize,
    pub max_signatures_per_interface: usize,
    pub min_provided_interfaces_per_component: usize,
    pub min_required_interfaces_per_component: usize,
    pub min_exposed_interfaces: usize,
    pub max_exposed_interfaces: usize,
    pub min_allocation_groups: usize,
    pub max_user_count: u32,
    pub min_calls: usize,
    pub max_calls: usize,
    pub int_param_min: i64,
    pub int_param_max: i64,
    pub string_param_min_length: usize,
    pub string_param_max_length: usize,
    pub double_param_min: f64,
    pub double_param_max: f64,
    pub arrival_rate_min: f64,
    pub arrival_rate_max: f64,
    pub think_time_min: f64,
    pub think_time_max: f64,
    /// Attach the HDD-like infrastructure role to every component.
    ///
    /// On by default, so components carry two infrastructure roles (`cpu` and
    /// `hdd`); turn it off for a single `cpu` role.
    pub attach_hdd_role: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_parameters_per_signature: 5,
            min_signatures_per_interface: 1,
            max_signatures_per_interface: 10,
            min_provided_interfaces_per_component: 1,
            min_required_interfaces_per_component: 1,
            min_exposed_interfaces: 1,
            max_exposed_interfaces: 10,
            min_allocation_groups: 1,
            max_user_count: 20,
            min_calls: 1,
            max_calls: 9,
            int_param_min: 0,
            int_param_max: 100,
            string_param_min_length: 5,
            string_param_max_length: 150,
            double_param_min: 0.0,
            double_param_max: 100.0,
            arrival_rate_min: 0.01,
            arrival_rate_max: 0.9,
            think_time_min: 0.5,
            think_time_max: 50.0,
            attach_hdd_role: true,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ordered(
            "signaturesPerInterface",
            self.min_signatures_per_interface,
            self.max_signatures_per_interface,
        )?;
        at_least(
            "minSignaturesPerInterface",
            1,
            self.min_signatures_per_interface,
        )?;
        ordered(
            "exposedInterfaces",
            self.min_exposed_interfaces,
            self.max_exposed_interfaces,
        )?;
        at_least("maxExposedInterfaces", 1, self.max_exposed_interfaces)?;
        at_least("minAllocationGroups", 1, self.min_allocation_groups)?;
        at_least("maxUserCount", 1, self.max_user_count)?;
        ordered("calls", self.min_calls, self.max_calls)?;
        ordered("intParam", self.int_param_min, self.int_param_max)?;
        ordered(
            "stringParamLength",
            self.string_param_min_length,
            self.string_param_max_length,
        )?;

        finite("doubleParamMin", self.double_param_min)?;
        finite("doubleParamMax", self.double_param_max)?;
        centable("doubleParamMin", self.double_param_min)?;
        centable("doubleParamMax", self.double_param_max)?;
        ordered("doubleParam", self.double_param_min, self.double_param_max)?;

        for (key, value) in [
            ("arrivalRateMin", self.arrival_rate_min),
            ("arrivalRateMax", self.arrival_rate_max),
            ("thinkTimeMin", self.think_time_min),
            ("thinkTimeMax", self.think_time_max),
        ] {
            finite(key, value)?;
            at_least(key, 0.0, value)?;
        }
        ordered("arrivalRate", self.arrival_rate_min, self.arrival_rate_max)?;
        samplable("arrivalRate", self.arrival_rate_min, self.arrival_rate_max)?;
        ordered("thinkTime", self.think_time_min, self.think_time_max)?;
        samplable("thinkTime", self.think_time_min, self.think_time_max)?;
        Ok(())
    }
}

fn ordered<T: PartialOrd + ToString>(key: &'static str, min: T, max: T) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::inverted(key, min, max));
    }
    Ok(())
}

fn at_least<T: PartialOrd + ToString>(
    key: &'static str,
    minimum: T,
    actual: T,
) -> Result<(), ConfigError> {
    if actual < minimum {
        return Err(ConfigError::below(key, minimum, actual));
    }
    Ok(())
}

fn finite(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { key });
    }
    Ok(())
}

/// Parameter doubles are rounded to cents, so `value * 100` must stay finite.
/// Bounds passing this check also leave `max - min` samplable.
fn centable(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.abs() * 100.0).is_finite() {
        return Err(ConfigError::TooLarge {
            key,
            actual: value.to_string(),
        });
    }
    Ok(())
}

/// Uniform float sampling scales `max - min` by `1 / (1 - EPSILON)`; that span must stay finite.
fn samplable(key: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if !((max - min) / (1.0 - f64::EPSILON)).is_finite() {
        return Err(ConfigError::RangeTooWide {
            key,
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Loads a generator configuration from a YAML or JSON file.
pub fn load_config_file(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let load_error = |reason: String| ConfigError::Load {
        path: path.display().to_string(),
        reason,
    };
    let contents = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| load_error(e.to_string())),
        "json" => serde_json::from_str(&contents).map_err(|e| load_error(e.to_string())),
        other => Err(load_error(format!("unsupported config extension: {other}"))),
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "archgen",
    about = "Random component-based architecture model generator",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        env = "ARCHGEN_CONFIG",
        value_name = "FILE",
        help = "Generator configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        short = 'o',
        value_name = "NAME",
        help = "Base name of the output files (without extension)"
    )]
    pub output: Option<String>,

    #[arg(
        long,
        env = "ARCHGEN_OUTPUT_DIR",
        value_name = "DIR",
        help = "Directory receiving generated models"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(long, short = 's', help = "Random seed for reproducible generation")]
    pub seed: Option<u64>,

    #[arg(
        long,
        short = 'i',
        default_value_t = 5,
        help = "Max number of interfaces per model"
    )]
    pub interfaces: usize,

    #[arg(
        long,
        short = 'c',
        default_value_t = 10,
        help = "Max number of components per model"
    )]
    pub components: usize,

    #[arg(
        long,
        short = 'r',
        default_value_t = 3,
        help = "Max number of resource containers per model"
    )]
    pub containers: usize,

    #[arg(long, value_name = "N", help = "Max parameters per signature")]
    pub max_params: Option<usize>,

    #[arg(long, value_name = "N", help = "Min signatures per interface")]
    pub min_sigs: Option<usize>,

    #[arg(long, value_name = "N", help = "Max signatures per interface")]
    pub max_sigs: Option<usize>,

    #[arg(long, value_name = "N", help = "Min provided interfaces per component")]
    pub min_provided: Option<usize>,

    #[arg(long, value_name = "N", help = "Min required interfaces per component")]
    pub min_required: Option<usize>,

    #[arg(long, short = 'm', default_value_t = 1, help = "Number of models to generate")]
    pub models: usize,

    #[arg(
        long,
        short = 'j',
        env = "ARCHGEN_JOBS",
        help = "Number of models generated concurrently (default: available cores)"
    )]
    pub jobs: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, help = "Check every generated model for integrity violations")]
    pub verify: bool,

    #[arg(long, help = "Print the JSON schema of the model format and exit")]
    pub print_schema: bool,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub generator: GeneratorConfig,
    pub batch: BatchConfig,
}

impl RunSettings {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            output,
            output_dir,
            seed,
            interfaces,
            components,
            containers,
            max_params,
            min_sigs,
            max_sigs,
            min_provided,
            min_required,
            models,
            jobs,
            format,
            verify,
            print_schema: _,
        } = args;

        let generator = match config.as_deref() {
            Some(path) => load_config_file(path)
                .with_context(|| format!("failed to load generator config {:?}", path))?,
            None => GeneratorConfig::default(),
        };

        anyhow::ensure!(models > 0, "at least one model must be requested");

        let jobs = jobs
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(1)
            .clamp(1, models);

        let batch = BatchConfig {
            models,
            jobs,
            seed,
            output_dir: output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            output_name: output.unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string()),
            format,
            verify,
            limits: ShapeLimits {
                max_interfaces: interfaces,
                max_components: components,
                max_containers: containers,
                max_params,
                min_sigs,
                max_sigs,
                min_provided,
                min_required,
            },
        };

        Ok(Self { generator, batch })
    }

    /// Fail-fast check before the first run is scheduled.
    pub fn validate(&self) -> Result<()> {
        self.generator
            .validate()
            .context("generator configuration is invalid")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_signature_range_rejected() {
        let config = GeneratorConfig {
            min_signatures_per_interface: 4,
            max_signatures_per_interface: 2,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { key: "signaturesPerInterface", .. })
        );
    }

    #[test]
    fn test_zero_max_exposed_rejected() {
        let config = GeneratorConfig {
            min_exposed_interfaces: 0,
            max_exposed_interfaces: 0,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::BelowMinimum { key: "maxExposedInterfaces", .. })
        );
    }

    #[test]
    fn test_non_finite_double_rejected() {
        let config = GeneratorConfig {
            double_param_max: f64::INFINITY,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::NotFinite { key: "doubleParamMax" })
        );
    }

    #[test]
    fn test_double_range_beyond_cent_rounding_rejected() {
        let config = GeneratorConfig {
            double_param_min: -1e308,
            double_param_max: 1e308,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::TooLarge { key: "doubleParamMin", .. })
        );
    }

    #[test]
    fn test_double_bound_too_large_to_round_rejected() {
        let config = GeneratorConfig {
            double_param_min: 0.0,
            double_param_max: 1.7e308,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::TooLarge { key: "doubleParamMax", .. })
        );
    }

    #[test]
    fn test_workload_range_too_wide_rejected() {
        let config = GeneratorConfig {
            think_time_min: 0.0,
            think_time_max: f64::MAX,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::RangeTooWide { key: "thinkTime", .. })
        );
    }

    #[test]
    fn test_negative_think_time_rejected() {
        let config = GeneratorConfig {
            think_time_min: -1.0,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::BelowMinimum { key: "thinkTimeMin", .. })
        );
    }

    #[test]
    fn test_camel_case_keys_and_defaults() {
        let json = r#"{"maxParametersPerSignature": 2, "intParamMax": 7}"#;
        let config: GeneratorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_parameters_per_signature, 2);
        assert_eq!(config.int_param_max, 7);
        assert_eq!(config.max_calls, GeneratorConfig::default().max_calls);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let json = r#"{"maxParametersPerSignatur": 2}"#;
        assert!(serde_json::from_str::<GeneratorConfig>(json).is_err());
    }

    #[test]
    fn test_cli_defaults_resolve() {
        let args = CliArgs::parse_from(["archgen", "--seed", "9", "-m", "3", "-j", "8"]);
        let settings = RunSettings::from_args(args).unwrap();
        assert_eq!(settings.batch.seed, Some(9));
        assert_eq!(settings.batch.models, 3);
        assert_eq!(settings.batch.jobs, 3);
        assert_eq!(settings.batch.limits.max_interfaces, 5);
        assert_eq!(settings.batch.output_name, "generated");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_models_rejected() {
        let args = CliArgs::parse_from(["archgen", "--models", "0"]);
        assert!(RunSettings::from_args(args).is_err());
    }
}
