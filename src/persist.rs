//! Persistence of generated models.
//!
//! A [`ModelWriter`] renders a [`Model`] into one text format and writes it
//! atomically (temp file in the target directory, then rename). Every
//! persisted model gets a `<name>.metadata.json` sidecar carrying its seed,
//! shape, element counts and the SHA-256 digest of the written document.

use crate::batch::RunShape;
use crate::error::PersistError;
use crate::model::{Model, ModelStats};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Persistence collaborator receiving finished models.
pub trait ModelWriter: Send + Sync {
    fn format(&self) -> OutputFormat;

    fn render(&self, model: &Model) -> Result<String, PersistError>;

    /// Writes the rendered model to `path` and returns the SHA-256 digest of what was written.
    fn write(&self, model: &Model, path: &Path) -> Result<String, PersistError> {
        let content = self.render(model)?;
        atomic_write(path, &content)?;
        Ok(compute_digest(&content))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelWriter;

impl ModelWriter for JsonModelWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn render(&self, model: &Model) -> Result<String, PersistError> {
        serde_json::to_string_pretty(model).map_err(|e| PersistError::Serialize {
            what: "model",
            format: "json",
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlModelWriter;

impl ModelWriter for YamlModelWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Yaml
    }

    fn render(&self, model: &Model) -> Result<String, PersistError> {
        serde_yaml::to_string(model).map_err(|e| PersistError::Serialize {
            what: "model",
            format: "yaml",
            reason: e.to_string(),
        })
    }
}

pub fn writer_for(format: OutputFormat) -> Box<dyn ModelWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonModelWriter),
        OutputFormat::Yaml => Box::new(YamlModelWriter),
    }
}

/// Reads a persisted model back, choosing the format from the file extension.
pub fn load_model(path: &Path) -> Result<Model, PersistError> {
    let parse_error = |reason: String| PersistError::Deserialize {
        path: path.to_path_buf(),
        reason,
    };
    let format = OutputFormat::from_path(path)
        .ok_or_else(|| parse_error("unrecognized model file extension".to_string()))?;
    let content = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
    match format {
        OutputFormat::Json => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        OutputFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Compute SHA-256 hash of string
pub fn compute_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn atomic_write(path: &Path, content: &str) -> Result<(), PersistError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| PersistError::io(parent, e))?;
    temp_file
        .write_all(content.as_bytes())
        .and_then(|()| temp_file.flush())
        .map_err(|e| PersistError::io(path, e))?;
    temp_file
        .persist(path)
        .map_err(|e| PersistError::io(path, e.error))?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegritySummary {
    pub errors: usize,
    pub warnings: usize,
}

/// Sidecar record written next to each persisted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub model_name: String,
    pub model_file: PathBuf,
    pub format: OutputFormat,
    pub seed: u64,
    pub run_index: usize,
    pub shape: RunShape,
    pub stats: ModelStats,
    pub sha256: String,
    /// RFC 3339 timestamp of when the model was written.
    pub generated_at: String,
    pub duration_ms: u64,
    pub integrity: Option<IntegritySummary>,
}

impl RunMetadata {
    pub fn path_for(model_file: &Path) -> PathBuf {
        let stem = model_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        model_file.with_file_name(format!("{stem}.metadata.json"))
    }

    pub fn write(&self) -> Result<PathBuf, PersistError> {
        let path = Self::path_for(&self.model_file);
        let content = serde_json::to_string_pretty(self).map_err(|e| PersistError::Serialize {
            what: "metadata",
            format: "json",
            reason: e.to_string(),
        })?;
        atomic_write(&path, &content)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::generate_complete_model;
    use tempfile::TempDir;

    fn model() -> Model {
        generate_complete_model(4, 3, &GeneratorConfig::default(), Some(77)).unwrap()
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        assert_eq!(
            compute_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_json_write_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let model = model();
        let digest = JsonModelWriter.write(&model, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(digest, compute_digest(&written));
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.repository, model.repository);
        assert_eq!(loaded.system, model.system);
        assert_eq!(loaded.allocation, model.allocation);
    }

    #[test]
    fn test_yaml_writer_renders_same_model() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.yaml");
        let model = model();
        writer_for(OutputFormat::Yaml).write(&model, &path).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.stats(), model.stats());
        assert_eq!(loaded.repository.name, model.repository.name);
    }

    #[test]
    fn test_writer_reports_its_format() {
        for format in [OutputFormat::Json, OutputFormat::Yaml] {
            assert_eq!(writer_for(format).format(), format);
        }
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.xml");
        fs::write(&path, "<model/>").unwrap();
        assert!(matches!(load_model(&path), Err(PersistError::Deserialize { .. })));
    }

    #[test]
    fn test_metadata_path_sits_next_to_model() {
        let path = RunMetadata::path_for(Path::new("out/generated_3.yaml"));
        assert_eq!(path, PathBuf::from("out/generated_3.metadata.json"));
        assert_eq!(OutputFormat::Yaml.to_string(), "yaml");
    }
}
