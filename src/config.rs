//! Runtime configuration from environment variables

use std::path::{Path, PathBuf};
use tracing::Level;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_MODEL_DIR: &str = "models";

const BASE_STATS_FILE: &str = "base_stats.csv";
const TYPE_ADVANTAGE_FILE: &str = "type_advantage.csv";
const LABEL_ENCODERS_FILE: &str = "label_encoders.json";
const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
const ONNX_MODEL_FILE: &str = "pokemon_battle_model.onnx";
const FOREST_MODEL_FILE: &str = "pokemon_battle_model.json";

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub model_dir: PathBuf,
    pub log_level: Level,
}

impl AppConfig {
    /// Read `HOST`, `PORT`, `DATA_DIR`, `MODEL_DIR` and `LOG_LEVEL`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset or unparsable values use defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            model_dir: lookup("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR)),
            log_level: lookup("LOG_LEVEL")
                .and_then(|l| l.parse().ok())
                .unwrap_or(Level::INFO),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn artifacts(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.data_dir, &self.model_dir)
    }
}

/// Locations of the reference tables and model artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub base_stats: PathBuf,
    pub type_advantage: PathBuf,
    pub label_encoders: PathBuf,
    pub feature_columns: PathBuf,
    pub model: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names under the data and model directories.
    ///
    /// The ONNX model is used when present, otherwise the JSON forest dump.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(data_dir: P, model_dir: Q) -> Self {
        let data_dir = data_dir.as_ref();
        let model_dir = model_dir.as_ref();

        let onnx = model_dir.join(ONNX_MODEL_FILE);
        let model = if onnx.exists() {
            onnx
        } else {
            model_dir.join(FOREST_MODEL_FILE)
        };

        Self {
            base_stats: data_dir.join(BASE_STATS_FILE),
            type_advantage: data_dir.join(TYPE_ADVANTAGE_FILE),
            label_encoders: model_dir.join(LABEL_ENCODERS_FILE),
            feature_columns: model_dir.join(FEATURE_COLUMNS_FILE),
            model,
        }
    }
}
