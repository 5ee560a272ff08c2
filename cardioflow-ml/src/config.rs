//! Configuration for the pipeline stages and the risk form.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace `cardioflow.toml` -> environment -> explicit overrides.
//! Artifact keys are fixed constants in [`crate::store::keys`] and are not part
//! of the configuration surface.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Name of the workspace-level configuration file.
pub const CONFIG_FILE_NAME: &str = "cardioflow.toml";

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub serving: ServingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dataset layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Name of the binary label column.
    #[serde(default = "default_label_column")]
    pub label_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            label_column: default_label_column(),
        }
    }
}

fn default_label_column() -> String {
    "target".to_string()
}

/// What the validator does with a report that is not clean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Report findings and always succeed.
    #[default]
    Advisory,
    /// Fail the stage on any missing/extra column or null value.
    Strict,
}

impl std::fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advisory => write!(f, "advisory"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub policy: ValidationPolicy,
}

/// Handling of zero-variance feature columns during standardization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantColumnPolicy {
    /// Every value becomes 0.0.
    #[default]
    Zero,
    /// Leave the raw values in place.
    Passthrough,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub constant_columns: ConstantColumnPolicy,
}

/// Train/test partitioning shared by training and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Logistic regression hyperparameters for the trainer stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_l2_penalty")]
    pub l2_penalty: f64,
    /// Probability at or above which a row is labelled positive.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            l2_penalty: default_l2_penalty(),
            threshold: default_threshold(),
        }
    }
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_epochs() -> usize {
    500
}

fn default_l2_penalty() -> f64 {
    0.01
}

fn default_threshold() -> f64 {
    0.5
}

/// Risk form server binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the rolling JSON log, relative to the workspace.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub json_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            json_file: true,
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_true() -> bool {
    true
}

impl PipelineConfig {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            return Err(PipelineError::Config(format!(
                "split.test_fraction must be in (0, 1), got {}",
                self.split.test_fraction
            )));
        }
        if self.data.label_column.trim().is_empty() {
            return Err(PipelineError::Config(
                "data.label_column must not be empty".to_string(),
            ));
        }
        if self.training.learning_rate <= 0.0 {
            return Err(PipelineError::Config(
                "training.learning_rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Command-line values layered over every other source.
///
/// Only fields that are set are merged; unset fields leave the file and
/// environment values in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigOverrides {
    pub validation: ValidationOverrides,
    pub serving: ServingOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<ValidationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `CARDIOFLOW_`, nested with `__`)
/// 3. An explicit config file, or the workspace `cardioflow.toml`
/// 4. User config (`~/.config/cardioflow/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> Result<PipelineConfig, PipelineError> {
    let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));

    if let Some(dirs) = directories::ProjectDirs::from("dev", "cardioflow", "cardioflow") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    match (config_file, workspace) {
        (Some(path), _) => {
            if !path.exists() {
                return Err(PipelineError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        (None, Some(ws)) => {
            let ws_config = ws.join(CONFIG_FILE_NAME);
            if ws_config.exists() {
                figment = figment.merge(Toml::file(&ws_config));
            }
        }
        (None, None) => {}
    }

    figment = figment.merge(Env::prefixed("CARDIOFLOW_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: PipelineConfig = figment
        .extract()
        .map_err(|e| PipelineError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
