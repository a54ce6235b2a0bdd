use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use shipyard_generate::{GenerationError, MutateOptions, PopulateOptions, RuleRegistry, RuleSpec};
use shipyard_store::validate_snapshot_name;

/// Contents of `shipyard.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipyardConfig {
    /// Directory of the source CSV store.
    pub store_dir: PathBuf,
    /// Sibling directory name used for the mutated snapshot.
    pub snapshot_name: String,
    /// Root directory for run artifacts.
    pub run_dir: PathBuf,
    /// Fixed seed; a random one is drawn and logged when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub populate: PopulateOptions,
    #[serde(flatten)]
    pub mutate: MutateOptions,
    /// Extra rules appended after the stock table.
    pub rules: Vec<RuleSpec>,
}

impl Default for ShipyardConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("data/source"),
            snapshot_name: "snapshot".to_string(),
            run_dir: PathBuf::from("runs"),
            seed: None,
            populate: PopulateOptions::default(),
            mutate: MutateOptions::default(),
            rules: Vec::new(),
        }
    }
}

impl ShipyardConfig {
    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("base_probability", self.mutate.base_probability),
            ("ship_probability", self.mutate.ship_probability),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if self.mutate.base_divisor == 0 || self.mutate.ship_divisor == 0 {
            return Err(ConfigError::Invalid(
                "sampling divisors must be positive".to_string(),
            ));
        }
        validate_snapshot_name(&self.snapshot_name)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.store_dir.file_name() == Some(OsStr::new(&self.snapshot_name)) {
            return Err(ConfigError::Invalid(
                "snapshot_name must differ from the store directory name".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory the snapshot of `store_dir` lives in.
    pub fn snapshot_dir(&self) -> PathBuf {
        match self.store_dir.parent() {
            Some(parent) => parent.join(&self.snapshot_name),
            None => PathBuf::from(&self.snapshot_name),
        }
    }

    /// Stock rules followed by the configured ones.
    pub fn build_registry(&self) -> Result<RuleRegistry, GenerationError> {
        let mut registry = RuleRegistry::with_defaults();
        for spec in &self.rules {
            registry.add_spec(spec)?;
        }
        Ok(registry)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
