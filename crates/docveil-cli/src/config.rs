use anyhow::{Context, bail};
use docveil_core::RedactionFill;
use docveil_pii::{CategoryRegistry, CommitPolicy, PIICategory, RedactorConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocveilConfig {
    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub redaction: RedactionSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Categories the detector scans for
    #[serde(default = "default_categories")]
    pub categories: Vec<PIICategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionSettings {
    #[serde(default)]
    pub commit_policy: CommitPolicy,

    /// RGB fill drawn over redacted regions
    #[serde(default = "default_fill")]
    pub fill: [u8; 3],

    /// Prefix for the default output file name
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
        }
    }
}

impl Default for RedactionSettings {
    fn default() -> Self {
        Self {
            commit_policy: CommitPolicy::default(),
            fill: default_fill(),
            output_prefix: default_output_prefix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl DocveilConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        };

        Ok(config)
    }

    /// Config file picked up when `--config` is not given
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".docveil").join("config.yaml"))
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    pub fn merge_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("DOCVEIL_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Some(val) = lookup("DOCVEIL_LOG_FORMAT") {
            match val.to_lowercase().as_str() {
                "text" => self.logging.format = LogFormat::Text,
                "json" => self.logging.format = LogFormat::Json,
                _ => eprintln!("Warning: Invalid DOCVEIL_LOG_FORMAT '{}', using default", val),
            }
        }

        if let Some(val) = lookup("DOCVEIL_COMMIT_POLICY") {
            match val.to_lowercase().replace('-', "_").as_str() {
                "per_value" => self.redaction.commit_policy = CommitPolicy::PerValue,
                "per_page" => self.redaction.commit_policy = CommitPolicy::PerPage,
                _ => eprintln!(
                    "Warning: Invalid DOCVEIL_COMMIT_POLICY '{}', using default",
                    val
                ),
            }
        }

        if let Some(val) = lookup("DOCVEIL_OUTPUT_PREFIX") {
            self.redaction.output_prefix = val;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.detection.categories.is_empty() {
            bail!("detection.categories must name at least one category");
        }
        if self.redaction.output_prefix.is_empty() {
            bail!("redaction.output_prefix must not be empty");
        }
        if self.redaction.output_prefix.contains(['/', '\\']) {
            bail!("redaction.output_prefix must not contain path separators");
        }
        Ok(())
    }

    pub fn registry(&self) -> anyhow::Result<CategoryRegistry> {
        CategoryRegistry::with_categories(&self.detection.categories)
            .context("Failed to compile category patterns")
    }

    pub fn redactor_config(&self) -> RedactorConfig {
        RedactorConfig {
            commit_policy: self.redaction.commit_policy,
            fill: RedactionFill::from(self.redaction.fill),
        }
    }

    /// `<dir>/<prefix><file name>` next to the input
    pub fn default_output_for(&self, input: &Path) -> PathBuf {
        let file_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let redacted = format!("{}{}", self.redaction.output_prefix, file_name);

        match input.parent() {
            Some(parent) => parent.join(redacted),
            None => PathBuf::from(redacted),
        }
    }
}

fn default_categories() -> Vec<PIICategory> {
    PIICategory::ALL.to_vec()
}

fn default_fill() -> [u8; 3] {
    [0, 0, 0]
}

fn default_output_prefix() -> String {
    "redacted_".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
