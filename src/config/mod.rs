//! Configuration management.
//!
//! Settings are read from a TOML file, then overridden by `PIISCRUB_*`
//! environment variables, then by command-line flags.

use crate::models::{
    Category, CustomPattern, DEFAULT_CUSTOM_CONFIDENCE, DetectionConfig, RedactionContext,
    RedactionStrategy, Sensitivity,
};
use crate::services::parse_mask_char;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the redaction strategy.
pub const ENV_STRATEGY: &str = "PIISCRUB_STRATEGY";
/// Environment variable overriding the sensitivity level.
pub const ENV_SENSITIVITY: &str = "PIISCRUB_SENSITIVITY";
/// Environment variable overriding the log format.
pub const ENV_LOG_FORMAT: &str = "PIISCRUB_LOG_FORMAT";

/// Main configuration for piiscrub.
#[derive(Debug, Clone, Default)]
pub struct PiiscrubConfig {
    /// Detection policy.
    pub detection: DetectionConfig,
    /// Redaction settings.
    pub redaction: RedactionSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Redaction settings; unset values fall back to sensitivity defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedactionSettings {
    /// Strategy.
    pub strategy: RedactionStrategy,
    /// Mask character.
    pub mask_char: Option<char>,
    /// Characters kept at each end by `partial`.
    pub preserve_chars: Option<usize>,
    /// Fraction masked by `fuzzy`.
    pub fuzziness: Option<f64>,
    /// Literal replacement for `replace`.
    pub replacement_text: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format (`pretty` or `json`).
    pub format: Option<String>,
    /// Filter directive such as `info` or `piiscrub=debug`.
    pub level: Option<String>,
    /// Log file path; stderr when unset.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Detection section.
    pub detection: Option<ConfigFileDetection>,
    /// Redaction section.
    pub redaction: Option<ConfigFileRedaction>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Detection section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileDetection {
    /// Category names.
    pub categories: Option<Vec<String>>,
    /// Sensitivity level name.
    pub sensitivity: Option<String>,
    /// Whitelist terms.
    pub whitelist: Option<Vec<String>>,
    /// Domain-term preservation.
    pub preserve_domain_terms: Option<bool>,
    /// Default custom-pattern confidence.
    pub custom_confidence: Option<f64>,
    /// Custom patterns.
    #[serde(default)]
    pub custom_patterns: Vec<CustomPattern>,
}

/// Redaction section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileRedaction {
    /// Strategy identifier.
    pub strategy: Option<String>,
    /// Mask character.
    pub mask_char: Option<String>,
    /// Characters kept at each end by `partial`.
    pub preserve_chars: Option<usize>,
    /// Fraction masked by `fuzzy`.
    pub fuzziness: Option<f64>,
    /// Literal replacement for `replace`.
    pub replacement_text: Option<String>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Output format.
    pub format: Option<String>,
    /// Filter directive.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl PiiscrubConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be read or parsed
    /// and [`Error::InvalidConfig`] if it names unknown categories, levels,
    /// or strategies.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// See [`Self::load_from_file`].
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Default config file location (`<config dir>/piiscrub/config.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("piiscrub").join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// A missing file yields the defaults; a present but broken file is an
    /// error.
    ///
    /// # Errors
    ///
    /// See [`Self::load_from_file`].
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Applies `PIISCRUB_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if an override holds an unknown value.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if an override holds an unknown value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(strategy) = lookup(ENV_STRATEGY) {
            self.redaction.strategy = strategy.parse()?;
        }
        if let Some(sensitivity) = lookup(ENV_SENSITIVITY) {
            self.detection.sensitivity = sensitivity.parse()?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = Some(format);
        }
        Ok(())
    }

    /// Builds the redaction context for the configured strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if fuzziness is out of range.
    pub fn to_redaction_context(&self) -> Result<RedactionContext> {
        let settings = &self.redaction;
        let mut context = RedactionContext::new(settings.strategy, self.detection.sensitivity);
        if let Some(mask_char) = settings.mask_char {
            context = context.with_mask_char(mask_char);
        }
        if let Some(count) = settings.preserve_chars {
            context = context.with_preserve_chars(count);
        }
        if let Some(fuzziness) = settings.fuzziness {
            context = context.with_fuzziness(fuzziness);
        }
        if let Some(ref text) = settings.replacement_text {
            context = context.with_replacement_text(text.clone());
        }
        context.validate()?;
        Ok(context)
    }

    /// Converts a `ConfigFile` to `PiiscrubConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(detection) = file.detection {
            if let Some(names) = detection.categories {
                config.detection.categories = names
                    .iter()
                    .map(|name| name.parse::<Category>())
                    .collect::<Result<_>>()?;
            }
            if let Some(sensitivity) = detection.sensitivity {
                config.detection.sensitivity = sensitivity.parse::<Sensitivity>()?;
            }
            if let Some(whitelist) = detection.whitelist {
                config.detection.whitelist = whitelist;
            }
            if let Some(v) = detection.preserve_domain_terms {
                config.detection.preserve_domain_terms = v;
            }
            config.detection.custom_confidence = detection
                .custom_confidence
                .unwrap_or(DEFAULT_CUSTOM_CONFIDENCE);
            config.detection.custom_patterns = detection.custom_patterns;
            config.detection.validate()?;
        }

        if let Some(redaction) = file.redaction {
            if let Some(strategy) = redaction.strategy {
                config.redaction.strategy = strategy.parse()?;
            }
            if let Some(mask) = redaction.mask_char {
                config.redaction.mask_char = Some(parse_mask_char(&mask)?);
            }
            config.redaction.preserve_chars = redaction.preserve_chars;
            config.redaction.fuzziness = redaction.fuzziness;
            config.redaction.replacement_text = redaction.replacement_text;
        }

        if let Some(logging) = file.logging {
            config.logging = LoggingSettings {
                format: logging.format,
                level: logging.level,
                file: logging.file.map(PathBuf::from),
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = PiiscrubConfig::from_toml("").unwrap();
        assert_eq!(config.detection.categories.len(), Category::all().len());
        assert_eq!(config.detection.sensitivity, Sensitivity::Medium);
        assert_eq!(config.redaction.strategy, RedactionStrategy::Replace);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_full_file() {
        let toml = r##"
            [detection]
            categories = ["email", "creditCard", "audio_domain"]
            sensitivity = "strict"
            whitelist = ["support@example.com"]
            preserve_domain_terms = true

            [[detection.custom_patterns]]
            name = "employee_id"
            pattern = 'EMP-\d{6}'
            replacement = "[EMPLOYEE]"

            [redaction]
            strategy = "partial"
            mask_char = "#"
            preserve_chars = 3

            [logging]
            format = "json"
            level = "debug"
            file = "/tmp/piiscrub.log"
        "##;

        let config = PiiscrubConfig::from_toml(toml).unwrap();
        assert_eq!(config.detection.categories.len(), 3);
        assert!(config.detection.is_enabled(Category::AudioDomain));
        assert_eq!(config.detection.sensitivity, Sensitivity::Strict);
        assert!(config.detection.preserve_domain_terms);
        assert_eq!(config.detection.custom_patterns.len(), 1);
        assert_eq!(
            config.detection.custom_patterns[0].replacement.as_deref(),
            Some("[EMPLOYEE]")
        );
        assert_eq!(config.logging.format.as_deref(), Some("json"));

        let context = config.to_redaction_context().unwrap();
        assert_eq!(context.strategy, RedactionStrategy::Partial);
        assert_eq!(context.mask_char, '#');
        assert_eq!(context.preserve_start, 3);
        assert_eq!(context.preserve_end, 3);
    }

    #[test]
    fn test_unknown_category_in_file() {
        let toml = "[detection]\ncategories = [\"shoe_size\"]\n";
        assert!(matches!(
            PiiscrubConfig::from_toml(toml),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let toml = "[redaction]\nstratgy = \"mask\"\n";
        assert!(matches!(
            PiiscrubConfig::from_toml(toml),
            Err(Error::OperationFailed { .. })
        ));
    }

    #[test]
    fn test_out_of_range_fuzziness() {
        let config = PiiscrubConfig::from_toml("[redaction]\nfuzziness = 1.5\n").unwrap();
        assert!(config.to_redaction_context().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [(ENV_STRATEGY, "hash"), (ENV_SENSITIVITY, "low")]
            .into_iter()
            .collect();
        let mut config = PiiscrubConfig::new();
        config
            .apply_overrides(|key| vars.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.redaction.strategy, RedactionStrategy::Hash);
        assert_eq!(config.detection.sensitivity, Sensitivity::Low);
        assert!(config.logging.format.is_none());
    }

    #[test]
    fn test_bad_override() {
        let mut config = PiiscrubConfig::new();
        let result = config.apply_overrides(|key| (key == ENV_STRATEGY).then(|| "shred".into()));
        assert!(result.is_err());
    }

    #[test]
    fn test_sensitivity_drives_context_defaults() {
        let mut config = PiiscrubConfig::new();
        config.detection.sensitivity = Sensitivity::Strict;
        config.redaction.strategy = RedactionStrategy::Fuzzy;
        let context = config.to_redaction_context().unwrap();
        assert!((context.fuzziness - Sensitivity::Strict.default_fuzziness()).abs() < f64::EPSILON);
    }
}
