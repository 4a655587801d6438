//! Detection policy.

use super::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Default confidence for custom patterns that do not override it.
pub const DEFAULT_CUSTOM_CONFIDENCE: f64 = 0.9;

/// Sensitivity level.
///
/// Controls the minimum confidence a detection needs to survive, and the
/// defaults for the `partial` and `fuzzy` strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// Most permissive threshold.
    Low,
    /// Balanced default.
    #[default]
    Medium,
    /// Higher threshold.
    High,
    /// Highest threshold.
    Strict,
}

impl Sensitivity {
    /// Returns all levels from least to most strict.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Strict]
    }

    /// Returns the level as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Strict => "strict",
        }
    }

    /// Minimum confidence a detection needs at this level.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        match self {
            Self::Low => 0.5,
            Self::Medium => 0.6,
            Self::High => 0.7,
            Self::Strict => 0.8,
        }
    }

    /// Characters kept at each end by the `partial` strategy.
    #[must_use]
    pub const fn partial_preserve(&self) -> usize {
        match self {
            Self::Strict => 1,
            Self::High => 2,
            Self::Low | Self::Medium => 3,
        }
    }

    /// Default fuzziness for the `fuzzy` strategy.
    #[must_use]
    pub const fn default_fuzziness(&self) -> f64 {
        match self {
            Self::Low => 0.6,
            Self::Medium => 0.4,
            Self::High => 0.2,
            Self::Strict => 0.1,
        }
    }

    /// Parses a sensitivity level.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sensitivity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| crate::Error::InvalidConfig(format!("unknown sensitivity level '{s}'")))
    }
}

/// A caller-supplied detection pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    /// Name reported in detections and rejections.
    pub name: String,
    /// Regular expression source.
    pub pattern: String,
    /// Replacement used by the `replace` strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// Confidence override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl CustomPattern {
    /// Creates a custom pattern.
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            replacement: None,
            confidence: None,
        }
    }

    /// Sets the replacement text.
    #[must_use]
    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    /// Sets the confidence override.
    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Detection policy for one invocation.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Enabled builtin categories.
    pub categories: BTreeSet<Category>,
    /// Sensitivity level.
    pub sensitivity: Sensitivity,
    /// Terms that exempt a detection containing them (case-insensitive).
    pub whitelist: Vec<String>,
    /// Drop detections overlapping known domain vocabulary.
    pub preserve_domain_terms: bool,
    /// Caller-supplied patterns.
    pub custom_patterns: Vec<CustomPattern>,
    /// Confidence for custom patterns without an override.
    pub custom_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            categories: Category::all().iter().copied().collect(),
            sensitivity: Sensitivity::default(),
            whitelist: Vec::new(),
            preserve_domain_terms: false,
            custom_patterns: Vec::new(),
            custom_confidence: DEFAULT_CUSTOM_CONFIDENCE,
        }
    }
}

impl DetectionConfig {
    /// Creates a config with all categories enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config enabling only the given categories.
    #[must_use]
    pub fn for_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a config from category names.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if any name is not a known category.
    pub fn from_category_names<S: AsRef<str>>(names: &[S]) -> crate::Result<Self> {
        let categories = names
            .iter()
            .map(|name| name.as_ref().parse::<Category>())
            .collect::<crate::Result<BTreeSet<_>>>()?;
        Ok(Self {
            categories,
            ..Self::default()
        })
    }

    /// Sets the sensitivity level.
    #[must_use]
    pub const fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Sets the whitelist.
    #[must_use]
    pub fn with_whitelist<S: Into<String>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.whitelist = terms.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables domain-term preservation.
    #[must_use]
    pub const fn with_preserve_domain_terms(mut self, preserve: bool) -> Self {
        self.preserve_domain_terms = preserve;
        self
    }

    /// Adds a custom pattern.
    #[must_use]
    pub fn with_custom_pattern(mut self, pattern: CustomPattern) -> Self {
        self.custom_patterns.push(pattern);
        self
    }

    /// Sets the default custom-pattern confidence.
    #[must_use]
    pub const fn with_custom_confidence(mut self, confidence: f64) -> Self {
        self.custom_confidence = confidence;
        self
    }

    /// Checks that the default custom-pattern confidence is within `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if it is out of range or NaN.
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.custom_confidence) {
            return Err(crate::Error::InvalidConfig(format!(
                "custom_confidence must be within [0, 1], got {}",
                self.custom_confidence
            )));
        }
        Ok(())
    }

    /// Returns true if the category is enabled.
    #[must_use]
    pub fn is_enabled(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Lower-cased, non-empty whitelist terms.
    #[must_use]
    pub fn normalized_whitelist(&self) -> Vec<String> {
        self.whitelist
            .iter()
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect()
    }
}
