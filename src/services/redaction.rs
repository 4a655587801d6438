//! Redaction service.
//!
//! Orchestrates detection, overlap resolution, and rewriting for one call.

use crate::models::{
    Category, CustomPattern, Detection, DetectionConfig, RedactionContext, RedactionRecord,
    RedactionResult, RedactionStrategy, Sensitivity,
};
use crate::security::{
    PatternLibrary, PiiDetector, RedactionEngine, RejectedPattern, custom, resolve,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Strategy parameters supplied alongside a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyParams {
    /// Mask character; must be exactly one character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_char: Option<String>,
    /// Characters kept at each end by `partial`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_chars: Option<usize>,
    /// Fraction masked by `fuzzy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<f64>,
    /// Literal replacement for `replace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_text: Option<String>,
}

/// A detect-and-redact request with string-typed policy fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionRequest {
    /// Text to scan.
    pub text: String,
    /// Category names; all builtin categories when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Sensitivity level name.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: String,
    /// Drop detections overlapping domain vocabulary.
    #[serde(default)]
    pub preserve_domain_terms: bool,
    /// Caller-supplied patterns.
    #[serde(default)]
    pub custom_patterns: Vec<CustomPattern>,
    /// Terms that exempt a detection.
    #[serde(default)]
    pub whitelist: Vec<String>,
    /// Strategy identifier.
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Strategy parameters.
    #[serde(default)]
    pub strategy_params: StrategyParams,
    /// Caller metadata carried into logs.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

fn default_sensitivity() -> String {
    Sensitivity::default().as_str().to_string()
}

fn default_strategy() -> String {
    RedactionStrategy::default().as_str().to_string()
}

impl RedactionRequest {
    /// Creates a request with default policy for `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            categories: None,
            sensitivity: default_sensitivity(),
            preserve_domain_terms: false,
            custom_patterns: Vec::new(),
            whitelist: Vec::new(),
            strategy: default_strategy(),
            strategy_params: StrategyParams::default(),
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the category names.
    #[must_use]
    pub fn with_categories<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.categories = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the sensitivity level name.
    #[must_use]
    pub fn with_sensitivity(mut self, sensitivity: impl Into<String>) -> Self {
        self.sensitivity = sensitivity.into();
        self
    }

    /// Sets the strategy identifier.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = strategy.into();
        self
    }

    /// Sets the strategy parameters.
    #[must_use]
    pub fn with_strategy_params(mut self, params: StrategyParams) -> Self {
        self.strategy_params = params;
        self
    }

    /// Sets the whitelist.
    #[must_use]
    pub fn with_whitelist<S: Into<String>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.whitelist = terms.into_iter().map(Into::into).collect();
        self
    }

    /// Enables domain-term preservation.
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

    /// Validates the request and builds the typed policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for unknown categories, sensitivity
    /// levels, or strategies, and for out-of-range strategy parameters.
    pub fn to_policy(&self) -> Result<(DetectionConfig, RedactionContext)> {
        let sensitivity: Sensitivity = self.sensitivity.parse()?;
        let strategy: RedactionStrategy = self.strategy.parse()?;

        let detection = match self.categories {
            Some(ref names) => DetectionConfig::from_category_names(names)?,
            None => DetectionConfig::new(),
        }
        .with_sensitivity(sensitivity)
        .with_whitelist(self.whitelist.iter().cloned())
        .with_preserve_domain_terms(self.preserve_domain_terms);
        let detection = DetectionConfig {
            custom_patterns: self.custom_patterns.clone(),
            ..detection
        };

        let mut context = RedactionContext::new(strategy, sensitivity);
        let params = &self.strategy_params;
        if let Some(ref mask) = params.mask_char {
            context = context.with_mask_char(parse_mask_char(mask)?);
        }
        if let Some(count) = params.preserve_chars {
            context = context.with_preserve_chars(count);
        }
        if let Some(fuzziness) = params.fuzziness {
            context = context.with_fuzziness(fuzziness);
        }
        if let Some(ref text) = params.replacement_text {
            context = context.with_replacement_text(text.clone());
        }
        context.metadata.clone_from(&self.metadata);
        context.validate()?;

        Ok((detection, context))
    }
}

/// Parses a mask character parameter.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] unless `value` is exactly one character.
pub fn parse_mask_char(value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::InvalidConfig(format!(
            "mask character must be exactly one character, got '{value}'"
        ))),
    }
}

/// Response for a detect-and-redact request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionResponse {
    /// Rewritten text.
    pub redacted_text: String,
    /// Applied rewrites, ascending by start offset.
    pub redactions: Vec<RedactionRecord>,
    /// Detections that survived filtering, before overlap resolution.
    pub detections_found: usize,
    /// Number of rewrites applied.
    pub redactions_applied: usize,
    /// Rewrites per category.
    pub category_counts: BTreeMap<Category, usize>,
    /// Custom patterns that failed validation.
    pub rejected_patterns: Vec<RejectedPattern>,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct RedactionOutcome {
    /// Redaction result.
    pub result: RedactionResult,
    /// Custom patterns that failed validation.
    pub rejected: Vec<RejectedPattern>,
}

impl From<RedactionOutcome> for RedactionResponse {
    fn from(outcome: RedactionOutcome) -> Self {
        let category_counts = outcome.result.category_counts();
        Self {
            redacted_text: outcome.result.redacted_text,
            redactions: outcome.result.records,
            detections_found: outcome.result.detections_found,
            redactions_applied: outcome.result.redactions_applied,
            category_counts,
            rejected_patterns: outcome.rejected,
        }
    }
}

/// Detect-and-redact pipeline.
///
/// Holds no per-call state; the pattern library is shared read-only.
#[derive(Debug, Clone, Default)]
pub struct RedactionService {
    detector: PiiDetector,
    engine: RedactionEngine,
}

impl RedactionService {
    /// Creates a service over the shared builtin library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service over a specific library.
    #[must_use]
    pub const fn with_library(library: Arc<PatternLibrary>) -> Self {
        Self {
            detector: PiiDetector::with_library(library),
            engine: RedactionEngine::new(),
        }
    }

    /// The detector in use.
    #[must_use]
    pub const fn detector(&self) -> &PiiDetector {
        &self.detector
    }

    /// Validates a string-typed request and runs the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the request policy is invalid and
    /// [`Error::OperationFailed`] on internal failure. No partial output is
    /// returned on error.
    pub fn detect_and_redact(&self, request: &RedactionRequest) -> Result<RedactionResponse> {
        let (config, context) = request.to_policy()?;
        self.run(&request.text, &config, &context).map(Into::into)
    }

    /// Runs the pipeline with a typed policy.
    ///
    /// # Errors
    ///
    /// See [`Self::detect_and_redact`].
    pub fn process(
        &self,
        text: &str,
        config: &DetectionConfig,
        context: &RedactionContext,
    ) -> Result<RedactionResult> {
        self.run(text, config, context).map(|outcome| outcome.result)
    }

    /// Runs the pipeline and also reports rejected custom patterns.
    ///
    /// # Errors
    ///
    /// See [`Self::detect_and_redact`].
    pub fn run(
        &self,
        text: &str,
        config: &DetectionConfig,
        context: &RedactionContext,
    ) -> Result<RedactionOutcome> {
        let started = Instant::now();
        config.validate()?;
        context.validate()?;

        let loaded = custom::load(&config.custom_patterns);
        if text.is_empty() {
            return Ok(RedactionOutcome {
                result: RedactionResult::unchanged(text),
                rejected: loaded.rejected,
            });
        }

        let detections = self.detector.detect_with(text, config, &loaded.valid);
        let detections_found = detections.len();
        for detection in &detections {
            metrics::counter!(
                "piiscrub_detections_total",
                "category" => detection.category().as_str()
            )
            .increment(1);
        }

        let resolved = resolve(detections);
        let result = self
            .engine
            .redact(text, &resolved, context)?
            .with_detections_found(detections_found);

        tracing::info!(
            detections_found,
            redactions_applied = result.redactions_applied,
            rejected_patterns = loaded.rejected.len(),
            strategy = %context.strategy,
            metadata = ?context.metadata,
            elapsed = ?started.elapsed(),
            "Redaction complete"
        );

        Ok(RedactionOutcome {
            result,
            rejected: loaded.rejected,
        })
    }

    /// Detects and resolves PII without rewriting.
    #[must_use]
    pub fn detect(&self, text: &str, config: &DetectionConfig) -> Vec<Detection> {
        resolve(self.detector.detect(text, config))
    }
}
