//! PII detection.
//!
//! Applies the pattern library and custom patterns to text, then gates the
//! raw matches by sensitivity, whitelist, and domain vocabulary.

use super::custom::{self, CompiledPattern};
use super::patterns::{BuiltinPattern, PatternLibrary};
use crate::models::{Category, Detection, DetectionConfig, DetectionSource};
use std::sync::Arc;

/// Detector for personally identifiable information.
///
/// Holds only a shared reference to the immutable pattern library, so one
/// detector can serve any number of threads.
#[derive(Debug, Clone)]
pub struct PiiDetector {
    library: Arc<PatternLibrary>,
}

impl PiiDetector {
    /// Creates a detector over the shared builtin library.
    #[must_use]
    pub fn new() -> Self {
        Self {
            library: PatternLibrary::shared(),
        }
    }

    /// Creates a detector over a specific library.
    #[must_use]
    pub const fn with_library(library: Arc<PatternLibrary>) -> Self {
        Self { library }
    }

    /// The pattern library in use.
    #[must_use]
    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Detects PII using the config's custom patterns as well as builtins.
    ///
    /// Invalid custom patterns are logged and skipped.
    #[must_use]
    pub fn detect(&self, text: &str, config: &DetectionConfig) -> Vec<Detection> {
        let loaded = custom::load(&config.custom_patterns);
        self.detect_with(text, config, &loaded.valid)
    }

    /// Detects PII using pre-compiled custom patterns.
    ///
    /// Returns detections ordered by start offset. Overlaps are left for the
    /// resolver.
    #[must_use]
    pub fn detect_with(
        &self,
        text: &str,
        config: &DetectionConfig,
        custom_patterns: &[CompiledPattern],
    ) -> Vec<Detection> {
        if text.is_empty() {
            return Vec::new();
        }

        let raw = self.scan(text, config, custom_patterns);
        let raw_count = raw.len();

        let threshold = config.sensitivity.threshold();
        let gated: Vec<Detection> = raw
            .into_iter()
            .filter(|d| d.confidence() >= threshold)
            .collect();
        let gated_count = gated.len();

        let whitelist = config.normalized_whitelist();
        let allowed: Vec<Detection> = gated
            .into_iter()
            .filter(|d| !is_whitelisted(d.matched_text(), &whitelist))
            .collect();
        let allowed_count = allowed.len();

        let mut detections = if config.preserve_domain_terms {
            let domain_spans = self.library.domain_term_spans(text);
            allowed
                .into_iter()
                .filter(|d| !domain_spans.iter().any(|&(s, e)| d.overlaps_range(s, e)))
                .collect()
        } else {
            allowed
        };

        detections.sort_by_key(|d| (d.start(), d.end()));

        tracing::debug!(
            raw = raw_count,
            below_threshold = raw_count - gated_count,
            whitelisted = gated_count - allowed_count,
            domain_preserved = allowed_count - detections.len(),
            kept = detections.len(),
            sensitivity = %config.sensitivity,
            "PII detection complete"
        );

        detections
    }

    /// Runs every enabled matcher without any filtering.
    #[must_use]
    pub fn scan(
        &self,
        text: &str,
        config: &DetectionConfig,
        custom_patterns: &[CompiledPattern],
    ) -> Vec<Detection> {
        let mut found = Vec::new();

        for pattern in self.library.patterns() {
            if config.is_enabled(pattern.category) {
                collect_builtin_matches(pattern, text, &mut found);
            }
        }

        for pattern in custom_patterns {
            collect_custom_matches(pattern, config.custom_confidence, text, &mut found);
        }

        found
    }

    /// Checks if text contains PII under the given policy.
    #[must_use]
    pub fn contains_pii(&self, text: &str, config: &DetectionConfig) -> bool {
        !self.detect(text, config).is_empty()
    }

    /// Returns the distinct categories detected, in priority order.
    #[must_use]
    pub fn detect_types(&self, text: &str, config: &DetectionConfig) -> Vec<Category> {
        let mut types: Vec<Category> = self
            .detect(text, config)
            .iter()
            .map(Detection::category)
            .collect();
        types.sort_unstable();
        types.dedup();
        types
    }

    /// Returns the count of detections before overlap resolution.
    #[must_use]
    pub fn count(&self, text: &str, config: &DetectionConfig) -> usize {
        self.detect(text, config).len()
    }
}

impl Default for PiiDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects matches for a single builtin pattern into the result vector.
fn collect_builtin_matches(pattern: &BuiltinPattern, text: &str, found: &mut Vec<Detection>) {
    let source = DetectionSource::Builtin {
        pattern: pattern.name,
    };

    match pattern.group {
        None => {
            for m in pattern.regex().find_iter(text) {
                let matched = m.as_str();
                found.extend(Detection::new(
                    m.start(),
                    m.end(),
                    pattern.category,
                    matched,
                    pattern.confidence_for(matched),
                    source.clone(),
                ));
            }
        },
        Some(group) => {
            for caps in pattern.regex().captures_iter(text) {
                let Some(m) = caps.get(group) else {
                    continue;
                };
                let matched = m.as_str();
                found.extend(Detection::new(
                    m.start(),
                    m.end(),
                    pattern.category,
                    matched,
                    pattern.confidence_for(matched),
                    source.clone(),
                ));
            }
        },
    }
}

/// Collects matches for a single custom pattern into the result vector.
fn collect_custom_matches(
    pattern: &CompiledPattern,
    default_confidence: f64,
    text: &str,
    found: &mut Vec<Detection>,
) {
    let confidence = pattern.confidence.unwrap_or(default_confidence);
    for m in pattern.regex.find_iter(text) {
        found.extend(Detection::new(
            m.start(),
            m.end(),
            Category::Custom,
            m.as_str(),
            confidence,
            DetectionSource::Custom {
                name: pattern.name.clone(),
                replacement: pattern.replacement.clone(),
            },
        ));
    }
}

/// Returns true if the matched text contains any whitelist term.
///
/// `whitelist` must already be lower-cased.
fn is_whitelisted(matched: &str, whitelist: &[String]) -> bool {
    if whitelist.is_empty() {
        return false;
    }
    let lowered = matched.to_lowercase();
    whitelist.iter().any(|term| lowered.contains(term.as_str()))
}
