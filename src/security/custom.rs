//! Custom pattern loading.
//!
//! Validates caller-supplied patterns. Invalid entries are reported and
//! skipped; they never abort detection.

use crate::models::CustomPattern;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Upper bound on compiled regex size for caller-supplied patterns.
const CUSTOM_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// A custom pattern that compiled successfully.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Pattern name.
    pub name: String,
    /// Compiled regex.
    pub regex: Regex,
    /// Replacement used by the `replace` strategy.
    pub replacement: Option<String>,
    /// Confidence override.
    pub confidence: Option<f64>,
}

/// A custom pattern that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedPattern {
    /// Pattern name as supplied.
    pub name: String,
    /// Why the pattern was rejected.
    pub reason: String,
}

/// Outcome of loading custom patterns.
#[derive(Debug, Clone, Default)]
pub struct LoadedPatterns {
    /// Patterns usable for detection.
    pub valid: Vec<CompiledPattern>,
    /// Patterns excluded from detection.
    pub rejected: Vec<RejectedPattern>,
}

impl LoadedPatterns {
    /// Returns true if every pattern loaded.
    #[must_use]
    pub const fn all_valid(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Compiles and validates custom patterns.
#[must_use]
pub fn load(patterns: &[CustomPattern]) -> LoadedPatterns {
    let mut loaded = LoadedPatterns::default();

    for pattern in patterns {
        match compile(pattern) {
            Ok(compiled) => loaded.valid.push(compiled),
            Err(reason) => {
                tracing::warn!(
                    pattern_name = %pattern.name,
                    reason = %reason,
                    "Skipping invalid custom pattern"
                );
                metrics::counter!("piiscrub_rejected_patterns_total").increment(1);
                loaded.rejected.push(RejectedPattern {
                    name: pattern.name.clone(),
                    reason,
                });
            },
        }
    }

    loaded
}

fn compile(pattern: &CustomPattern) -> Result<CompiledPattern, String> {
    if pattern.name.trim().is_empty() {
        return Err("pattern name is empty".to_string());
    }
    if pattern.pattern.is_empty() {
        return Err("pattern is empty".to_string());
    }
    if let Some(confidence) = pattern.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(format!("confidence {confidence} is outside [0, 1]"));
        }
    }

    let regex = RegexBuilder::new(&pattern.pattern)
        .size_limit(CUSTOM_REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| format!("invalid regex: {e}"))?;

    if regex.is_match("") {
        return Err("pattern matches the empty string".to_string());
    }

    Ok(CompiledPattern {
        name: pattern.name.clone(),
        regex,
        replacement: pattern.replacement.clone(),
        confidence: pattern.confidence,
    })
}
