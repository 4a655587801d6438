//! Redaction strategy, context, and results.

use super::{Category, Sensitivity};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default mask character.
pub const DEFAULT_MASK_CHAR: char = '*';

/// How a detected span is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionStrategy {
    /// Category placeholder such as `[EMAIL]`.
    #[default]
    Replace,
    /// Truncated SHA-256 digest of the matched text.
    Hash,
    /// Every character replaced by the mask character.
    Mask,
    /// Leading and trailing characters kept, middle masked.
    Partial,
    /// Length-revealing token such as `[TOKEN_8CHARS]`.
    Tokenize,
    /// A fraction of characters masked at evenly spaced positions.
    Fuzzy,
    /// Span deleted.
    Remove,
}

impl RedactionStrategy {
    /// Returns all strategies.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Replace,
            Self::Hash,
            Self::Mask,
            Self::Partial,
            Self::Tokenize,
            Self::Fuzzy,
            Self::Remove,
        ]
    }

    /// Returns the strategy as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Hash => "hash",
            Self::Mask => "mask",
            Self::Partial => "partial",
            Self::Tokenize => "tokenize",
            Self::Fuzzy => "fuzzy",
            Self::Remove => "remove",
        }
    }

    /// Returns true if the strategy keeps the span's character count.
    #[must_use]
    pub const fn preserves_length(&self) -> bool {
        matches!(self, Self::Mask | Self::Partial | Self::Fuzzy)
    }

    /// Parses a strategy identifier.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Some(Self::Replace),
            "hash" => Some(Self::Hash),
            "mask" => Some(Self::Mask),
            "partial" => Some(Self::Partial),
            "tokenize" => Some(Self::Tokenize),
            "fuzzy" => Some(Self::Fuzzy),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }
}

impl fmt::Display for RedactionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RedactionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::InvalidConfig(format!("unsupported strategy '{s}'")))
    }
}

/// Rewrite policy for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionContext {
    /// Active strategy.
    pub strategy: RedactionStrategy,
    /// Character used by `mask`, `partial`, and `fuzzy`.
    pub mask_char: char,
    /// Characters kept at the start by `partial`.
    pub preserve_start: usize,
    /// Characters kept at the end by `partial`.
    pub preserve_end: usize,
    /// Fraction of characters masked by `fuzzy`.
    pub fuzziness: f64,
    /// Literal replacement for `replace`, overriding category placeholders.
    pub replacement_text: Option<String>,
    /// Caller metadata carried into logs.
    pub metadata: BTreeMap<String, String>,
}

impl Default for RedactionContext {
    fn default() -> Self {
        Self::new(RedactionStrategy::default(), Sensitivity::default())
    }
}

impl RedactionContext {
    /// Creates a context with strategy defaults derived from `sensitivity`.
    #[must_use]
    pub fn new(strategy: RedactionStrategy, sensitivity: Sensitivity) -> Self {
        let preserve = sensitivity.partial_preserve();
        Self {
            strategy,
            mask_char: DEFAULT_MASK_CHAR,
            preserve_start: preserve,
            preserve_end: preserve,
            fuzziness: sensitivity.default_fuzziness(),
            replacement_text: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the mask character.
    #[must_use]
    pub const fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    /// Keeps `count` characters at both ends for `partial`.
    #[must_use]
    pub const fn with_preserve_chars(mut self, count: usize) -> Self {
        self.preserve_start = count;
        self.preserve_end = count;
        self
    }

    /// Sets independent start/end preserve counts for `partial`.
    #[must_use]
    pub const fn with_preserve(mut self, start: usize, end: usize) -> Self {
        self.preserve_start = start;
        self.preserve_end = end;
        self
    }

    /// Sets the fuzziness for `fuzzy`.
    #[must_use]
    pub const fn with_fuzziness(mut self, fuzziness: f64) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    /// Sets a literal replacement for `replace`.
    #[must_use]
    pub fn with_replacement_text(mut self, text: impl Into<String>) -> Self {
        self.replacement_text = Some(text.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if fuzziness is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzziness) {
            return Err(Error::InvalidConfig(format!(
                "fuzziness must be within [0, 1], got {}",
                self.fuzziness
            )));
        }
        Ok(())
    }
}

/// One applied rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionRecord {
    /// Category of the rewritten span.
    pub category: Category,
    /// Strategy that produced the replacement.
    pub strategy_applied: RedactionStrategy,
    /// Start byte offset in the original text.
    #[serde(rename = "startIndex")]
    pub start: usize,
    /// End byte offset in the original text (exclusive).
    #[serde(rename = "endIndex")]
    pub end: usize,
    /// Text written in place of the span.
    pub replacement_text: String,
}

/// Outcome of a redaction pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionResult {
    /// Rewritten text.
    pub redacted_text: String,
    /// Applied rewrites, ascending by start offset.
    #[serde(rename = "redactions")]
    pub records: Vec<RedactionRecord>,
    /// Detections that survived filtering, before overlap resolution.
    pub detections_found: usize,
    /// Number of rewrites applied.
    pub redactions_applied: usize,
}

impl RedactionResult {
    /// Result for text with nothing to redact.
    #[must_use]
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            redacted_text: text.into(),
            ..Self::default()
        }
    }

    /// Returns true if anything was rewritten.
    #[must_use]
    pub const fn has_redactions(&self) -> bool {
        self.redactions_applied > 0
    }

    /// Overrides the detection count with the pre-resolution total.
    #[must_use]
    pub const fn with_detections_found(mut self, count: usize) -> Self {
        self.detections_found = count;
        self
    }

    /// Number of rewrites per category.
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.category).or_insert(0) += 1;
        }
        counts
    }
}
