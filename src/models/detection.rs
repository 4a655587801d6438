//! Detection types.

use super::Category;
use serde::Serialize;

/// Where a detection came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DetectionSource {
    /// A pattern from the builtin library.
    Builtin {
        /// Pattern name, e.g. `"SSN"`.
        pattern: &'static str,
    },
    /// A caller-supplied pattern.
    Custom {
        /// Caller-assigned pattern name.
        name: String,
        /// Replacement text used by the `replace` strategy.
        #[serde(skip_serializing_if = "Option::is_none")]
        replacement: Option<String>,
    },
}

impl DetectionSource {
    /// Returns the pattern name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin { pattern } => pattern,
            Self::Custom { name, .. } => name,
        }
    }

    /// Returns the pattern-specific replacement, if any.
    #[must_use]
    pub fn replacement(&self) -> Option<&str> {
        match self {
            Self::Builtin { .. } => None,
            Self::Custom { replacement, .. } => replacement.as_deref(),
        }
    }
}

/// A span of text identified as PII.
///
/// Offsets are byte positions into the scanned text. Fields are private so the
/// span and confidence cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    start: usize,
    end: usize,
    category: Category,
    matched_text: String,
    confidence: f64,
    source: DetectionSource,
}

impl Detection {
    /// Creates a detection.
    ///
    /// Returns `None` for empty spans. Confidence is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(
        start: usize,
        end: usize,
        category: Category,
        matched_text: impl Into<String>,
        confidence: f64,
        source: DetectionSource,
    ) -> Option<Self> {
        if start >= end {
            return None;
        }
        Some(Self {
            start,
            end,
            category,
            matched_text: matched_text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source,
        })
    }

    /// Start byte offset (inclusive).
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// End byte offset (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Span length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; detections are never empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// PII category.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// The matched text.
    #[must_use]
    pub fn matched_text(&self) -> &str {
        &self.matched_text
    }

    /// Confidence in `[0, 1]`.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Pattern that produced this detection.
    #[must_use]
    pub const fn source(&self) -> &DetectionSource {
        &self.source
    }

    /// Returns true if the two spans share at least one byte.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if this span shares at least one byte with `start..end`.
    #[must_use]
    pub const fn overlaps_range(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin(start: usize, end: usize) -> Option<Detection> {
        Detection::new(
            start,
            end,
            Category::Email,
            "x".repeat(end.saturating_sub(start)),
            0.85,
            DetectionSource::Builtin { pattern: "Email" },
        )
    }

    #[test]
    fn test_empty_span_rejected() {
        assert!(builtin(4, 4).is_none());
        assert!(builtin(5, 4).is_none());
    }

    #[test]
    fn test_confidence_clamped() {
        let d = Detection::new(
            0,
            3,
            Category::Id,
            "abc",
            1.7,
            DetectionSource::Builtin { pattern: "Id" },
        )
        .unwrap();
        assert!((d.confidence() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlaps() {
        let a = builtin(0, 5).unwrap();
        let b = builtin(4, 8).unwrap();
        let c = builtin(5, 9).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_custom_source_replacement() {
        let source = DetectionSource::Custom {
            name: "employee".to_string(),
            replacement: Some("[EMP]".to_string()),
        };
        assert_eq!(source.name(), "employee");
        assert_eq!(source.replacement(), Some("[EMP]"));
        assert_eq!(
            DetectionSource::Builtin { pattern: "SSN" }.replacement(),
            None
        );
    }
}
