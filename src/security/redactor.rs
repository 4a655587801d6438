//! Content redaction.
//!
//! Rewrites resolved spans according to the active strategy and records
//! every change.

use crate::models::{
    Category, Detection, RedactionContext, RedactionRecord, RedactionResult, RedactionStrategy,
};
use crate::{Error, Result};
use sha2::{Digest, Sha256};

/// Bytes of the SHA-256 digest kept by the `hash` strategy.
const HASH_PREFIX_BYTES: usize = 8;

/// Applies a redaction strategy to resolved spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedactionEngine;

impl RedactionEngine {
    /// Creates a redaction engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Rewrites `text`, replacing each span per `context.strategy`.
    ///
    /// `spans` must be sorted by start offset and non-overlapping, as produced
    /// by [`super::resolve`]. The output is assembled left to right, copying
    /// the untouched slices between spans verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the context parameters are out of
    /// range, and [`Error::OperationFailed`] if the spans are unordered,
    /// overlapping, out of bounds, split a UTF-8 character, or disagree with
    /// the text they claim to cover.
    pub fn redact(
        &self,
        text: &str,
        spans: &[Detection],
        context: &RedactionContext,
    ) -> Result<RedactionResult> {
        context.validate()?;
        check_spans(text, spans)?;

        if spans.is_empty() {
            return Ok(RedactionResult::unchanged(text));
        }

        let mut output = String::with_capacity(text.len());
        let mut records = Vec::with_capacity(spans.len());
        let mut cursor = 0;

        for (i, span) in spans.iter().enumerate() {
            output.push_str(&text[cursor..span.start()]);
            let replacement = replacement_for(span, context);

            cursor = span.end();
            if context.strategy == RedactionStrategy::Remove {
                let limit = spans.get(i + 1).map_or(text.len(), Detection::start);
                cursor += collapse_seam(&mut output, &text[span.end()..limit]);
            } else {
                output.push_str(&replacement);
            }

            records.push(RedactionRecord {
                category: span.category(),
                strategy_applied: context.strategy,
                start: span.start(),
                end: span.end(),
                replacement_text: replacement,
            });
        }
        output.push_str(&text[cursor..]);

        metrics::counter!("piiscrub_redactions_total", "strategy" => context.strategy.as_str())
            .increment(records.len() as u64);
        tracing::debug!(
            strategy = %context.strategy,
            applied = records.len(),
            "Redaction applied"
        );

        Ok(RedactionResult {
            redacted_text: output,
            detections_found: spans.len(),
            redactions_applied: records.len(),
            records,
        })
    }
}

/// Computes the replacement for one span.
#[must_use]
pub fn replacement_for(span: &Detection, context: &RedactionContext) -> String {
    let matched = span.matched_text();
    match context.strategy {
        RedactionStrategy::Replace => placeholder(span, context),
        RedactionStrategy::Hash => hash_token(matched),
        RedactionStrategy::Mask => mask_all(matched, context.mask_char),
        RedactionStrategy::Partial => partial_mask(
            matched,
            context.preserve_start,
            context.preserve_end,
            context.mask_char,
        ),
        RedactionStrategy::Tokenize => format!("[TOKEN_{}CHARS]", matched.chars().count()),
        RedactionStrategy::Fuzzy => fuzzy_mask(matched, context.fuzziness, context.mask_char),
        RedactionStrategy::Remove => String::new(),
    }
}

fn placeholder(span: &Detection, context: &RedactionContext) -> String {
    if let Some(replacement) = span.source().replacement() {
        return replacement.to_string();
    }
    if let Some(ref text) = context.replacement_text {
        return text.clone();
    }
    if span.category() == Category::Custom {
        let mut name = String::new();
        for c in span.source().name().chars() {
            if c.is_alphanumeric() {
                name.extend(c.to_uppercase());
            } else {
                name.push('_');
            }
        }
        return format!("[{name}]");
    }
    span.category().placeholder().to_string()
}

/// `[HASH:<16 hex chars>]` from the SHA-256 of `value`.
#[must_use]
pub fn hash_token(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    format!("[HASH:{}]", hex::encode(&digest[..HASH_PREFIX_BYTES]))
}

fn mask_all(value: &str, mask_char: char) -> String {
    value.chars().map(|_| mask_char).collect()
}

/// Keeps `keep_start` leading and `keep_end` trailing characters.
///
/// Values too short to keep anything hidden are masked entirely.
#[must_use]
pub fn partial_mask(value: &str, keep_start: usize, keep_end: usize, mask_char: char) -> String {
    let len = value.chars().count();
    if len <= keep_start.saturating_add(keep_end) {
        return mask_all(value, mask_char);
    }
    value
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i < keep_start || i >= len - keep_end {
                c
            } else {
                mask_char
            }
        })
        .collect()
}

/// Number of characters `fuzzy` masks for a value of `len` characters.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn fuzzy_mask_count(len: usize, fuzziness: f64) -> usize {
    let count = (len as f64 * fuzziness.clamp(0.0, 1.0)).round() as usize;
    count.min(len)
}

/// Masks `round(len * fuzziness)` characters at evenly spaced positions.
#[must_use]
pub fn fuzzy_mask(value: &str, fuzziness: f64, mask_char: char) -> String {
    let len = value.chars().count();
    let count = fuzzy_mask_count(len, fuzziness);
    if count == 0 {
        return value.to_string();
    }

    // Midpoints of `count` equal slices; consecutive positions differ by at
    // least one because count <= len.
    let mut masked = vec![false; len];
    for i in 0..count {
        masked[(2 * i + 1) * len / (2 * count)] = true;
    }

    value
        .chars()
        .zip(masked)
        .map(|(c, hide)| if hide { mask_char } else { c })
        .collect()
}

/// Collapses whitespace on both sides of a removal seam to a single space.
///
/// Returns how many bytes of `after` were consumed.
fn collapse_seam(output: &mut String, after: &str) -> usize {
    let before_ws = output.ends_with(char::is_whitespace);
    let after_ws = after.starts_with(char::is_whitespace);
    if !(before_ws && after_ws) {
        return 0;
    }
    let kept = output.trim_end().len();
    output.truncate(kept);
    output.push(' ');
    after.len() - after.trim_start().len()
}

fn check_spans(text: &str, spans: &[Detection]) -> Result<()> {
    let fail = |cause: String| Error::OperationFailed {
        operation: "redact".to_string(),
        cause,
    };

    let mut previous_end = 0;
    for span in spans {
        if span.end() > text.len() {
            return Err(fail(format!(
                "span {}..{} exceeds text length {}",
                span.start(),
                span.end(),
                text.len()
            )));
        }
        if !text.is_char_boundary(span.start()) || !text.is_char_boundary(span.end()) {
            return Err(fail(format!(
                "span {}..{} is not on a character boundary",
                span.start(),
                span.end()
            )));
        }
        if text.get(span.start()..span.end()) != Some(span.matched_text()) {
            return Err(fail(format!(
                "span {}..{} does not cover its matched text",
                span.start(),
                span.end()
            )));
        }
        if span.start() < previous_end {
            return Err(fail(format!(
                "span {}..{} overlaps or precedes the previous span",
                span.start(),
                span.end()
            )));
        }
        previous_end = span.end();
    }
    Ok(())
}
