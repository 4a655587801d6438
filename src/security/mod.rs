//! Security features.
//!
//! PII detection, overlap resolution, and redaction.

pub mod custom;
mod patterns;
mod pii;
mod redactor;
mod resolver;

pub use custom::{CompiledPattern, LoadedPatterns, RejectedPattern};
pub use patterns::{
    BUILTIN_CONFIDENCE, BuiltinPattern, DEMOTED_CONFIDENCE, PatternLibrary, is_plausible_ssn,
    passes_luhn,
};
pub use pii::PiiDetector;
pub use redactor::{
    RedactionEngine, fuzzy_mask, fuzzy_mask_count, hash_token, partial_mask, replacement_for,
};
pub use resolver::resolve;
