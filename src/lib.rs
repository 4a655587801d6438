//! # Piiscrub
//!
//! PII detection and configurable redaction.
//!
//! Piiscrub locates personally identifiable information in free text,
//! filters detections by confidence, whitelist, and domain vocabulary,
//! resolves overlapping spans, and rewrites the text with one of seven
//! strategies while returning a record of every change.
//!
//! ## Features
//!
//! - Category-tagged builtin pattern library shared read-only across threads
//! - Sensitivity gating, case-insensitive whitelist, domain-term preservation
//! - Deterministic overlap resolution by category specificity
//! - `replace`, `hash`, `mask`, `partial`, `tokenize`, `fuzzy`, `remove` strategies
//! - Caller-supplied patterns validated individually
//!
//! ## Example
//!
//! ```rust
//! use piiscrub::{Category, DetectionConfig, RedactionContext, RedactionService};
//!
//! let service = RedactionService::new();
//! let config = DetectionConfig::for_categories([Category::Email, Category::Phone]);
//! let result = service
//!     .process(
//!         "Contact me at john.doe@example.com or 555-123-4567",
//!         &config,
//!         &RedactionContext::default(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(result.redacted_text, "Contact me at [EMAIL] or [PHONE]");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;

// Re-exports for convenience
pub use config::PiiscrubConfig;
pub use models::{
    Category, CustomPattern, Detection, DetectionConfig, DetectionSource, RedactionContext,
    RedactionRecord, RedactionResult, RedactionStrategy, Sensitivity,
};
pub use security::{PatternLibrary, PiiDetector, RedactionEngine};
pub use services::{RedactionRequest, RedactionResponse, RedactionService, StrategyParams};

/// Error type for piiscrub operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidConfig` | Unknown category, sensitivity, or strategy; out-of-range strategy params |
/// | `InvalidInput` | Malformed request JSON or unreadable input |
/// | `OperationFailed` | Internal processing errors, config file or logging I/O failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The policy is invalid.
    ///
    /// Raised before any text is processed when:
    /// - A category name is not recognized
    /// - A sensitivity level is not recognized
    /// - A strategy identifier is not supported
    /// - Fuzziness is outside `[0, 1]` or the mask character is empty
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - Request JSON cannot be deserialized
    /// - Input text cannot be read
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Resolved spans are inconsistent with the text
    /// - Configuration files cannot be read or parsed
    /// - Logging cannot be initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for piiscrub operations.
pub type Result<T> = std::result::Result<T, Error>;
