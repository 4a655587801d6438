//! Data models.
//!
//! Categories, detections, detection policy, and redaction results.

mod category;
mod detection;
mod policy;
mod redaction;

pub use category::Category;
pub use detection::{Detection, DetectionSource};
pub use policy::{CustomPattern, DEFAULT_CUSTOM_CONFIDENCE, DetectionConfig, Sensitivity};
pub use redaction::{
    DEFAULT_MASK_CHAR, RedactionContext, RedactionRecord, RedactionResult, RedactionStrategy,
};
