//! Business logic services.
//!
//! The redaction service ties detection, resolution, and rewriting together
//! behind a single call.

mod redaction;

pub use redaction::{
    RedactionOutcome, RedactionRequest, RedactionResponse, RedactionService, StrategyParams,
    parse_mask_char,
};
