//! End-to-end redaction scenarios.
//!
//! Drives the full pipeline (detect, filter, resolve, rewrite) through the
//! public service API:
//! - Placeholder replacement
//! - Partial masking with sensitivity-derived preserve counts
//! - Overlap resolution between specific and generic matchers
//! - Whitelist and domain-term preservation
//! - Removal with whitespace collapsing
//! - Fuzzy masking counts

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use piiscrub::{
    Category, CustomPattern, DetectionConfig, Error, RedactionContext, RedactionRequest,
    RedactionService, RedactionStrategy, Sensitivity, StrategyParams,
};

const CONTACT: &str = "Contact me at john.doe@example.com or 555-123-4567";

fn service() -> RedactionService {
    RedactionService::new()
}

// ============================================================================
// Strategies
// ============================================================================

#[test]
fn test_replace_email_and_phone() {
    let request = RedactionRequest::new(CONTACT).with_categories(["email", "phone"]);
    let response = service().detect_and_redact(&request).unwrap();

    assert_eq!(response.redacted_text, "Contact me at [EMAIL] or [PHONE]");
    assert_eq!(response.redactions.len(), 2);
    assert_eq!(response.redactions_applied, 2);
    assert_eq!(response.redactions[0].category, Category::Email);
    assert_eq!(response.redactions[0].start, 14);
    assert_eq!(response.redactions[0].end, 34);
    assert_eq!(response.redactions[1].category, Category::Phone);
    assert_eq!(response.redactions[1].replacement_text, "[PHONE]");
}

#[test]
fn test_partial_keeps_three_chars_at_medium() {
    let request = RedactionRequest::new(CONTACT)
        .with_categories(["email", "phone"])
        .with_strategy("partial")
        .with_sensitivity("medium");
    let response = service().detect_and_redact(&request).unwrap();

    let masked_email = format!("joh{}com", "*".repeat(14));
    assert_eq!(
        response.redacted_text,
        format!("Contact me at {masked_email} or 555******567")
    );
    assert_eq!(response.redactions[0].replacement_text, masked_email);
}

#[test]
fn test_remove_collapses_seam() {
    let request = RedactionRequest::new("Email: a@b.com today")
        .with_categories(["email"])
        .with_strategy("remove");
    let response = service().detect_and_redact(&request).unwrap();

    assert_eq!(response.redacted_text, "Email: today");
    assert_eq!(response.redactions_applied, 1);
    assert_eq!(response.redactions[0].replacement_text, "");
}

#[test]
fn test_fuzzy_masks_rounded_fraction() {
    let text = "Account ACCT123456 closed";
    let request = RedactionRequest::new(text)
        .with_categories(Vec::<String>::new())
        .with_custom_pattern(CustomPattern::new("account", r"ACCT\d{6}"))
        .with_strategy("fuzzy")
        .with_strategy_params(StrategyParams {
            fuzziness: Some(0.4),
            ..StrategyParams::default()
        });
    let response = service().detect_and_redact(&request).unwrap();

    let replacement = &response.redactions[0].replacement_text;
    assert_eq!(replacement.chars().count(), 10);
    assert_eq!(replacement.chars().filter(|c| *c == '*').count(), 4);
    for (original, masked) in "ACCT123456".chars().zip(replacement.chars()) {
        assert!(masked == '*' || masked == original);
    }
    assert!(response.redacted_text.starts_with("Account "));
    assert!(response.redacted_text.ends_with(" closed"));
}

#[test]
fn test_hash_is_stable_across_calls() {
    let request = RedactionRequest::new(CONTACT)
        .with_categories(["email"])
        .with_strategy("hash");
    let first = service().detect_and_redact(&request).unwrap();
    let second = service().detect_and_redact(&request).unwrap();

    assert_eq!(first.redacted_text, second.redacted_text);
    let token = &first.redactions[0].replacement_text;
    assert!(token.starts_with("[HASH:"));
    assert_eq!(token.len(), "[HASH:]".len() + 16);
}

#[test]
fn test_tokenize_reports_length() {
    let request = RedactionRequest::new("SSN: 123-45-6789")
        .with_categories(["ssn"])
        .with_strategy("tokenize");
    let response = service().detect_and_redact(&request).unwrap();
    assert_eq!(response.redacted_text, "SSN: [TOKEN_11CHARS]");
}

#[test]
fn test_replacement_text_overrides_placeholder() {
    let request = RedactionRequest::new(CONTACT)
        .with_categories(["email", "phone"])
        .with_strategy_params(StrategyParams {
            replacement_text: Some("<redacted>".to_string()),
            ..StrategyParams::default()
        });
    let response = service().detect_and_redact(&request).unwrap();
    assert_eq!(
        response.redacted_text,
        "Contact me at <redacted> or <redacted>"
    );
}

// ============================================================================
// Resolution and filtering
// ============================================================================

#[test]
fn test_specific_category_wins_overlap() {
    let request = RedactionRequest::new("SSN: 123-45-6789").with_categories(["ssn", "id"]);
    let response = service().detect_and_redact(&request).unwrap();

    assert_eq!(response.redacted_text, "SSN: [SSN]");
    assert_eq!(response.redactions_applied, 1);
    assert_eq!(response.redactions[0].category, Category::Ssn);
    assert!(response.detections_found >= 2);
}

#[test]
fn test_domain_terms_untouched() {
    let text = "Tracked vocals through a Neumann U87 into the desk";
    for strategy in RedactionStrategy::all() {
        let request = RedactionRequest::new(text)
            .with_whitelist(["Neumann U87"])
            .with_preserve_domain_terms(true)
            .with_custom_pattern(CustomPattern::new("mic model", r"U\d{2}"))
            .with_strategy(strategy.as_str());
        let response = service().detect_and_redact(&request).unwrap();

        assert_eq!(response.redacted_text, text, "strategy {strategy}");
        assert_eq!(response.redactions_applied, 0);
    }
}

#[test]
fn test_whitelisted_email_survives() {
    let request = RedactionRequest::new("Write to support@example.com or john.doe@example.com")
        .with_categories(["email"])
        .with_whitelist(["SUPPORT@example.com"]);
    let response = service().detect_and_redact(&request).unwrap();

    assert_eq!(
        response.redacted_text,
        "Write to support@example.com or [EMAIL]"
    );
    assert_eq!(response.detections_found, 1);
}

#[test]
fn test_strict_sensitivity_drops_generic_ids() {
    let text = "Reference 123 456 7890 on file";
    let config = DetectionConfig::for_categories([Category::Id]);

    let medium = service()
        .process(text, &config, &RedactionContext::default())
        .unwrap();
    assert_eq!(medium.redactions_applied, 1);

    let strict = service()
        .process(
            text,
            &config.clone().with_sensitivity(Sensitivity::Strict),
            &RedactionContext::default(),
        )
        .unwrap();
    assert_eq!(strict.redacted_text, text);
}

#[test]
fn test_custom_replacement_and_rejection() {
    let request = RedactionRequest::new("Badge EMP-004211 issued to a@b.com")
        .with_categories(["email"])
        .with_custom_pattern(
            CustomPattern::new("employee", r"EMP-\d{6}").with_replacement("[EMPLOYEE]"),
        )
        .with_custom_pattern(CustomPattern::new("broken", "[unclosed"));
    let response = service().detect_and_redact(&request).unwrap();

    assert_eq!(response.redacted_text, "Badge [EMPLOYEE] issued to [EMAIL]");
    assert_eq!(response.rejected_patterns.len(), 1);
    assert_eq!(response.rejected_patterns[0].name, "broken");
    assert_eq!(response.category_counts[&Category::Custom], 1);
    assert_eq!(response.category_counts[&Category::Email], 1);
}

#[test]
fn test_multibyte_text_around_spans() {
    let text = "Café ☕ · mail jose@example.com · merci";
    let request = RedactionRequest::new(text)
        .with_categories(["email"])
        .with_strategy("mask");
    let response = service().detect_and_redact(&request).unwrap();

    assert!(response.redacted_text.starts_with("Café ☕ · mail "));
    assert!(response.redacted_text.ends_with(" · merci"));
    assert_eq!(response.redactions_applied, 1);
    assert_eq!(
        response.redacted_text.chars().count(),
        text.chars().count()
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_invalid_policy_is_rejected_before_processing() {
    let cases = [
        RedactionRequest::new(CONTACT).with_categories(["email", "retina"]),
        RedactionRequest::new(CONTACT).with_sensitivity("paranoid"),
        RedactionRequest::new(CONTACT).with_strategy("shred"),
        RedactionRequest::new(CONTACT).with_strategy_params(StrategyParams {
            fuzziness: Some(-0.1),
            ..StrategyParams::default()
        }),
        RedactionRequest::new(CONTACT).with_strategy_params(StrategyParams {
            mask_char: Some(String::new()),
            ..StrategyParams::default()
        }),
    ];

    for request in &cases {
        let err = service().detect_and_redact(request).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "{request:?}: {err}");
    }
}

#[test]
fn test_empty_text_yields_empty_result() {
    let response = service()
        .detect_and_redact(&RedactionRequest::new(""))
        .unwrap();
    assert_eq!(response.redacted_text, "");
    assert_eq!(response.detections_found, 0);
    assert!(response.redactions.is_empty());
}

#[test]
fn test_request_from_json() {
    let json = r#"{
        "text": "Call 555-123-4567",
        "categories": ["phone"],
        "strategy": "mask",
        "strategyParams": {"maskChar": "X"},
        "metadata": {"source": "ticket-42"}
    }"#;
    let request: RedactionRequest = serde_json::from_str(json).unwrap();
    let response = service().detect_and_redact(&request).unwrap();
    assert_eq!(response.redacted_text, "Call XXXXXXXXXXXX");
}
