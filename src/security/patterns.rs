//! Builtin pattern library.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]
//!
//! Category-tagged regex matchers plus the domain vocabulary used for
//! term preservation. The library is built once and shared read-only.

use crate::models::Category;
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Confidence assigned to matches that fail a checksum or validity check.
pub const DEMOTED_CONFIDENCE: f64 = 0.55;

/// Base confidence for most builtin matchers.
pub const BUILTIN_CONFIDENCE: f64 = 0.85;

/// A builtin matcher.
pub struct BuiltinPattern {
    /// Pattern name.
    pub name: &'static str,
    /// Category the pattern detects.
    pub category: Category,
    regex: &'static LazyLock<Regex>,
    /// Base confidence.
    pub confidence: f64,
    /// Capture group holding the sensitive value; whole match when `None`.
    pub group: Option<usize>,
    validator: Option<fn(&str) -> bool>,
}

impl BuiltinPattern {
    /// The compiled regex.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        self.regex
    }

    /// Confidence for a particular matched value after validity checks.
    #[must_use]
    pub fn confidence_for(&self, matched: &str) -> f64 {
        match self.validator {
            Some(is_valid) if !is_valid(matched) => DEMOTED_CONFIDENCE.min(self.confidence),
            _ => self.confidence,
        }
    }
}

impl std::fmt::Debug for BuiltinPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinPattern")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("regex", &self.regex.as_str())
            .field("confidence", &self.confidence)
            .field("group", &self.group)
            .finish()
    }
}

// Note: These patterns are static and guaranteed to compile, so expect() is safe
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("static regex: email pattern")
});

static SSN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("static regex: SSN pattern"));

static SSN_LABELED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:ssn|social\s+security(?:\s+(?:number|no\.?))?)\s*[:#]?\s*(\d{9})\b")
        .expect("static regex: labeled SSN pattern")
});

static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?(?:\([2-9]\d{2}\)\s?|\b[2-9]\d{2}[-.\s]?)\d{3}[-.\s]?\d{4}\b")
        .expect("static regex: phone pattern")
});

static PHONE_INTL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+\d{1,3}[\s.-]?\(?\d{1,4}\)?(?:[\s.-]?\d{2,4}){2,4}\b")
        .expect("static regex: international phone pattern")
});

static CREDIT_CARD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:4[0-9]{12}(?:[0-9]{3})?|5[1-5][0-9]{14}|3[47][0-9]{13}|6(?:011|5[0-9]{2})[0-9]{12})\b",
    )
    .expect("static regex: credit card pattern")
});

static CREDIT_CARD_GROUPED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?:4\d{3}|5[1-5]\d{2}|6(?:011|5\d{2}))(?:[\s-]\d{4}){3}|3[47]\d{2}[\s-]\d{6}[\s-]\d{5})\b",
    )
    .expect("static regex: grouped credit card pattern")
});

static DOB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:dob|date\s+of\s+birth|birth\s*date|born(?:\s+on)?)\s*[:=]?\s*(\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}|\d{4}-\d{2}-\d{2}|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4})\b",
    )
    .expect("static regex: date of birth pattern")
});

static IBAN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{2}\d{2}(?:\s?[A-Z0-9]{4}){2,7}(?:\s?[A-Z0-9]{1,3})?\b")
        .expect("static regex: IBAN pattern")
});

static BANK_ACCOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:account|acct)\s*(?:number|no\.?|num|#)?\s*[:=#]?\s*(\d{6,17})\b")
        .expect("static regex: bank account pattern")
});

static ROUTING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:routing|aba)\s*(?:number|no\.?|#)?\s*[:=#]?\s*(\d{9})\b")
        .expect("static regex: routing number pattern")
});

/// EU VAT Number: Country prefix (2 letters) + country-specific format
static EU_VAT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:ATU\d{8}|BE[01]\d{9}|DE\d{9}|DK\d{8}|EE\d{9}|EL\d{9}|ES[A-Z]\d{7}[A-Z0-9]|FI\d{8}|FR[A-Z0-9]{2}\d{9}|HR\d{11}|HU\d{8}|IE\d{7}[A-Z]{1,2}|IT\d{11}|LT\d{9,12}|LU\d{8}|LV\d{11}|MT\d{8}|NL\d{9}B\d{2}|PL\d{10}|PT\d{9}|RO\d{2,10}|SE\d{12}|SI\d{8}|SK\d{10}|CY\d{8}[A-Z]|CZ\d{8,10}|BG\d{9,10})\b",
    )
    .expect("static regex: EU VAT pattern")
});

static MRN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:mrn|medical\s+record\s*(?:number|no\.?|#)?|patient\s*(?:id|number|no\.?|#))\s*[:=#]?\s*([A-Z]{0,4}\d[A-Z0-9-]{3,14})\b",
    )
    .expect("static regex: medical record number pattern")
});

static INSURANCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:insurance|policy|medicare|medicaid|health\s+plan)\s*(?:id|number|no\.?|#)\s*[:=#]?\s*([A-Z]{0,4}\d[A-Z0-9-]{4,19})\b",
    )
    .expect("static regex: health insurance pattern")
});

static ICD10_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:diagnosis|dx|icd-?10)\s*(?:code)?\s*[:=#]?\s*([A-TV-Z]\d{2}(?:\.[A-Z0-9]{1,4})?)\b")
        .expect("static regex: ICD-10 pattern")
});

static STREET_ADDRESS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d{1,5}\s+(?:[a-z][a-z0-9.']*\s+){1,4}(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|court|ct|way|place|pl|terrace|circle|parkway|pkwy|highway|hwy)\b",
    )
    .expect("static regex: street address pattern")
});

static PO_BOX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bp\.?\s*o\.?\s*box\s+\d{1,6}\b").expect("static regex: PO box pattern")
});

static ZIP_PLUS4_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5}-\d{4}\b").expect("static regex: ZIP+4 pattern"));

static GENERIC_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}[-\s]?\d{2,3}[-\s]?\d{3,4}\b").expect("static regex: generic ID pattern")
});

static PASSPORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bpassport\s*(?:number|no\.?|#)?\s*[:=]?\s*([A-Z]{0,2}\d[A-Z0-9]{5,8})\b")
        .expect("static regex: passport pattern")
});

static DL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:driver'?s?\s*licen[cs]e|dl)\s*(?:number|no\.?|#)?\s*[:=]?\s*([A-Z]{0,3}\d[A-Z0-9]{4,11})\b",
    )
    .expect("static regex: driver's license pattern")
});

static MEMBER_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:employee|member|customer|student)\s*(?:id|number|no\.?|#)\s*[:=#]?\s*([A-Z]{0,4}\d[A-Z0-9-]{3,15})\b",
    )
    .expect("static regex: member ID pattern")
});

/// UK National Insurance Number: 2 letters + 6 digits + 1 letter (e.g., AB123456C)
static UK_NIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-CEGHJ-PR-TW-Z]{2}[\s\-]?\d{2}[\s\-]?\d{2}[\s\-]?\d{2}[\s\-]?[A-D]\b")
        .expect("static regex: UK NIN pattern")
});

/// Indian PAN (Permanent Account Number): 5 letters + 4 digits + 1 letter
static IN_PAN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{5}\d{4}[A-Z]\b").expect("static regex: India PAN pattern")
});

/// International Standard Recording Code, e.g. `USRC17607839`.
static ISRC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{2}-?[A-Z0-9]{3}-?\d{2}-?\d{5}\b").expect("static regex: ISRC pattern")
});

/// International Standard Musical Work Code, e.g. `T-034.524.680-1`.
static ISWC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bT-?\d{3}\.?\d{3}\.?\d{3}-?\d\b").expect("static regex: ISWC pattern")
});

/// Interested Party Information number identifying a songwriter or publisher.
static IPI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:ipi|cae)\s*(?:number|no\.?|#)?\s*[:=#]?\s*(\d{9,11})\b")
        .expect("static regex: IPI pattern")
});

/// Studio equipment, instruments, and software whose names look like identifiers.
const DOMAIN_VOCABULARY: &[&str] = &[
    "Neumann U87",
    "Neumann U47",
    "Neumann U67",
    "Neumann TLM 103",
    "Neumann KM 184",
    "Shure SM57",
    "Shure SM58",
    "Shure SM7B",
    "AKG C414",
    "AKG C12",
    "Sennheiser MD421",
    "Sennheiser MKH 416",
    "Sennheiser HD 650",
    "Royer R-121",
    "Coles 4038",
    "Electro-Voice RE20",
    "SSL 4000",
    "SSL 9000",
    "SSL G-Series",
    "Neve 1073",
    "Neve 1084",
    "Neve 8078",
    "API 512c",
    "API 2500",
    "Universal Audio 1176",
    "UA 1176",
    "Teletronix LA-2A",
    "LA-2A",
    "Fairchild 660",
    "Fairchild 670",
    "Pultec EQP-1A",
    "Lexicon 480L",
    "Eventide H3000",
    "EMT 140",
    "Yamaha NS10",
    "Yamaha DX7",
    "Genelec 8030",
    "Genelec 8040",
    "Roland TR-808",
    "Roland TR-909",
    "Roland Juno-106",
    "Akai MPC60",
    "Akai MPC2000",
    "Minimoog Model D",
    "Hammond B3",
    "Fender Rhodes",
    "Marshall JCM800",
    "Focusrite Scarlett 2i2",
    "Apogee Symphony",
    "Pro Tools",
    "Logic Pro",
    "Ableton Live",
    "Studio One",
    "Cubase",
    "Reaper",
    "Auto-Tune",
    "Melodyne",
];

static DOMAIN_VOCABULARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let mut terms: Vec<&str> = DOMAIN_VOCABULARY.to_vec();
    // Longer terms first so "Teletronix LA-2A" wins over "LA-2A".
    terms.sort_by_key(|term| std::cmp::Reverse(term.len()));
    let alternation = terms
        .iter()
        .map(|term| regex::escape(term).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("static regex: domain vocabulary")
});

static SHARED_LIBRARY: LazyLock<Arc<PatternLibrary>> =
    LazyLock::new(|| Arc::new(PatternLibrary::builtin()));

const fn pattern(
    name: &'static str,
    category: Category,
    regex: &'static LazyLock<Regex>,
    confidence: f64,
) -> BuiltinPattern {
    BuiltinPattern {
        name,
        category,
        regex,
        confidence,
        group: None,
        validator: None,
    }
}

const fn grouped(
    name: &'static str,
    category: Category,
    regex: &'static LazyLock<Regex>,
    confidence: f64,
) -> BuiltinPattern {
    BuiltinPattern {
        group: Some(1),
        ..pattern(name, category, regex, confidence)
    }
}

const fn validated(mut builtin: BuiltinPattern, validator: fn(&str) -> bool) -> BuiltinPattern {
    builtin.validator = Some(validator);
    builtin
}

/// Immutable collection of builtin matchers and domain vocabulary.
#[derive(Debug)]
pub struct PatternLibrary {
    patterns: Vec<BuiltinPattern>,
    vocabulary: &'static [&'static str],
    vocabulary_regex: &'static LazyLock<Regex>,
}

impl PatternLibrary {
    /// Builds the builtin library.
    #[must_use]
    pub fn builtin() -> Self {
        use Category::{
            Address, AudioDomain, CreditCard, DateOfBirth, Email, Financial, Id, Medical, Phone,
            Ssn,
        };

        let patterns = vec![
            pattern("Email Address", Email, &EMAIL_REGEX, BUILTIN_CONFIDENCE),
            validated(pattern("SSN", Ssn, &SSN_REGEX, BUILTIN_CONFIDENCE), is_plausible_ssn),
            validated(
                grouped("SSN (labeled)", Ssn, &SSN_LABELED_REGEX, BUILTIN_CONFIDENCE),
                is_plausible_ssn,
            ),
            pattern("Phone Number", Phone, &PHONE_REGEX, BUILTIN_CONFIDENCE),
            pattern(
                "International Phone Number",
                Phone,
                &PHONE_INTL_REGEX,
                BUILTIN_CONFIDENCE,
            ),
            validated(
                pattern("Credit Card Number", CreditCard, &CREDIT_CARD_REGEX, BUILTIN_CONFIDENCE),
                passes_luhn,
            ),
            validated(
                pattern(
                    "Credit Card Number (grouped)",
                    CreditCard,
                    &CREDIT_CARD_GROUPED_REGEX,
                    BUILTIN_CONFIDENCE,
                ),
                passes_luhn,
            ),
            grouped("Date of Birth", DateOfBirth, &DOB_REGEX, BUILTIN_CONFIDENCE),
            pattern("IBAN", Financial, &IBAN_REGEX, BUILTIN_CONFIDENCE),
            grouped("Bank Account Number", Financial, &BANK_ACCOUNT_REGEX, BUILTIN_CONFIDENCE),
            grouped("Routing Number", Financial, &ROUTING_REGEX, BUILTIN_CONFIDENCE),
            pattern("EU VAT Number", Financial, &EU_VAT_REGEX, BUILTIN_CONFIDENCE),
            grouped("Medical Record Number", Medical, &MRN_REGEX, BUILTIN_CONFIDENCE),
            grouped("Health Insurance ID", Medical, &INSURANCE_REGEX, BUILTIN_CONFIDENCE),
            grouped("ICD-10 Diagnosis Code", Medical, &ICD10_REGEX, BUILTIN_CONFIDENCE),
            pattern("Street Address", Address, &STREET_ADDRESS_REGEX, 0.75),
            pattern("PO Box", Address, &PO_BOX_REGEX, 0.75),
            pattern("ZIP+4 Code", Address, &ZIP_PLUS4_REGEX, 0.75),
            pattern("Numeric Identifier", Id, &GENERIC_ID_REGEX, 0.65),
            grouped("Passport Number", Id, &PASSPORT_REGEX, BUILTIN_CONFIDENCE),
            grouped("Driver's License", Id, &DL_REGEX, BUILTIN_CONFIDENCE),
            grouped("Member ID", Id, &MEMBER_ID_REGEX, 0.8),
            pattern("UK National Insurance Number", Id, &UK_NIN_REGEX, BUILTIN_CONFIDENCE),
            pattern("India PAN", Id, &IN_PAN_REGEX, BUILTIN_CONFIDENCE),
            pattern("ISRC", AudioDomain, &ISRC_REGEX, BUILTIN_CONFIDENCE),
            pattern("ISWC", AudioDomain, &ISWC_REGEX, BUILTIN_CONFIDENCE),
            grouped("IPI Number", AudioDomain, &IPI_REGEX, BUILTIN_CONFIDENCE),
        ];

        Self {
            patterns,
            vocabulary: DOMAIN_VOCABULARY,
            vocabulary_regex: &DOMAIN_VOCABULARY_REGEX,
        }
    }

    /// Returns the process-wide builtin library.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED_LIBRARY)
    }

    /// All builtin patterns.
    #[must_use]
    pub fn patterns(&self) -> &[BuiltinPattern] {
        &self.patterns
    }

    /// Patterns for one category.
    pub fn patterns_for(&self, category: Category) -> impl Iterator<Item = &BuiltinPattern> {
        self.patterns.iter().filter(move |p| p.category == category)
    }

    /// The domain vocabulary.
    #[must_use]
    pub const fn vocabulary(&self) -> &'static [&'static str] {
        self.vocabulary
    }

    /// Byte spans of domain-vocabulary occurrences in `text`.
    #[must_use]
    pub fn domain_term_spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.vocabulary_regex
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    /// Returns true if `text` contains a domain-vocabulary term.
    #[must_use]
    pub fn contains_domain_term(&self, text: &str) -> bool {
        self.vocabulary_regex.is_match(text)
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Luhn checksum over the digits of `value`.
#[must_use]
pub fn passes_luhn(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Rejects SSNs with area 000, 666 or 9xx, group 00, or serial 0000.
#[must_use]
pub fn is_plausible_ssn(value: &str) -> bool {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 9 {
        return false;
    }
    let (area, rest) = digits.split_at(3);
    let (group, serial) = rest.split_at(2);
    area != "000" && area != "666" && !area.starts_with('9') && group != "00" && serial != "0000"
}
