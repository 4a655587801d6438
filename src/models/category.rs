//! PII categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of personally identifiable information.
///
/// Declaration order is the fixed priority order used as the final
/// tie-breaker during span resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// US Social Security Number.
    Ssn,
    /// Payment card number.
    CreditCard,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Date of birth.
    DateOfBirth,
    /// Bank accounts, IBANs, VAT numbers.
    Financial,
    /// Medical record numbers, insurance IDs, diagnosis codes.
    Medical,
    /// Caller-supplied pattern.
    Custom,
    /// Postal address.
    Address,
    /// Audio-industry rights identifiers (ISRC, ISWC, IPI).
    AudioDomain,
    /// Generic identifier.
    Id,
}

impl Category {
    /// Returns all categories in priority order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Ssn,
            Self::CreditCard,
            Self::Email,
            Self::Phone,
            Self::DateOfBirth,
            Self::Financial,
            Self::Medical,
            Self::Custom,
            Self::Address,
            Self::AudioDomain,
            Self::Id,
        ]
    }

    /// Returns the category's wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ssn => "ssn",
            Self::CreditCard => "creditCard",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::DateOfBirth => "dateOfBirth",
            Self::Financial => "financial",
            Self::Medical => "medical",
            Self::Custom => "custom",
            Self::Address => "address",
            Self::AudioDomain => "audioDomain",
            Self::Id => "id",
        }
    }

    /// Returns the placeholder token used by the `replace` strategy.
    #[must_use]
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::Ssn => "[SSN]",
            Self::CreditCard => "[CREDIT_CARD]",
            Self::Email => "[EMAIL]",
            Self::Phone => "[PHONE]",
            Self::DateOfBirth => "[DATE_OF_BIRTH]",
            Self::Financial => "[FINANCIAL]",
            Self::Medical => "[MEDICAL]",
            Self::Custom => "[CUSTOM]",
            Self::Address => "[ADDRESS]",
            Self::AudioDomain => "[AUDIO_DOMAIN]",
            Self::Id => "[ID]",
        }
    }

    /// Specificity tier. Higher tiers win overlaps regardless of confidence.
    #[must_use]
    pub const fn specificity(&self) -> u8 {
        match self {
            Self::Ssn | Self::CreditCard | Self::Email => 3,
            Self::Phone | Self::DateOfBirth | Self::Financial | Self::Medical | Self::Custom => 2,
            Self::Address | Self::AudioDomain => 1,
            Self::Id => 0,
        }
    }

    /// Position in the fixed priority order (lower wins).
    #[must_use]
    pub const fn priority(&self) -> usize {
        *self as usize
    }

    /// Parses a category name.
    ///
    /// Accepts camelCase, `snake_case` and kebab-case spellings, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "ssn" => Some(Self::Ssn),
            "creditcard" => Some(Self::CreditCard),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "dateofbirth" => Some(Self::DateOfBirth),
            "financial" => Some(Self::Financial),
            "medical" => Some(Self::Medical),
            "custom" => Some(Self::Custom),
            "address" => Some(Self::Address),
            "audiodomain" => Some(Self::AudioDomain),
            "id" => Some(Self::Id),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::Error::InvalidConfig(format!("unknown category '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("email", Category::Email)]
    #[test_case("creditCard", Category::CreditCard)]
    #[test_case("credit_card", Category::CreditCard)]
    #[test_case("credit-card", Category::CreditCard)]
    #[test_case("DateOfBirth", Category::DateOfBirth)]
    #[test_case("audioDomain", Category::AudioDomain)]
    #[test_case(" SSN ", Category::Ssn)]
    fn test_parse(input: &str, expected: Category) {
        assert_eq!(Category::parse(input), Some(expected));
    }

    #[test_case("card")]
    #[test_case("audio")]
    #[test_case("dob")]
    #[test_case("passport")]
    fn test_parse_rejects_non_category_names(input: &str) {
        assert_eq!(Category::parse(input), None);
    }

    #[test]
    fn test_parse_unknown_is_error() {
        let err = "passport".parse::<Category>().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidConfig(_)));
    }

    #[test]
    fn test_as_str_roundtrips() {
        for category in Category::all() {
            assert_eq!(Category::parse(category.as_str()), Some(*category));
        }
    }

    #[test]
    fn test_priority_follows_declaration_order() {
        let priorities: Vec<usize> = Category::all().iter().map(Category::priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
        assert!(Category::Ssn.specificity() > Category::Id.specificity());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_string(&Category::CreditCard).unwrap();
        assert_eq!(json, "\"creditCard\"");
    }
}
