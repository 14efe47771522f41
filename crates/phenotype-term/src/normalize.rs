//! Identifier normalization
//!
//! Provides the [`IdNormalizer`] contract and the default [`HpoNormalizer`].
//! Normalization is pure: the same raw input always yields the same
//! canonical identifier.

use crate::error::TermError;
use crate::id::{RawTermId, TermId, TermType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Debug;

/// Highest HPO accession that fits the seven digit canonical form
pub const MAX_HPO_ACCESSION: u64 = 9_999_999;

static HPO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^hp[:_]?(\d{1,7})$").expect("static HPO pattern compiles"));

static GENE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("static gene pattern compiles"));

static CANONICAL_HPO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^HP:\d{7}$").expect("static canonical HPO pattern compiles"));

/// Turns caller-supplied identifiers into canonical cache keys
pub trait IdNormalizer: Debug + Send + Sync {
    /// Normalize `raw` according to the rules of `term_type`
    ///
    /// # Errors
    /// Returns [`TermError::InvalidIdentifier`] when `raw` is malformed.
    fn normalize(&self, term_type: TermType, raw: &RawTermId) -> Result<TermId, TermError>;
}

/// Default normalizer for HPO accessions and gene symbols
///
/// - Phenotype: `1251`, `"1251"`, `"hp_1251"`, `"HP:0001251"` all become
///   `HP:0001251`
/// - Gene: trimmed and uppercased symbol, numbers rejected
#[derive(Debug, Clone, Copy, Default)]
pub struct HpoNormalizer;

impl HpoNormalizer {
    fn phenotype(raw: &RawTermId) -> Result<TermId, TermError> {
        let accession = match raw {
            RawTermId::Number(n) => *n,
            RawTermId::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(TermError::invalid(TermType::Phenotype, text.clone(), "empty identifier"));
                }
                let digits = if trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    trimmed
                } else {
                    HPO_PATTERN
                        .captures(trimmed)
                        .and_then(|caps| caps.get(1))
                        .map(|m| m.as_str())
                        .ok_or_else(|| {
                            TermError::invalid(
                                TermType::Phenotype,
                                text.clone(),
                                "expected HP:<digits>",
                            )
                        })?
                };
                digits.parse::<u64>().map_err(|_| {
                    TermError::invalid(TermType::Phenotype, text.clone(), "accession out of range")
                })?
            }
        };

        if accession > MAX_HPO_ACCESSION {
            return Err(TermError::invalid(
                TermType::Phenotype,
                raw.to_string(),
                "accession out of range",
            ));
        }

        Ok(TermId::from_canonical(format!("HP:{accession:07}")))
    }

    fn gene(raw: &RawTermId) -> Result<TermId, TermError> {
        let text = match raw {
            RawTermId::Text(text) => text,
            RawTermId::Number(n) => {
                return Err(TermError::invalid(TermType::Gene, n.to_string(), "gene symbols are not numeric"));
            }
        };

        let trimmed = text.trim();
        if !GENE_PATTERN.is_match(trimmed) {
            return Err(TermError::invalid(TermType::Gene, text.clone(), "expected a gene symbol"));
        }

        Ok(TermId::from_canonical(trimmed.to_ascii_uppercase()))
    }

    /// Accept `text` only if it already is the canonical form of some term
    /// type; nothing is rewritten
    pub(crate) fn canonical(text: &str) -> Result<TermId, TermError> {
        if CANONICAL_HPO.is_match(text) {
            return Ok(TermId::from_canonical(text.to_string()));
        }
        if text.starts_with("HP:") {
            return Err(TermError::invalid(TermType::Phenotype, text, "expected HP:<7 digits>"));
        }
        if GENE_PATTERN.is_match(text) && !text.bytes().any(|b| b.is_ascii_lowercase()) {
            return Ok(TermId::from_canonical(text.to_string()));
        }
        Err(TermError::invalid(TermType::Gene, text, "not a canonical identifier"))
    }
}

impl IdNormalizer for HpoNormalizer {
    fn normalize(&self, term_type: TermType, raw: &RawTermId) -> Result<TermId, TermError> {
        match term_type {
            TermType::Phenotype => Self::phenotype(raw),
            TermType::Gene => Self::gene(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn phenotype(raw: impl Into<RawTermId>) -> Result<TermId, TermError> {
        HpoNormalizer.normalize(TermType::Phenotype, &raw.into())
    }

    #[test]
    fn phenotype_forms_converge() {
        let expected = "HP:0001251";
        for raw in ["HP:0001251", "hp:0001251", "HP_0001251", "hp1251", " 1251 ", "HP:1251"] {
            assert_eq!(phenotype(raw).unwrap().as_str(), expected, "raw = {raw:?}");
        }
        assert_eq!(phenotype(1251u32).unwrap().as_str(), expected);
    }

    #[test]
    fn phenotype_rejects_malformed() {
        for raw in ["", "   ", "HP:", "HP:12a", "OMIM:1234", "HP:00000001", "Ataxia"] {
            let err = phenotype(raw).unwrap_err();
            assert!(matches!(err, TermError::InvalidIdentifier { term_type: TermType::Phenotype, .. }));
        }
    }

    #[test]
    fn phenotype_rejects_out_of_range_number() {
        assert!(phenotype(MAX_HPO_ACCESSION + 1).is_err());
        assert_eq!(phenotype(MAX_HPO_ACCESSION).unwrap().as_str(), "HP:9999999");
    }

    #[test]
    fn gene_symbols_are_uppercased() {
        let id = HpoNormalizer
            .normalize(TermType::Gene, &RawTermId::from(" brca1 "))
            .unwrap();
        assert_eq!(id.as_str(), "BRCA1");
    }

    #[test]
    fn gene_rejects_numbers_and_spaces() {
        assert!(HpoNormalizer.normalize(TermType::Gene, &RawTermId::from(17u32)).is_err());
        assert!(HpoNormalizer.normalize(TermType::Gene, &RawTermId::from("BR CA1")).is_err());
        assert!(HpoNormalizer.normalize(TermType::Gene, &RawTermId::from("-X")).is_err());
    }

    #[test]
    fn canonical_accepts_only_canonical_text() {
        assert_eq!(HpoNormalizer::canonical("HP:0001251").unwrap().as_str(), "HP:0001251");
        assert_eq!(HpoNormalizer::canonical("BRCA1").unwrap().as_str(), "BRCA1");
        for text in ["hp_1251", "HP:1251", "brca1", " BRCA1", ""] {
            assert!(HpoNormalizer::canonical(text).is_err(), "text = {text:?}");
        }
    }

    proptest! {
        #[test]
        fn numeric_and_text_forms_agree(n in 0u64..=MAX_HPO_ACCESSION) {
            let from_number = phenotype(n).unwrap();
            let from_text = phenotype(format!("HP:{n}")).unwrap();
            prop_assert_eq!(from_number, from_text);
        }

        #[test]
        fn normalization_is_idempotent(n in 0u64..=MAX_HPO_ACCESSION) {
            let once = phenotype(n).unwrap();
            let twice = phenotype(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
