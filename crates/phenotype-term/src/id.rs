//! Term identities
//!
//! Provides [`TermId`] (canonical cache key), [`RawTermId`] (whatever the
//! caller handed in) and [`NodeId`] (pedigree individual).

use crate::error::TermError;
use crate::normalize::{HpoNormalizer, IdNormalizer};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Kind of term an identifier belongs to
///
/// Selects which normalization rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermType {
    /// Human Phenotype Ontology term
    Phenotype,

    /// Gene symbol
    Gene,
}

impl TermType {
    /// Lowercase label
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phenotype => "phenotype",
            Self::Gene => "gene",
        }
    }
}

impl Display for TermType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical term identifier
///
/// Only produced by an [`IdNormalizer`] or by parsing, so two equal
/// `TermId`s always refer to the same term within a session.
///
/// Serialized as the canonical string. Deserialization accepts canonical
/// text of any term type unchanged and rejects everything else, so gene
/// symbols survive a round trip.
///
/// # Example
/// ```
/// use phenotype_term::TermId;
///
/// let id: TermId = "hp_1251".parse().unwrap();
/// assert_eq!(id.as_str(), "HP:0001251");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct TermId(String);

impl TermId {
    /// Wrap an already canonical value
    ///
    /// Callers go through a normalizer; this is the normalizer's exit point.
    #[inline]
    pub(crate) fn from_canonical(canonical: String) -> Self {
        Self(canonical)
    }

    /// Canonical string form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TermId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parses with phenotype rules
impl FromStr for TermId {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HpoNormalizer.normalize(TermType::Phenotype, &RawTermId::from(s))
    }
}

impl<'de> Deserialize<'de> for TermId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        HpoNormalizer::canonical(&text).map_err(serde::de::Error::custom)
    }
}

/// Parses with phenotype rules, like [`FromStr`]
impl TryFrom<String> for TermId {
    type Error = TermError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TermId> for String {
    fn from(id: TermId) -> Self {
        id.0
    }
}

/// Identifier in any caller-supplied form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawTermId {
    /// Textual form, e.g. `"HP:0001251"` or `"hp_1251"`
    Text(String),

    /// Numeric form, e.g. `1251`
    Number(u64),
}

impl Display for RawTermId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RawTermId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawTermId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&TermId> for RawTermId {
    fn from(value: &TermId) -> Self {
        Self::Text(value.0.clone())
    }
}

impl From<u32> for RawTermId {
    fn from(value: u32) -> Self {
        Self::Number(u64::from(value))
    }
}

impl From<u64> for RawTermId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

/// Pedigree individual identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
