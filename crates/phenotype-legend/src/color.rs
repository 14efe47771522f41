//! Legend swatch colors
//!
//! The base legend paints every term with one constant color. Schemes that
//! tell terms apart plug in through [`ColorScheme`].

use crate::error::ConfigError;
use phenotype_term::TermId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};

/// Swatch color used when nothing else is configured
pub const DEFAULT_COLOR: &str = "#CCCCCC";

/// CSS hex color (`#RGB` or `#RRGGBB`), stored uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse a hex color
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] unless the value is `#` followed by
    /// three or six hex digits.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let digits = value
            .strip_prefix('#')
            .ok_or_else(|| ConfigError::invalid("color", format!("'{value}' must start with '#'")))?;

        if !matches!(digits.len(), 3 | 6) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::invalid(
                "color",
                format!("'{value}' is not a #RGB or #RRGGBB color"),
            ));
        }

        Ok(Self(value.to_ascii_uppercase()))
    }

    /// CSS form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(DEFAULT_COLOR.to_string())
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// Picks the swatch color for a term
pub trait ColorScheme: Debug + Send + Sync {
    /// Color for the given term
    fn color_for(&self, id: &TermId) -> Color;
}

/// Same color for every term
#[derive(Debug, Clone, Default)]
pub struct UniformColor(Color);

impl UniformColor {
    /// Create scheme from a single color
    #[inline]
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self(color)
    }
}

impl ColorScheme for UniformColor {
    fn color_for(&self, _id: &TermId) -> Color {
        self.0.clone()
    }
}

/// Stable per-term pick from a fixed palette
///
/// The same ID always maps to the same palette entry (FNV-1a over the
/// canonical ID), independent of insertion order.
#[derive(Debug, Clone)]
pub struct PaletteColor {
    palette: Vec<Color>,
}

impl PaletteColor {
    /// Create scheme from a non-empty palette
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for an empty palette.
    pub fn new(palette: Vec<Color>) -> Result<Self, ConfigError> {
        if palette.is_empty() {
            return Err(ConfigError::invalid("palette", "must contain at least one color"));
        }
        Ok(Self { palette })
    }

    /// Number of colors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.palette.len()
    }

    /// Always false; construction rejects empty palettes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.palette.is_empty()
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

impl ColorScheme for PaletteColor {
    #[allow(clippy::cast_possible_truncation)]
    fn color_for(&self, id: &TermId) -> Color {
        let slot = (fnv1a(id.as_str().as_bytes()) % self.palette.len() as u64) as usize;
        self.palette[slot].clone()
    }
}
