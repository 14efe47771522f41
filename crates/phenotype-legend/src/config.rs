//! Legend configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.

use crate::color::{Color, ColorScheme, PaletteColor, UniformColor, DEFAULT_COLOR};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Phenotype legend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    /// Heading shown above the legend rows
    pub title: String,
    /// Prefix of rendered row keys (`<prefix>-<term id>`)
    pub element_prefix: String,
    /// Swatch color when no palette is set
    pub default_color: String,
    /// Optional palette; terms get a stable entry each
    pub palette: Option<Vec<String>>,
}

impl LegendConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed TOML, [`ConfigError::Invalid`]
    /// when a value fails [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// With row key prefix
    #[inline]
    #[must_use]
    pub fn with_element_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.element_prefix = prefix.into();
        self
    }

    /// With default swatch color
    #[inline]
    #[must_use]
    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    /// With palette
    #[inline]
    #[must_use]
    pub fn with_palette<I, S>(mut self, palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.palette = Some(palette.into_iter().map(Into::into).collect());
        self
    }

    /// Check field bounds
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for an empty or whitespace-bearing
    /// prefix, or for any color that is not `#RGB`/`#RRGGBB`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.element_prefix.is_empty() {
            return Err(ConfigError::invalid("element_prefix", "must not be empty"));
        }
        if self.element_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::invalid("element_prefix", "must not contain whitespace"));
        }
        Color::parse(&self.default_color)?;
        if let Some(palette) = &self.palette {
            if palette.is_empty() {
                return Err(ConfigError::invalid("palette", "must contain at least one color"));
            }
            for entry in palette {
                Color::parse(entry)?;
            }
        }
        Ok(())
    }

    /// Build the color scheme this config describes
    ///
    /// # Errors
    /// Same conditions as [`validate`](Self::validate).
    pub fn color_scheme(&self) -> Result<Arc<dyn ColorScheme>, ConfigError> {
        match &self.palette {
            Some(palette) => {
                let colors = palette
                    .iter()
                    .map(|c| Color::parse(c))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Arc::new(PaletteColor::new(colors)?))
            }
            None => Ok(Arc::new(UniformColor::new(Color::parse(&self.default_color)?))),
        }
    }
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            title: "Phenotypes".to_string(),
            element_prefix: "phenotype".to_string(),
            default_color: DEFAULT_COLOR.to_string(),
            palette: None,
        }
    }
}
