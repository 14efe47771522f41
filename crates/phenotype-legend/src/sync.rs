//! Rendered-row synchronisation
//!
//! The legend never touches a UI toolkit directly; rows live behind a
//! [`RenderSink`]. [`LegendSync`] pushes resolved names into whatever row
//! currently shows a term.

use crate::cache::Term;
use crate::color::Color;
use phenotype_term::TermId;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Key of a rendered legend row: `<prefix>-<term id>`
///
/// Canonical IDs never contain whitespace and the prefix is fixed per
/// legend, so distinct terms never share a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementKey(String);

impl ElementKey {
    /// Build key for `id` under `prefix`
    #[inline]
    #[must_use]
    pub fn new(prefix: &str, id: &TermId) -> Self {
        Self(format!("{prefix}-{id}"))
    }

    /// String form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ElementKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle to a rendered row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementRef(pub u64);

/// Rendering surface holding legend rows
pub trait RenderSink: Send + Sync {
    /// Find the row rendered under `key`
    fn find_by_key(&self, key: &ElementKey) -> Option<ElementRef>;

    /// Replace the name text of a row
    fn set_text(&self, element: ElementRef, text: &str);

    /// Add a row with swatch color and name text
    fn insert_row(&self, key: &ElementKey, text: &str, color: &Color) -> ElementRef;

    /// Remove a row
    fn remove_row(&self, element: ElementRef);
}

/// Notification path from resolved terms to rendered rows
#[derive(Clone)]
pub struct LegendSync {
    prefix: String,
    surface: Arc<dyn RenderSink>,
}

impl LegendSync {
    /// Create sync for rows keyed under `prefix`
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<String>, surface: Arc<dyn RenderSink>) -> Self {
        Self {
            prefix: prefix.into(),
            surface,
        }
    }

    /// Row key prefix
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the row for `id`
    #[inline]
    #[must_use]
    pub fn element_key(&self, id: &TermId) -> ElementKey {
        ElementKey::new(&self.prefix, id)
    }

    /// Show the resolved name of `term` in its row
    ///
    /// Returns `false` when the term has no name yet or no row is rendered
    /// for it. Safe to repeat.
    pub fn notify_resolved(&self, term: &Term) -> bool {
        let Some(name) = term.name() else {
            tracing::debug!("Skipping notification for unresolved {}", term.id());
            return false;
        };

        let key = self.element_key(term.id());
        match self.surface.find_by_key(&key) {
            Some(element) => {
                self.surface.set_text(element, name);
                true
            }
            None => {
                tracing::debug!("No rendered row for {}; name kept in cache only", key);
                false
            }
        }
    }
}

impl Debug for LegendSync {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegendSync")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
