//! Base legend: which pedigree nodes carry which term
//!
//! [`Legend`] keeps one rendered row per term that has at least one
//! affected node. Specialised legends compose it through
//! [`OccurrenceTracker`] instead of overriding it.

use crate::color::ColorScheme;
use crate::sync::{ElementKey, ElementRef, RenderSink};
use parking_lot::Mutex;
use phenotype_term::{NodeId, TermId};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Occurrence bookkeeping shared by all legends
pub trait OccurrenceTracker: Send + Sync {
    /// Record that `node` carries term `id`, rendering a row labelled
    /// `name` if this is the term's first node
    fn record_occurrence(&self, id: &TermId, name: &str, node: NodeId);

    /// Drop `node` from term `id`; the row goes away with the last node
    ///
    /// Returns whether the node was recorded for the term.
    fn remove_occurrence(&self, id: &TermId, node: NodeId) -> bool;

    /// Nodes currently carrying `id`, ascending
    fn affected_nodes(&self, id: &TermId) -> Vec<NodeId>;

    /// Terms with at least one node, ascending
    fn tracked_ids(&self) -> Vec<TermId>;
}

#[derive(Debug)]
struct Occurrences {
    element: ElementRef,
    nodes: BTreeSet<NodeId>,
}

/// Default occurrence tracker rendering rows through a [`RenderSink`]
pub struct Legend {
    title: String,
    prefix: String,
    surface: Arc<dyn RenderSink>,
    colors: Arc<dyn ColorScheme>,
    affected: Mutex<BTreeMap<TermId, Occurrences>>,
}

impl Legend {
    /// Create legend
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        prefix: impl Into<String>,
        surface: Arc<dyn RenderSink>,
        colors: Arc<dyn ColorScheme>,
    ) -> Self {
        Self {
            title: title.into(),
            prefix: prefix.into(),
            surface,
            colors,
            affected: Mutex::new(BTreeMap::new()),
        }
    }

    /// Heading
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Row key prefix
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of rendered rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.affected.lock().len()
    }
}

impl OccurrenceTracker for Legend {
    fn record_occurrence(&self, id: &TermId, name: &str, node: NodeId) {
        if let Some(entry) = self.affected.lock().get_mut(id) {
            entry.nodes.insert(node);
            return;
        }

        // The surface is called without holding `affected`
        let key = ElementKey::new(&self.prefix, id);
        let color = self.colors.color_for(id);
        tracing::debug!("Rendering legend row {} ({})", key, color);
        let element = self.surface.insert_row(&key, name, &color);

        let duplicate = match self.affected.lock().entry(id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().nodes.insert(node);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(Occurrences {
                    element,
                    nodes: BTreeSet::from([node]),
                });
                false
            }
        };
        if duplicate {
            tracing::debug!("Legend row {} rendered concurrently; dropping duplicate", key);
            self.surface.remove_row(element);
        }
    }

    fn remove_occurrence(&self, id: &TermId, node: NodeId) -> bool {
        let removed = {
            let mut affected = self.affected.lock();
            let Some(entry) = affected.get_mut(id) else {
                return false;
            };
            if !entry.nodes.remove(&node) {
                return false;
            }
            if entry.nodes.is_empty() {
                affected.remove(id)
            } else {
                None
            }
        };

        if let Some(entry) = removed {
            tracing::debug!("Removing legend row for {}", id);
            self.surface.remove_row(entry.element);
        }
        true
    }

    fn affected_nodes(&self, id: &TermId) -> Vec<NodeId> {
        self.affected
            .lock()
            .get(id)
            .map(|entry| entry.nodes.iter().copied().collect())
            .unwrap_or_default()
    }

    fn tracked_ids(&self) -> Vec<TermId> {
        self.affected.lock().keys().cloned().collect()
    }
}

impl Debug for Legend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Legend")
            .field("title", &self.title)
            .field("prefix", &self.prefix)
            .field("colors", &self.colors)
            .field("rows", &self.row_count())
            .finish_non_exhaustive()
    }
}
