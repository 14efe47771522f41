//! Phenotype legend
//!
//! Composes the term cache, the base occurrence tracker and the row sync
//! into the legend a pedigree editor talks to.
//!
//! # Workflow
//! 1. `add_case` ensures a cache entry for the term
//! 2. the base tracker records the node and renders a row if needed
//! 3. a placeholder's lookup completes through [`ResolutionSink::complete`]
//! 4. the cache assigns the name, then the row text is updated

use crate::cache::{ResolutionToken, Term, TermCache};
use crate::color::{Color, ColorScheme};
use crate::config::LegendConfig;
use crate::error::LegendResult;
use crate::legend::{Legend, OccurrenceTracker};
use crate::resolver::{ResolutionQueue, ResolutionSink};
use crate::sync::{ElementKey, LegendSync, RenderSink};
use phenotype_term::{HpoNormalizer, IdNormalizer, NodeId, RawTermId, TermError, TermId, TermType};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Legend of phenotype terms attached to pedigree nodes
pub struct PhenotypeLegend {
    config: LegendConfig,
    cache: TermCache,
    base: Arc<dyn OccurrenceTracker>,
    sync: LegendSync,
    colors: Arc<dyn ColorScheme>,
}

impl PhenotypeLegend {
    /// Create legend with the default [`Legend`] tracker and HPO normalizer
    ///
    /// Returns the queue that lookups for new placeholders are submitted to.
    ///
    /// # Errors
    /// [`LegendError::Config`](crate::LegendError::Config) when `config`
    /// does not validate.
    pub fn new(
        config: LegendConfig,
        surface: Arc<dyn RenderSink>,
    ) -> LegendResult<(Self, ResolutionQueue)> {
        config.validate()?;
        let colors = config.color_scheme()?;
        let base = Arc::new(Legend::new(
            config.title.clone(),
            config.element_prefix.clone(),
            Arc::clone(&surface),
            Arc::clone(&colors),
        ));
        Ok(Self::assemble(config, surface, base, Arc::new(HpoNormalizer), colors))
    }

    /// Create legend around a custom tracker and normalizer
    ///
    /// # Errors
    /// [`LegendError::Config`](crate::LegendError::Config) when `config`
    /// does not validate.
    pub fn with_parts(
        config: LegendConfig,
        surface: Arc<dyn RenderSink>,
        base: Arc<dyn OccurrenceTracker>,
        normalizer: Arc<dyn IdNormalizer>,
    ) -> LegendResult<(Self, ResolutionQueue)> {
        config.validate()?;
        let colors = config.color_scheme()?;
        Ok(Self::assemble(config, surface, base, normalizer, colors))
    }

    fn assemble(
        config: LegendConfig,
        surface: Arc<dyn RenderSink>,
        base: Arc<dyn OccurrenceTracker>,
        normalizer: Arc<dyn IdNormalizer>,
        colors: Arc<dyn ColorScheme>,
    ) -> (Self, ResolutionQueue) {
        let (cache, queue) = TermCache::new(TermType::Phenotype, normalizer);
        let sync = LegendSync::new(config.element_prefix.clone(), surface);

        let legend = Self {
            config,
            cache,
            base,
            sync,
            colors,
        };
        (legend, queue)
    }

    /// Heading
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LegendConfig {
        &self.config
    }

    /// Underlying term cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &TermCache {
        &self.cache
    }

    /// Term for `raw`, created as a placeholder if not cached yet
    ///
    /// # Errors
    /// [`TermError::InvalidIdentifier`] for malformed input.
    pub fn term(&self, raw: impl Into<RawTermId>) -> Result<Arc<Term>, TermError> {
        self.cache.get_or_create(raw)
    }

    /// Cache a term whose name is already known; never overwrites
    pub fn add_to_cache(&self, id: TermId, name: impl Into<String>) -> bool {
        self.cache.insert_known(id, name)
    }

    /// Register that `node` carries term `id`
    ///
    /// `id` is first run through the configured normalizer. With a name
    /// the term is cached as known (no-clobber); without one a placeholder
    /// is created and its lookup queued. The base tracker only runs after
    /// the cache entry exists. A name that lands while the row is being
    /// rendered is pushed to the row afterwards.
    ///
    /// # Errors
    /// [`LegendError::Term`](crate::LegendError::Term) when `id` does not
    /// pass the configured normalizer; nothing is cached or rendered.
    pub fn add_case(&self, id: TermId, name: Option<String>, node: NodeId) -> LegendResult<Arc<Term>> {
        let id = self.cache.normalize(&id)?;
        let term = match name {
            Some(name) => self.cache.ensure_known(id, name).0,
            None => self.cache.get_or_create(&id)?,
        };

        let rendered_unresolved = !term.is_resolved();
        tracing::debug!("Recording {} on node {}", term.id(), node);
        self.base.record_occurrence(term.id(), term.display_name(), node);

        if rendered_unresolved && term.is_resolved() {
            self.sync.notify_resolved(&term);
        }
        Ok(term)
    }

    /// Remove `node` from term `id`; the cache entry stays
    pub fn remove_case(&self, id: &TermId, node: NodeId) -> bool {
        self.base.remove_occurrence(id, node)
    }

    /// Nodes currently carrying `id`
    #[must_use]
    pub fn affected_nodes(&self, id: &TermId) -> Vec<NodeId> {
        self.base.affected_nodes(id)
    }

    /// Cached terms that currently have affected nodes, by ID
    #[must_use]
    pub fn current_terms(&self) -> Vec<Arc<Term>> {
        self.base
            .tracked_ids()
            .iter()
            .filter_map(|id| self.cache.get(id))
            .collect()
    }

    /// Swatch color for `id`
    #[inline]
    #[must_use]
    pub fn object_color(&self, id: &TermId) -> Color {
        self.colors.color_for(id)
    }

    /// Key of the rendered row for `id`
    #[inline]
    #[must_use]
    pub fn element_key(&self, id: &TermId) -> ElementKey {
        self.sync.element_key(id)
    }

    /// Assign a looked-up name and refresh the row
    ///
    /// The name is stored before the row is touched. Returns whether this
    /// call assigned the name.
    pub fn complete_resolution(&self, token: &ResolutionToken, name: String) -> bool {
        let Some(term) = self.cache.resolve(token, name) else {
            return false;
        };

        tracing::info!("Resolved {} as '{}'", term.id(), term.display_name());
        self.sync.notify_resolved(&term);
        true
    }
}

impl ResolutionSink for PhenotypeLegend {
    fn complete(&self, token: &ResolutionToken, name: String) -> bool {
        self.complete_resolution(token, name)
    }
}

impl Debug for PhenotypeLegend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhenotypeLegend")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}
