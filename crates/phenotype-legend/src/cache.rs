//! Term cache with deduplicated creation
//!
//! [`TermCache`] is the single owner of every [`Term`]. A lookup for an
//! unknown ID hands back a placeholder immediately and queues exactly one
//! [`ResolutionToken`]; the name arrives later through
//! [`TermCache::resolve`].

use crate::resolver::ResolutionQueue;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use phenotype_term::{HpoNormalizer, IdNormalizer, RawTermId, TermError, TermId, TermType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One phenotype reference
///
/// Only the cache constructs terms. The name is a write-once cell: it goes
/// from absent to present at most once and never changes afterwards.
#[derive(Debug)]
pub struct Term {
    id: TermId,
    name: OnceCell<String>,
    generation: Option<u64>,
}

impl Term {
    fn placeholder(id: TermId, generation: u64) -> Self {
        Self {
            id,
            name: OnceCell::new(),
            generation: Some(generation),
        }
    }

    fn known(id: TermId, name: String) -> Self {
        Self {
            id,
            name: OnceCell::with_value(name),
            generation: None,
        }
    }

    /// Canonical identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &TermId {
        &self.id
    }

    /// Resolved name, if any
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Name, falling back to the canonical ID while unresolved
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or_else(|| self.id.as_str())
    }

    /// Whether a name is present
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.name.get().is_some()
    }

    /// Token of the outstanding lookup, if the name is still pending
    #[must_use]
    pub fn pending_token(&self) -> Option<ResolutionToken> {
        if self.is_resolved() {
            return None;
        }
        self.generation.map(|generation| ResolutionToken {
            id: self.id.clone(),
            generation,
        })
    }
}

/// Handle for one outstanding name lookup
///
/// Issued by the cache when it creates a placeholder. Only a token whose
/// ID and generation match the cached entry can assign a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionToken {
    id: TermId,
    generation: u64,
}

impl ResolutionToken {
    /// Term the lookup is for
    #[inline]
    #[must_use]
    pub fn id(&self) -> &TermId {
        &self.id
    }

    /// Creation generation of the placeholder
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached terms
    pub entries: usize,
    /// Terms with a name
    pub resolved: usize,
    /// Terms still waiting for a name
    pub pending: usize,
    /// Lookups submitted to the resolution queue
    pub requests_issued: u64,
}

/// Canonical ID → term mapping
///
/// Check-then-create runs under the map's entry lock, so concurrent
/// callers racing on the same ID observe one term and one lookup.
#[derive(Debug)]
pub struct TermCache {
    term_type: TermType,
    normalizer: Arc<dyn IdNormalizer>,
    terms: DashMap<TermId, Arc<Term>>,
    next_generation: AtomicU64,
    requests: mpsc::UnboundedSender<ResolutionToken>,
    requests_issued: AtomicU64,
}

impl TermCache {
    /// Create cache for `term_type` using `normalizer`
    ///
    /// Returns the queue on which placeholder lookups are submitted; hand
    /// it to a [`ResolutionWorker`](crate::ResolutionWorker).
    #[must_use]
    pub fn new(term_type: TermType, normalizer: Arc<dyn IdNormalizer>) -> (Self, ResolutionQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cache = Self {
            term_type,
            normalizer,
            terms: DashMap::new(),
            next_generation: AtomicU64::new(1),
            requests: tx,
            requests_issued: AtomicU64::new(0),
        };
        (cache, ResolutionQueue::new(rx))
    }

    /// Create phenotype cache with the HPO normalizer
    #[inline]
    #[must_use]
    pub fn phenotypes() -> (Self, ResolutionQueue) {
        Self::new(TermType::Phenotype, Arc::new(HpoNormalizer))
    }

    /// Term type this cache normalizes for
    #[inline]
    #[must_use]
    pub fn term_type(&self) -> TermType {
        self.term_type
    }

    /// Canonical form of `raw` under this cache's normalizer
    ///
    /// # Errors
    /// [`TermError::InvalidIdentifier`] when `raw` does not normalize.
    pub fn normalize(&self, raw: impl Into<RawTermId>) -> Result<TermId, TermError> {
        self.normalizer.normalize(self.term_type, &raw.into())
    }

    /// Look up a term, creating a placeholder on first sight
    ///
    /// A new placeholder has no name and one lookup is queued for it.
    /// Existing entries are returned untouched.
    ///
    /// # Errors
    /// [`TermError::InvalidIdentifier`] when `raw` does not normalize; the
    /// cache is left unchanged.
    pub fn get_or_create(&self, raw: impl Into<RawTermId>) -> Result<Arc<Term>, TermError> {
        let id = self.normalize(raw)?;

        let (term, token) = match self.terms.entry(id) {
            Entry::Occupied(entry) => {
                tracing::trace!("Term cache hit: {}", entry.key());
                return Ok(Arc::clone(entry.get()));
            }
            Entry::Vacant(entry) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let term = Arc::new(Term::placeholder(entry.key().clone(), generation));
                let token = ResolutionToken {
                    id: entry.key().clone(),
                    generation,
                };
                entry.insert(Arc::clone(&term));
                (term, token)
            }
        };

        tracing::debug!("Created placeholder for {} (generation {})", token.id, token.generation);
        self.submit(token);
        Ok(term)
    }

    /// Insert a term whose name is already known
    ///
    /// No-op if an entry exists, whether resolved or pending. Returns
    /// whether a new entry was created.
    pub fn insert_known(&self, id: TermId, name: impl Into<String>) -> bool {
        self.ensure_known(id, name.into()).1
    }

    pub(crate) fn ensure_known(&self, id: TermId, name: String) -> (Arc<Term>, bool) {
        match self.terms.entry(id) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let term = Arc::new(Term::known(entry.key().clone(), name));
                entry.insert(Arc::clone(&term));
                tracing::debug!("Cached known term {}", term.id);
                (term, true)
            }
        }
    }

    /// Read an entry without creating one
    #[inline]
    #[must_use]
    pub fn get(&self, id: &TermId) -> Option<Arc<Term>> {
        self.terms.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if the cache has an entry for `id`
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &TermId) -> bool {
        self.terms.contains_key(id)
    }

    /// Assign the name a lookup produced
    ///
    /// Returns the term only when this call moved it from unnamed to named,
    /// which is the single point where notification should follow. Stale or
    /// foreign tokens, already named terms and blank names yield `None`.
    pub fn resolve(&self, token: &ResolutionToken, name: impl Into<String>) -> Option<Arc<Term>> {
        let name = name.into();
        if name.trim().is_empty() {
            tracing::debug!("Ignoring blank name for {}", token.id);
            return None;
        }

        let term = self.get(&token.id)?;
        if term.generation != Some(token.generation) {
            tracing::debug!(
                "Stale resolution token for {} (generation {})",
                token.id,
                token.generation
            );
            return None;
        }

        term.name.set(name).ok()?;
        Some(term)
    }

    /// Canonical IDs currently cached, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<TermId> {
        let mut ids: Vec<TermId> = self.terms.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of cached terms
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the cache is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Counter snapshot
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let resolved = self.terms.iter().filter(|entry| entry.is_resolved()).count();
        let entries = self.terms.len();
        CacheStats {
            entries,
            resolved,
            pending: entries.saturating_sub(resolved),
            requests_issued: self.requests_issued.load(Ordering::Relaxed),
        }
    }

    fn submit(&self, token: ResolutionToken) {
        let id = token.id.clone();
        if self.requests.send(token).is_err() {
            tracing::warn!("Resolution queue closed; {} stays unresolved", id);
            return;
        }
        self.requests_issued.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> TermId {
        s.parse().unwrap()
    }

    #[test]
    fn get_or_create_returns_same_term() {
        let (cache, mut queue) = TermCache::phenotypes();

        let a = cache.get_or_create("HP:0001251").unwrap();
        let b = cache.get_or_create("hp_1251").unwrap();
        let c = cache.get_or_create(1251u32).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 1);
        assert!(a.name().is_none());

        let token = queue.try_next().unwrap();
        assert_eq!(token.id(), &id("HP:0001251"));
        assert!(queue.try_next().is_none());
        assert_eq!(cache.stats().requests_issued, 1);
    }

    #[test]
    fn get_or_create_rejects_invalid_id() {
        let (cache, mut queue) = TermCache::phenotypes();
        cache.get_or_create("HP:0000118").unwrap();

        let result = cache.get_or_create("not-an-id");
        assert!(matches!(result, Err(TermError::InvalidIdentifier { .. })));
        assert_eq!(cache.len(), 1);

        assert!(queue.try_next().is_some());
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn insert_known_does_not_clobber() {
        let (cache, _queue) = TermCache::phenotypes();
        let key = id("HP:0001251");

        assert!(cache.insert_known(key.clone(), "A"));
        assert!(!cache.insert_known(key.clone(), "B"));

        assert_eq!(cache.get(&key).unwrap().name(), Some("A"));
    }

    #[test]
    fn insert_known_keeps_pending_placeholder() {
        let (cache, mut queue) = TermCache::phenotypes();
        let placeholder = cache.get_or_create("HP:0001251").unwrap();

        assert!(!cache.insert_known(id("HP:0001251"), "Ataxia"));
        assert!(placeholder.name().is_none());

        let token = queue.try_next().unwrap();
        let resolved = cache.resolve(&token, "Ataxia").unwrap();
        assert!(Arc::ptr_eq(&placeholder, &resolved));
    }

    #[test]
    fn insert_known_skips_resolution_queue() {
        let (cache, mut queue) = TermCache::phenotypes();
        cache.insert_known(id("HP:0001251"), "Ataxia");

        let term = cache.get_or_create("HP:0001251").unwrap();
        assert_eq!(term.name(), Some("Ataxia"));
        assert!(term.pending_token().is_none());
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn resolve_assigns_name_once() {
        let (cache, mut queue) = TermCache::phenotypes();
        let term = cache.get_or_create("HP:0001251").unwrap();
        let token = queue.try_next().unwrap();
        assert_eq!(term.pending_token(), Some(token.clone()));

        assert!(cache.resolve(&token, "Ataxia").is_some());
        assert!(cache.resolve(&token, "Something else").is_none());

        assert_eq!(term.name(), Some("Ataxia"));
        assert!(term.pending_token().is_none());
    }

    #[test]
    fn resolve_ignores_foreign_and_blank() {
        let (cache, mut queue) = TermCache::phenotypes();
        let (other, mut other_queue) = TermCache::phenotypes();

        // Generation 1 in both caches, but a different term in the other one
        other.get_or_create("HP:0000118").unwrap();
        let foreign = other_queue.try_next().unwrap();

        let term = cache.get_or_create("HP:0001251").unwrap();
        let token = queue.try_next().unwrap();

        assert!(cache.resolve(&foreign, "Phenotypic abnormality").is_none());
        assert!(cache.resolve(&token, "   ").is_none());
        assert!(term.name().is_none());
    }

    #[test]
    fn resolve_rejects_token_for_known_term() {
        let (cache, _queue) = TermCache::phenotypes();
        let (other, mut other_queue) = TermCache::phenotypes();

        cache.insert_known(id("HP:0001251"), "Ataxia");
        other.get_or_create("HP:0001251").unwrap();
        let token = other_queue.try_next().unwrap();

        assert!(cache.resolve(&token, "Renamed").is_none());
        assert_eq!(cache.get(&id("HP:0001251")).unwrap().name(), Some("Ataxia"));
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let (cache, _queue) = TermCache::phenotypes();
        let term = cache.get_or_create(118u32).unwrap();
        assert_eq!(term.display_name(), "HP:0000118");
    }

    #[test]
    fn stats_and_ids() {
        let (cache, mut queue) = TermCache::phenotypes();
        cache.get_or_create("HP:0000118").unwrap();
        cache.get_or_create("HP:0001251").unwrap();
        cache.insert_known(id("HP:0000001"), "All");

        let first = queue.try_next().unwrap();
        cache.resolve(&first, "Phenotypic abnormality");

        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 3,
                resolved: 2,
                pending: 1,
                requests_issued: 2,
            }
        );
        assert_eq!(
            cache.ids(),
            vec![id("HP:0000001"), id("HP:0000118"), id("HP:0001251")]
        );
        assert!(cache.get(&id("HP:0009999")).is_none());
    }

    #[test]
    fn closed_queue_keeps_placeholder() {
        let (cache, queue) = TermCache::phenotypes();
        drop(queue);

        let term = cache.get_or_create("HP:0001251").unwrap();
        assert!(term.name().is_none());
        assert_eq!(cache.stats().requests_issued, 0);
    }

    #[test]
    fn concurrent_get_or_create_issues_one_request() {
        let (cache, mut queue) = TermCache::phenotypes();
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_create("HP:0001251").unwrap())
            })
            .collect();

        let terms: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(terms.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert!(queue.try_next().is_some());
        assert!(queue.try_next().is_none());
    }
}
