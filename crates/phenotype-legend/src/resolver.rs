//! Asynchronous name resolution
//!
//! Provides:
//! - [`TermResolver`]: the terminology lookup contract
//! - [`ResolutionQueue`]: lookups submitted by a [`TermCache`](crate::TermCache)
//! - [`ResolutionWorker`]: drives lookups and hands names back to a [`ResolutionSink`]
//! - [`StaticTerminology`]: in-memory local store

use crate::cache::ResolutionToken;
use crate::error::ResolveError;
use async_trait::async_trait;
use phenotype_term::TermId;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

/// Terminology lookup
#[async_trait]
pub trait TermResolver: Send + Sync {
    /// Fetch the display name for `id`
    ///
    /// `Ok(None)` means the source does not know the term.
    ///
    /// # Errors
    /// Returns [`ResolveError`] when the source fails; the worker logs it
    /// and leaves the term unresolved.
    async fn resolve(&self, id: &TermId) -> Result<Option<String>, ResolveError>;
}

/// Receiver of completed lookups
pub trait ResolutionSink: Send + Sync {
    /// Deliver `name` for the lookup identified by `token`
    ///
    /// Returns whether the name was assigned by this call.
    fn complete(&self, token: &ResolutionToken, name: String) -> bool;
}

/// Lookups waiting for a worker
#[derive(Debug)]
pub struct ResolutionQueue {
    rx: mpsc::UnboundedReceiver<ResolutionToken>,
}

impl ResolutionQueue {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<ResolutionToken>) -> Self {
        Self { rx }
    }

    /// Wait for the next lookup; `None` once every cache handle is gone
    pub async fn next(&mut self) -> Option<ResolutionToken> {
        self.rx.recv().await
    }

    /// Take a queued lookup without waiting
    pub fn try_next(&mut self) -> Option<ResolutionToken> {
        self.rx.try_recv().ok()
    }

    /// Number of queued lookups
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Check if nothing is queued
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Outcome counters for a worker pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Lookups taken from the queue
    pub processed: usize,
    /// Names the sink accepted
    pub resolved: usize,
    /// Terms the source did not know
    pub unknown: usize,
    /// Lookups that failed
    pub failed: usize,
}

/// Drives queued lookups through a resolver
///
/// # Example
///
/// ```rust,ignore
/// let (legend, queue) = PhenotypeLegend::new(LegendConfig::new(), surface)?;
/// let legend = Arc::new(legend);
/// let worker = ResolutionWorker::new(Arc::new(terminology), queue);
/// tokio::spawn(worker.run(Arc::clone(&legend)));
/// ```
pub struct ResolutionWorker<R: ?Sized> {
    resolver: Arc<R>,
    queue: ResolutionQueue,
}

impl<R: TermResolver + ?Sized> ResolutionWorker<R> {
    /// Create worker
    #[inline]
    #[must_use]
    pub fn new(resolver: Arc<R>, queue: ResolutionQueue) -> Self {
        Self { resolver, queue }
    }

    /// Process lookups until the queue closes or the sink is dropped
    ///
    /// Only a weak reference to `sink` is kept, so the worker does not keep
    /// the legend (and with it the queue) alive.
    pub async fn run<S>(mut self, sink: Arc<S>) -> WorkerStats
    where
        S: ResolutionSink + ?Sized,
    {
        let sink: Weak<S> = Arc::downgrade(&sink);
        let mut stats = WorkerStats::default();

        while let Some(token) = self.queue.next().await {
            let Some(sink) = sink.upgrade() else {
                tracing::debug!("Resolution sink dropped; stopping worker");
                break;
            };
            self.process(&token, sink.as_ref(), &mut stats).await;
        }

        tracing::debug!("Resolution worker finished: {:?}", stats);
        stats
    }

    /// Process only what is already queued, then return
    pub async fn drain<S>(&mut self, sink: &S) -> WorkerStats
    where
        S: ResolutionSink + ?Sized,
    {
        let mut stats = WorkerStats::default();
        while let Some(token) = self.queue.try_next() {
            self.process(&token, sink, &mut stats).await;
        }
        stats
    }

    /// Queued lookups
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    async fn process<S>(&self, token: &ResolutionToken, sink: &S, stats: &mut WorkerStats)
    where
        S: ResolutionSink + ?Sized,
    {
        stats.processed += 1;
        match self.resolver.resolve(token.id()).await {
            Ok(Some(name)) => {
                if sink.complete(token, name) {
                    stats.resolved += 1;
                }
            }
            Ok(None) => {
                tracing::debug!("No name known for {}", token.id());
                stats.unknown += 1;
            }
            Err(e) => {
                tracing::warn!("Lookup for {} failed: {}", token.id(), e);
                stats.failed += 1;
            }
        }
    }
}

/// In-memory terminology store
#[derive(Debug, Clone, Default)]
pub struct StaticTerminology {
    names: HashMap<TermId, String>,
}

impl StaticTerminology {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With one term
    #[inline]
    #[must_use]
    pub fn with_term(mut self, id: TermId, name: impl Into<String>) -> Self {
        self.names.insert(id, name.into());
        self
    }

    /// Load from a JSON object of `"<id>": "<name>"` pairs
    ///
    /// Keys are normalized with the phenotype rules.
    ///
    /// # Errors
    /// [`ResolveError::Malformed`] when the document is not such an object
    /// or a key is not a valid identifier.
    pub fn from_json_str(json: &str) -> Result<Self, ResolveError> {
        let raw: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| ResolveError::Malformed(e.to_string()))?;
        let names = raw
            .into_iter()
            .map(|(key, name)| {
                let id = key
                    .parse::<TermId>()
                    .map_err(|e| ResolveError::Malformed(e.to_string()))?;
                Ok((id, name))
            })
            .collect::<Result<HashMap<_, _>, ResolveError>>()?;
        Ok(Self { names })
    }

    /// Number of known terms
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[async_trait]
impl TermResolver for StaticTerminology {
    async fn resolve(&self, id: &TermId) -> Result<Option<String>, ResolveError> {
        Ok(self.names.get(id).cloned())
    }
}
