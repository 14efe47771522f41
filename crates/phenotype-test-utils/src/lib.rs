//! Testing utilities for the phenotype legend workspace
//!
//! Shared stubs, fixtures, and tracing setup.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use phenotype_legend::{
    Color, ElementKey, ElementRef, LegendConfig, PhenotypeLegend, RenderSink, ResolutionQueue,
    ResolveError, TermResolver,
};
use phenotype_term::TermId;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Install an env-filtered fmt subscriber once per test binary
///
/// Honours `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn term_id(raw: &str) -> TermId {
    raw.parse().unwrap()
}

/// Resolver stub that counts lookups per term
#[derive(Debug, Default)]
pub struct CountingResolver {
    names: HashMap<TermId, String>,
    calls: Mutex<BTreeMap<TermId, usize>>,
    total: AtomicUsize,
    offline: bool,
}

impl CountingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term(mut self, id: &str, name: &str) -> Self {
        self.names.insert(term_id(id), name.to_string());
        self
    }

    /// Every lookup fails with `ResolveError::Unavailable`
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.calls.lock().get(&term_id(id)).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TermResolver for CountingResolver {
    async fn resolve(&self, id: &TermId) -> Result<Option<String>, ResolveError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().entry(id.clone()).or_default() += 1;

        if self.offline {
            return Err(ResolveError::Unavailable("stub offline".to_string()));
        }
        Ok(self.names.get(id).cloned())
    }
}

/// A rendered legend row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRow {
    pub key: ElementKey,
    pub text: String,
    pub color: Color,
}

/// In-memory rendering surface that records every call
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next: AtomicUsize,
    rows: Mutex<BTreeMap<ElementRef, RecordedRow>>,
    set_text_log: Mutex<Vec<(ElementKey, String)>>,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn row(&self, key: &ElementKey) -> Option<RecordedRow> {
        self.rows.lock().values().find(|row| &row.key == key).cloned()
    }

    pub fn text(&self, key: &ElementKey) -> Option<String> {
        self.row(key).map(|row| row.text)
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn set_text_calls(&self) -> usize {
        self.set_text_log.lock().len()
    }

    pub fn set_text_log(&self) -> Vec<(ElementKey, String)> {
        self.set_text_log.lock().clone()
    }
}

impl RenderSink for RecordingSurface {
    fn find_by_key(&self, key: &ElementKey) -> Option<ElementRef> {
        self.rows
            .lock()
            .iter()
            .find(|(_, row)| &row.key == key)
            .map(|(element, _)| *element)
    }

    fn set_text(&self, element: ElementRef, text: &str) {
        let mut rows = self.rows.lock();
        if let Some(row) = rows.get_mut(&element) {
            row.text = text.to_string();
            self.set_text_log.lock().push((row.key.clone(), text.to_string()));
        }
    }

    fn insert_row(&self, key: &ElementKey, text: &str, color: &Color) -> ElementRef {
        let element = ElementRef(self.next.fetch_add(1, Ordering::SeqCst) as u64);
        self.rows.lock().insert(
            element,
            RecordedRow {
                key: key.clone(),
                text: text.to_string(),
                color: color.clone(),
            },
        );
        element
    }

    fn remove_row(&self, element: ElementRef) {
        self.rows.lock().remove(&element);
    }
}

/// Phenotype legend with default config over a fresh recording surface
pub fn setup_test_legend() -> (PhenotypeLegend, ResolutionQueue, Arc<RecordingSurface>) {
    setup_test_legend_with(LegendConfig::new())
}

pub fn setup_test_legend_with(
    config: LegendConfig,
) -> (PhenotypeLegend, ResolutionQueue, Arc<RecordingSurface>) {
    init_tracing();
    let surface = RecordingSurface::new();
    let (legend, queue) = PhenotypeLegend::new(config, surface.clone()).unwrap();
    (legend, queue, surface)
}
