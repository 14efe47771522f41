//! Resolution Protocol Tests
//!
//! Placeholder creation, deduplicated lookups and single notification,
//! driven through a counting resolver and a recording surface.
//!
use phenotype_legend::prelude::*;
use phenotype_legend::WorkerStats;
use phenotype_test_utils::{setup_test_legend, term_id, CountingResolver};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn test_repeated_lookup_returns_same_term_and_one_request() {
    let (legend, queue, _surface) = setup_test_legend();
    let resolver = Arc::new(CountingResolver::new().with_term("HP:0001251", "Ataxia"));
    let mut worker = ResolutionWorker::new(Arc::clone(&resolver), queue);

    let first = legend.term("HP:0001251").unwrap();
    let second = legend.term("hp_0001251").unwrap();
    let third = legend.term(1251u32).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &third));

    worker.drain(&legend).await;

    assert_eq!(resolver.total_calls(), 1);
    assert_eq!(resolver.calls_for("HP:0001251"), 1);
    assert_eq!(first.name(), Some("Ataxia"));

    // Lookups after resolution hit the cache only
    legend.term("HP:0001251").unwrap();
    worker.drain(&legend).await;
    assert_eq!(resolver.total_calls(), 1);
}

#[tokio::test]
async fn test_resolution_updates_row_exactly_once() {
    let (legend, queue, surface) = setup_test_legend();
    let resolver = Arc::new(CountingResolver::new().with_term("HP:0001251", "Ataxia"));
    let mut worker = ResolutionWorker::new(resolver, queue);
    let ataxia = term_id("HP:0001251");

    legend.add_case(ataxia.clone(), None, NodeId(1)).unwrap();
    legend.add_case(ataxia.clone(), None, NodeId(2)).unwrap();

    let stats = worker.drain(&legend).await;
    assert_eq!(
        stats,
        WorkerStats {
            processed: 1,
            resolved: 1,
            unknown: 0,
            failed: 0,
        }
    );

    assert_eq!(legend.cache().get(&ataxia).unwrap().name(), Some("Ataxia"));
    assert_eq!(surface.set_text_calls(), 1);
    assert_eq!(
        surface.set_text_log(),
        vec![(legend.element_key(&ataxia), "Ataxia".to_string())]
    );
}

#[tokio::test]
async fn test_resolution_without_row_is_silent() {
    let (legend, queue, surface) = setup_test_legend();
    let resolver = Arc::new(CountingResolver::new().with_term("HP:0001251", "Ataxia"));
    let mut worker = ResolutionWorker::new(resolver, queue);

    let term = legend.term("HP:0001251").unwrap();
    let stats = worker.drain(&legend).await;

    assert_eq!(stats.resolved, 1);
    assert_eq!(term.name(), Some("Ataxia"));
    assert_eq!(surface.row_count(), 0);
    assert_eq!(surface.set_text_calls(), 0);
}

#[tokio::test]
async fn test_invalid_identifier_leaves_cache_unchanged() {
    let (legend, queue, _surface) = setup_test_legend();
    legend.term("HP:0000118").unwrap();

    let err = legend.term("HP:12x").unwrap_err();
    assert!(matches!(err, TermError::InvalidIdentifier { .. }));
    assert_eq!(legend.cache().len(), 1);
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_no_clobber_insert() {
    let (legend, _queue, _surface) = setup_test_legend();
    let id = term_id("HP:0001251");

    legend.add_to_cache(id.clone(), "A");
    legend.add_to_cache(id.clone(), "B");

    assert_eq!(legend.cache().get(&id).unwrap().name(), Some("A"));
}

#[tokio::test]
async fn test_end_to_end_case_registration() {
    let (legend, queue, surface) = setup_test_legend();
    let resolver = Arc::new(CountingResolver::new().with_term("HP:0001251", "Ataxia"));
    let mut worker = ResolutionWorker::new(resolver, queue);
    let ataxia = term_id("HP:0001251");

    assert!(legend.cache().is_empty());
    legend.add_case(ataxia.clone(), None, NodeId(7)).unwrap();

    let cached = legend.cache().get(&ataxia).unwrap();
    assert_eq!(cached.name(), None);
    assert_eq!(legend.affected_nodes(&ataxia), vec![NodeId(7)]);
    assert_eq!(
        surface.text(&legend.element_key(&ataxia)).as_deref(),
        Some("HP:0001251")
    );

    worker.drain(&legend).await;

    assert_eq!(legend.cache().get(&ataxia).unwrap().name(), Some("Ataxia"));
    assert_eq!(
        surface.text(&legend.element_key(&ataxia)).as_deref(),
        Some("Ataxia")
    );
}

#[tokio::test]
async fn test_unknown_and_failed_lookups_stay_unresolved() {
    let (legend, queue, surface) = setup_test_legend();
    let mut worker = ResolutionWorker::new(Arc::new(CountingResolver::offline()), queue);
    let id = term_id("HP:0001251");

    legend.add_case(id.clone(), None, NodeId(1)).unwrap();
    let stats = worker.drain(&legend).await;

    assert_eq!(stats.failed, 1);
    assert!(legend.cache().get(&id).unwrap().name().is_none());
    assert_eq!(surface.text(&legend.element_key(&id)).as_deref(), Some("HP:0001251"));
    assert_eq!(surface.set_text_calls(), 0);
}

#[tokio::test]
async fn test_spawned_worker_resolves_in_background() {
    let (legend, queue, surface) = setup_test_legend();
    let legend = Arc::new(legend);
    let resolver = Arc::new(
        CountingResolver::new()
            .with_term("HP:0001251", "Ataxia")
            .with_term("HP:0001250", "Seizure"),
    );
    let handle = tokio::spawn(ResolutionWorker::new(Arc::clone(&resolver), queue).run(Arc::clone(&legend)));

    legend.add_case(term_id("HP:0001251"), None, NodeId(1)).unwrap();
    legend.add_case(term_id("HP:0001250"), None, NodeId(2)).unwrap();

    for _ in 0..100 {
        if legend.cache().stats().pending == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }

    assert_eq!(legend.cache().stats().resolved, 2);
    assert_eq!(surface.set_text_calls(), 2);
    assert_eq!(resolver.total_calls(), 2);

    // Dropping the last legend handle closes the queue and ends the worker
    drop(legend);
    let stats = handle.await.unwrap();
    assert_eq!(stats.resolved, 2);
}
