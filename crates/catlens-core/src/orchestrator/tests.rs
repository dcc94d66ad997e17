//! Orchestrator cycles against an in-memory background.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

use crate::background::{Background, Sender};
use crate::cache::MappingCache;
use crate::dom::{Document, NodeId, APPLIED_ATTR};
use crate::lookup::{BatchLookup, LookupConfig};
use crate::search::scripted::ScriptedTransport;
use crate::store::StateStore;

use super::{Orchestrator, OrchestratorConfig, PageEvent, Trigger};

async fn background(transport: Arc<ScriptedTransport>, enabled: bool) -> Arc<Background> {
    let lookup = BatchLookup::new(
        transport,
        LookupConfig {
            batch_delay: Duration::from_millis(1),
            ..LookupConfig::default()
        },
    );
    let bg = Background::new(StateStore::in_memory(), lookup, None);
    bg.handle(
        &Sender::local(),
        json!({
            "type": "SAVE_CONFIG",
            "config": {
                "appId": "APP1",
                "apiKey": "key",
                "indexName": "products",
                "filterField": "categoryId",
                "categoryPaths": "categories",
                "enabled": enabled
            }
        }),
    )
    .await;
    Arc::new(bg)
}

/// `<li role=treeitem><button>63</button></li>`; returns the text node.
fn tree_page(id: &str) -> (Document, NodeId) {
    let mut doc = Document::new();
    let li = doc.append_element(doc.root(), "li", &[("role", "treeitem")]);
    let button = doc.append_element(li, "button", &[]);
    let text = doc.append_text(button, id);
    (doc, text)
}

fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        debounce: Duration::from_millis(50),
        max_retries: 2,
        retry_interval: Duration::from_millis(20),
        max_ids_per_cycle: 100,
    }
}

fn orchestrator(bg: Arc<Background>, doc: Document) -> Orchestrator {
    Orchestrator::new(bg, Sender::local(), Arc::new(Mutex::new(doc)), fast_config())
}

#[tokio::test]
async fn tree_item_is_rewritten_then_left_alone() {
    let transport = Arc::new(ScriptedTransport::with_catalog(&[("63", "Tech & Audio")]));
    let bg = background(transport.clone(), true).await;
    let (doc, text) = tree_page("63");
    let orch = orchestrator(bg.clone(), doc);

    let first = orch.run_cycle(Trigger::PageLoad).await;
    assert_eq!(first.requested, 1);
    assert_eq!(first.applied, 1);
    {
        let doc = orch.document();
        let doc = doc.lock().await;
        assert_eq!(doc.text_content(text), "Tech & Audio (63)");
        let button = doc.parent_element(text).unwrap();
        assert_eq!(doc.attr(button, APPLIED_ATTR), Some("true"));
    }
    assert!(bg.badge().is_on());

    let second = orch.run_cycle(Trigger::Mutation).await;
    assert_eq!(second.candidates, 0);
    assert_eq!(second.applied, 0);
    assert_eq!(transport.call_count(), 1);
    let doc = orch.document();
    assert_eq!(doc.lock().await.text_content(text), "Tech & Audio (63)");
}

#[tokio::test]
async fn disabled_extension_leaves_page_alone() {
    let transport = Arc::new(ScriptedTransport::echo());
    let bg = background(transport.clone(), false).await;
    let (doc, text) = tree_page("63");
    let orch = orchestrator(bg, doc);

    let report = orch.run_cycle(Trigger::PageLoad).await;
    assert!(!report.enabled);
    assert_eq!(transport.call_count(), 0);
    assert_eq!(orch.document().lock().await.text_content(text), "63");
}

#[tokio::test]
async fn cached_labels_apply_without_lookup() {
    let transport = Arc::new(ScriptedTransport::default());
    let bg = background(transport.clone(), true).await;
    let mut m = MappingCache::new();
    m.insert("63", "Cached");
    bg.set_mappings(&m).unwrap();
    let (doc, text) = tree_page("63");
    let orch = orchestrator(bg, doc);

    let report = orch.run_cycle(Trigger::Refresh).await;
    assert_eq!(report.requested, 0);
    assert_eq!(report.applied, 1);
    assert_eq!(transport.call_count(), 0);
    assert_eq!(orch.document().lock().await.text_content(text), "Cached (63)");
}

#[tokio::test]
async fn failed_batch_still_applies_cached_labels() {
    let transport = Arc::new(ScriptedTransport::echo().with_failing_calls(vec![0]));
    let bg = background(transport.clone(), true).await;
    let mut m = MappingCache::new();
    m.insert("63", "Cached");
    bg.set_mappings(&m).unwrap();

    let mut doc = Document::new();
    let s1 = doc.append_element(doc.root(), "span", &[]);
    let t1 = doc.append_text(s1, "63");
    let s2 = doc.append_element(doc.root(), "span", &[]);
    let t2 = doc.append_text(s2, "64");
    let orch = orchestrator(bg, doc);

    let report = orch.run_cycle(Trigger::PageLoad).await;
    assert_eq!(report.requested, 1);
    assert_eq!(report.applied, 1);
    let doc = orch.document();
    let doc = doc.lock().await;
    assert_eq!(doc.text_content(t1), "Cached (63)");
    assert_eq!(doc.text_content(t2), "64");
}

#[tokio::test]
async fn ids_per_cycle_are_capped() {
    let transport = Arc::new(ScriptedTransport::echo());
    let bg = background(transport.clone(), true).await;
    let mut doc = Document::new();
    for i in 10..20 {
        let span = doc.append_element(doc.root(), "span", &[]);
        doc.append_text(span, &i.to_string());
    }
    let orch = Orchestrator::new(
        bg,
        Sender::local(),
        Arc::new(Mutex::new(doc)),
        OrchestratorConfig {
            max_ids_per_cycle: 4,
            ..fast_config()
        },
    );

    let report = orch.run_cycle(Trigger::PageLoad).await;
    assert_eq!(report.candidates, 10);
    assert_eq!(report.requested, 4);
    assert_eq!(report.applied, 4);
}

#[tokio::test]
async fn run_handles_load_mutations_and_retries() {
    let transport = Arc::new(ScriptedTransport::echo());
    let bg = background(transport, true).await;
    let (doc, _) = tree_page("63");
    let orch = orchestrator(bg, doc);

    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(orch.run(rx));
    tx.send(PageEvent::Loaded).await.unwrap();
    tx.send(PageEvent::Mutated).await.unwrap();
    // Inside the debounce window: dropped.
    tx.send(PageEvent::Mutated).await.unwrap();
    // Let both retries fire.
    tokio::time::sleep(Duration::from_millis(150)).await;
    tx.send(PageEvent::RefreshRequested).await.unwrap();
    drop(tx);

    let reports = handle.await.unwrap();
    let count = |t: fn(&Trigger) -> bool| reports.iter().filter(|r| t(&r.trigger)).count();
    assert_eq!(count(|t| *t == Trigger::PageLoad), 1);
    assert_eq!(count(|t| *t == Trigger::Mutation), 1);
    assert_eq!(count(|t| matches!(t, Trigger::Retry(_))), 2);
    assert_eq!(count(|t| *t == Trigger::Refresh), 1);
    assert_eq!(reports.iter().map(|r| r.applied).sum::<usize>(), 1);
}
