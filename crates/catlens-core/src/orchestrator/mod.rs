//! Page orchestrator: scan → resolve → rewrite cycles driven by page events.
//!
//! The orchestrator talks to the [`Background`] only through messages, the same
//! way a content script would. Cycles may overlap; none holds a lock across a
//! message round-trip.

mod context;
mod triggers;

#[cfg(test)]
mod tests;

use serde_json::json;
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};

use crate::background::{Background, Sender};
use crate::dom::{apply_labels, find_candidates, Document};

pub use context::LabelContext;
pub use triggers::{Debouncer, PageEvent, RetrySchedule, Trigger};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Minimum gap between mutation-triggered cycles.
    pub debounce: Duration,
    pub max_retries: u32,
    pub retry_interval: Duration,
    /// Unresolved ids sent per cycle.
    pub max_ids_per_cycle: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            max_retries: 10,
            retry_interval: Duration::from_secs(1),
            max_ids_per_cycle: 100,
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub trigger: Trigger,
    /// False when the extension was disabled and nothing was scanned.
    pub enabled: bool,
    pub candidates: usize,
    /// Ids sent to the lookup.
    pub requested: usize,
    pub lookup_failed: bool,
    /// Nodes rewritten.
    pub applied: usize,
}

impl CycleReport {
    fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            enabled: false,
            candidates: 0,
            requested: 0,
            lookup_failed: false,
            applied: 0,
        }
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    background: Arc<Background>,
    sender: Sender,
    document: Arc<Mutex<Document>>,
    context: Arc<Mutex<LabelContext>>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        background: Arc<Background>,
        sender: Sender,
        document: Arc<Mutex<Document>>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            background,
            sender,
            document,
            context: Arc::new(Mutex::new(LabelContext::default())),
            config,
        }
    }

    pub fn document(&self) -> Arc<Mutex<Document>> {
        Arc::clone(&self.document)
    }

    pub async fn context(&self) -> LabelContext {
        self.context.lock().await.clone()
    }

    /// One full cycle. Never fails: state or lookup errors fall back to the cached context.
    pub async fn run_cycle(&self, trigger: Trigger) -> CycleReport {
        let mut report = CycleReport::new(trigger);

        let response = self
            .background
            .handle(&self.sender, json!({ "type": "GET_STATE" }))
            .await;
        let ctx = {
            let mut ctx = self.context.lock().await;
            match response.state {
                Some(state) if response.success => ctx.refresh(state),
                _ => tracing::warn!(
                    ?trigger,
                    error = response.error.as_deref().unwrap_or("no state"),
                    "state read failed, using cached context"
                ),
            }
            ctx.clone()
        };
        if !ctx.enabled {
            tracing::trace!(?trigger, "disabled, cycle skipped");
            return report;
        }
        report.enabled = true;

        let missing = {
            let doc = self.document.lock().await;
            let candidates = find_candidates(&doc);
            report.candidates = candidates.len();
            ctx.missing(
                candidates.iter().map(|c| c.id.as_str()),
                self.config.max_ids_per_cycle,
            )
        };
        if report.candidates == 0 {
            return report;
        }

        let mut mappings = ctx.mappings;
        if !missing.is_empty() {
            report.requested = missing.len();
            let resp = self
                .background
                .handle(&self.sender, json!({ "type": "ALGOLIA_LOOKUP", "ids": missing }))
                .await;
            match resp.labels {
                Some(labels) if resp.success => {
                    mappings = labels;
                    self.context.lock().await.mappings = mappings.clone();
                }
                _ => {
                    report.lookup_failed = true;
                    tracing::warn!(
                        ?trigger,
                        error = resp.error.as_deref().unwrap_or("no labels"),
                        "lookup failed, applying cached labels"
                    );
                }
            }
        }

        {
            // Scan again: the page may have changed during the lookup.
            let mut doc = self.document.lock().await;
            let candidates = find_candidates(&doc);
            report.applied = apply_labels(&mut doc, &candidates, &mappings);
        }
        self.background.update_badge(mappings.len());

        tracing::debug!(
            ?trigger,
            candidates = report.candidates,
            requested = report.requested,
            applied = report.applied,
            "cycle done"
        );
        report
    }

    /// Drive cycles from page events until the channel closes, then wait for
    /// in-flight cycles. Returns every cycle's report, in completion order.
    pub async fn run(self, mut events: mpsc::Receiver<PageEvent>) -> Vec<CycleReport> {
        let mut debounce = Debouncer::new(self.config.debounce);
        let mut retries = RetrySchedule::new(self.config.max_retries, self.config.retry_interval);
        let mut cycles = JoinSet::new();
        let mut reports = Vec::new();

        loop {
            let retry_at = retries.next_deadline();
            let retry_due = async {
                match retry_at {
                    Some(at) => sleep_until(at).await,
                    None => pending::<()>().await,
                }
            };

            tokio::select! {
                event = events.recv() => {
                    let trigger = match event {
                        Some(PageEvent::Loaded) => {
                            retries.start(Instant::now());
                            Trigger::PageLoad
                        }
                        Some(PageEvent::Mutated) => {
                            if !debounce.admit(Instant::now()) {
                                tracing::trace!("mutation inside debounce window dropped");
                                continue;
                            }
                            Trigger::Mutation
                        }
                        Some(PageEvent::RefreshRequested) => Trigger::Refresh,
                        None => break,
                    };
                    let this = self.clone();
                    cycles.spawn(async move { this.run_cycle(trigger).await });
                }
                _ = retry_due => {
                    if let Some(n) = retries.fire(Instant::now()) {
                        let this = self.clone();
                        cycles.spawn(async move { this.run_cycle(Trigger::Retry(n)).await });
                    }
                }
                Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                    collect(joined, &mut reports);
                }
            }
        }

        while let Some(joined) = cycles.join_next().await {
            collect(joined, &mut reports);
        }
        reports
    }
}

fn collect(joined: Result<CycleReport, tokio::task::JoinError>, reports: &mut Vec<CycleReport>) {
    match joined {
        Ok(report) => reports.push(report),
        Err(e) => tracing::error!("cycle task failed: {}", e),
    }
}
