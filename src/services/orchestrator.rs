use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use itertools::iproduct;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    domain::record::{BusinessRecord, SearchTarget},
    services::{
        session::{ScrapeSession, SessionFactory},
        sink, PacingPolicy,
    },
};

/// Cooperative cancellation. The interactive side is the only writer; the
/// worker polls it at the top of the target loop.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeEvent {
    Status(String),
    Progress {
        completed: usize,
        total: usize,
        records: usize,
    },
    ExportFailed(String),
    Failed(String),
    Finished {
        outcome: RunOutcome,
        records: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Interrupted,
}

pub struct RunSummary {
    pub outcome: RunOutcome,
    pub records: Vec<BusinessRecord>,
}

/// Walks the niche × city product with one fresh session per target,
/// accumulating records and rewriting the export file after every target, so
/// a crash loses at most the in-flight target.
pub struct ScrapeOrchestrator<F: SessionFactory> {
    factory: F,
    output_path: PathBuf,
    pacing: PacingPolicy,
    events: UnboundedSender<ScrapeEvent>,
    cancel: CancelFlag,
}

impl<F: SessionFactory> ScrapeOrchestrator<F> {
    pub fn new(
        factory: F,
        output_path: PathBuf,
        pacing: PacingPolicy,
        events: UnboundedSender<ScrapeEvent>,
        cancel: CancelFlag,
    ) -> Self {
        ScrapeOrchestrator {
            factory,
            output_path,
            pacing,
            events,
            cancel,
        }
    }

    pub async fn run(
        self,
        niches: Vec<String>,
        cities: Vec<String>,
    ) -> anyhow::Result<RunSummary> {
        if let Some(parent) = self.output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let targets: Vec<SearchTarget> = iproduct!(niches.iter(), cities.iter())
            .map(|(nicho, cidade)| SearchTarget {
                nicho: nicho.clone(),
                cidade: cidade.clone(),
            })
            .collect();
        let total = targets.len();

        let mut accumulator: Vec<BusinessRecord> = vec![];
        let mut completed = 0;
        let mut interrupted = false;

        for target in &targets {
            if self.cancel.is_cancelled() {
                interrupted = true;
                break;
            }

            self.emit(ScrapeEvent::Status(format!("Buscando: {}", target.query())));

            let records = self.process_target(target).await;
            accumulator.extend(records);

            self.persist(&accumulator);

            completed += 1;
            self.emit(ScrapeEvent::Progress {
                completed,
                total,
                records: accumulator.len(),
            });

            self.pacing.wait(self.pacing.target_pause).await;
        }

        self.persist(&accumulator);

        let outcome = match interrupted {
            true => RunOutcome::Interrupted,
            false => RunOutcome::Completed,
        };
        log::info!(
            "Run finished ({:?}): {} records over {}/{} targets",
            outcome,
            accumulator.len(),
            completed,
            total
        );
        self.emit(ScrapeEvent::Finished {
            outcome,
            records: accumulator.len(),
        });

        Ok(RunSummary {
            outcome,
            records: accumulator,
        })
    }

    // One target, one session. Whatever happens in here, the session is
    // closed before returning and the run carries on with the next target.
    async fn process_target(&self, target: &SearchTarget) -> Vec<BusinessRecord> {
        let mut session = match self.factory.open().await {
            Ok(session) => session,
            Err(e) => {
                log::error!("Failed to open a session for '{}': {:?}", target.query(), e);
                return vec![];
            }
        };

        let records = session.scrape_target(target).await;
        session.close().await;
        records
    }

    fn persist(&self, records: &[BusinessRecord]) {
        if records.is_empty() {
            return;
        }
        match sink::persist(records, &self.output_path) {
            Ok(()) => log::info!(
                "Saved {} records to {}",
                records.len(),
                self.output_path.display()
            ),
            Err(e) => {
                log::error!(
                    "Failed to persist {} records to {}: {:?}",
                    records.len(),
                    self.output_path.display(),
                    e
                );
                self.emit(ScrapeEvent::ExportFailed(e.to_string()));
            }
        }
    }

    fn emit(&self, event: ScrapeEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Progress listener is gone");
        }
    }
}
