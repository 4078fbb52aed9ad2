use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use uuid::Uuid;

use crate::{
    configuration::Settings,
    services::{
        orchestrator::{CancelFlag, RunOutcome, ScrapeEvent, ScrapeOrchestrator},
        session::MapsSessionFactory,
        PacingPolicy,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Interrupted,
    Failed,
}

/// Snapshot served to the front-end. Updated only by the event forwarder, so
/// the worker never touches route-visible state directly.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub job_id: Option<String>,
    pub state: JobState,
    pub status_text: String,
    pub progress: f32,
    pub completed_targets: usize,
    pub total_targets: usize,
    pub records: usize,
    pub output_path: Option<String>,
    pub last_error: Option<String>,
}

impl JobStatus {
    fn idle() -> Self {
        JobStatus {
            job_id: None,
            state: JobState::Idle,
            status_text: "Pronto para iniciar".to_string(),
            progress: 0.0,
            completed_targets: 0,
            total_targets: 0,
            records: 0,
            output_path: None,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

pub struct StartedJob {
    pub job_id: Uuid,
    pub output_path: PathBuf,
    pub total_targets: usize,
}

#[derive(Debug, PartialEq)]
pub enum StartError {
    AlreadyRunning,
    EmptySelection,
}

/// Owns the job lifecycle on behalf of the HTTP routes: one run at a time,
/// cooperative stop, status snapshots.
pub struct ScrapeController {
    settings: Settings,
    inner: Mutex<ControllerInner>,
}

struct ControllerInner {
    status: JobStatus,
    cancel: Option<CancelFlag>,
}

impl ScrapeController {
    pub fn new(settings: Settings) -> Self {
        ScrapeController {
            settings,
            inner: Mutex::new(ControllerInner {
                status: JobStatus::idle(),
                cancel: None,
            }),
        }
    }

    pub fn status(&self) -> JobStatus {
        self.inner.lock().unwrap().status.clone()
    }

    /// Requests cancellation of the active run. The in-flight target finishes
    /// first; the worker then winds down and reports "interrupted".
    pub fn stop(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.cancel.as_ref() {
            Some(cancel) if inner.status.state == JobState::Running => {
                cancel.cancel();
                inner.status.status_text = "Interrompendo após o alvo atual...".to_string();
                true
            }
            _ => false,
        }
    }

    pub fn try_start(
        self: &Arc<Self>,
        niches: Vec<String>,
        cities: Vec<String>,
        format: ExportFormat,
    ) -> Result<StartedJob, StartError> {
        let niches: Vec<String> = niches
            .into_iter()
            .map(|niche| niche.trim().to_string())
            .filter(|niche| !niche.is_empty())
            .collect();
        let cities: Vec<String> = cities
            .into_iter()
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty())
            .collect();
        if niches.is_empty() || cities.is_empty() {
            return Err(StartError::EmptySelection);
        }

        let job_id = Uuid::new_v4();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let output_path = self
            .settings
            .scrape
            .output_dir
            .join(format!("resultados_{}.{}", timestamp, format.extension()));
        let total_targets = niches.len() * cities.len();

        let cancel = CancelFlag::new();
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.status.state == JobState::Running {
                return Err(StartError::AlreadyRunning);
            }

            inner.status = JobStatus {
                job_id: Some(job_id.to_string()),
                state: JobState::Running,
                status_text: "Iniciando coleta...".to_string(),
                progress: 0.0,
                completed_targets: 0,
                total_targets,
                records: 0,
                output_path: Some(output_path.display().to_string()),
                last_error: None,
            };
            inner.cancel = Some(cancel.clone());
        }

        let pacing = PacingPolicy::standard();
        let factory = MapsSessionFactory::new(self.settings.webdriver.clone(), pacing);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let orchestrator = ScrapeOrchestrator::new(
            factory,
            output_path.clone(),
            pacing,
            events_tx.clone(),
            cancel,
        );

        tokio::spawn(Self::forward_events(Arc::clone(self), events_rx));

        tokio::spawn(async move {
            if let Err(e) = orchestrator.run(niches, cities).await {
                log::error!("Scrape run failed: {:?}", e);
                let _ = events_tx.send(ScrapeEvent::Failed(e.to_string()));
            }
        });

        Ok(StartedJob {
            job_id,
            output_path,
            total_targets,
        })
    }

    async fn forward_events(self: Arc<Self>, mut events: UnboundedReceiver<ScrapeEvent>) {
        while let Some(event) = events.recv().await {
            let mut inner = self.inner.lock().unwrap();
            match event {
                ScrapeEvent::Status(text) => inner.status.status_text = text,
                ScrapeEvent::Progress {
                    completed,
                    total,
                    records,
                } => {
                    inner.status.completed_targets = completed;
                    inner.status.total_targets = total;
                    inner.status.records = records;
                    inner.status.progress = match total {
                        0 => 0.0,
                        total => completed as f32 / total as f32,
                    };
                }
                ScrapeEvent::ExportFailed(message) => {
                    inner.status.status_text = format!("Erro ao salvar resultados: {}", message);
                    inner.status.last_error = Some(message);
                }
                ScrapeEvent::Failed(message) => {
                    inner.status.state = JobState::Failed;
                    inner.status.status_text = format!("Erro durante a coleta: {}", message);
                    inner.status.last_error = Some(message);
                    inner.cancel = None;
                }
                ScrapeEvent::Finished { outcome, records } => {
                    inner.status.records = records;
                    match outcome {
                        RunOutcome::Completed => {
                            inner.status.state = JobState::Completed;
                            inner.status.status_text =
                                format!("Coleta concluída. {} resultados encontrados", records);
                        }
                        RunOutcome::Interrupted => {
                            inner.status.state = JobState::Interrupted;
                            inner.status.status_text =
                                format!("Processo interrompido. {} resultados salvos", records);
                        }
                    }
                    inner.cancel = None;
                }
            }
        }

        // Channel gone without a terminal event means the worker died.
        let mut inner = self.inner.lock().unwrap();
        if inner.status.state == JobState::Running {
            inner.status.state = JobState::Failed;
            inner.status.status_text = "Coleta encerrada inesperadamente".to_string();
            inner.cancel = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{
        ApplicationSettings, RegionApiSettings, ScrapeSettings, WebDriverSettings,
    };

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            application: ApplicationSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            region_api: RegionApiSettings {
                base_url: "http://localhost:1/api".to_string(),
                timeout_secs: 1,
                bulk_timeout_secs: 1,
            },
            webdriver: WebDriverSettings {
                url: "http://localhost:1".to_string(),
                headless: true,
                user_agent: None,
                element_wait_secs: 1,
            },
            scrape: ScrapeSettings {
                output_dir: dir.to_path_buf(),
                niches_path: dir.join("nichos.json"),
            },
        }
    }

    #[tokio::test]
    async fn empty_selection_is_rejected_before_any_work_starts() {
        let dir = tempfile::tempdir().unwrap();
        let controller = Arc::new(ScrapeController::new(settings(dir.path())));

        let result = controller.try_start(
            vec!["  ".to_string()],
            vec!["Cambé".to_string()],
            ExportFormat::Csv,
        );

        assert!(matches!(result, Err(StartError::EmptySelection)));
        assert_eq!(controller.status().state, JobState::Idle);
    }

    #[tokio::test]
    async fn stop_without_an_active_run_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let controller = Arc::new(ScrapeController::new(settings(dir.path())));

        assert!(!controller.stop());
    }

    #[test]
    fn export_format_picks_the_file_extension() {
        assert_eq!(ExportFormat::Xlsx.extension(), "xlsx");
        assert_eq!(ExportFormat::Csv.extension(), "csv");
    }
}
