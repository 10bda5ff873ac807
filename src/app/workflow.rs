use super::state::{BackendStatus, RequestPhase, WorkflowState};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::extract::{save_download, ExportFormat, ExtractionClient, ExtractionResult, SelectedFile};
use eframe::egui;
use log::{debug, error, info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self as std_mpsc, Receiver, Sender};

pub const INVALID_FILE_MESSAGE: &str = "Please select a valid image file (JPG, PNG, etc.)";

enum WorkerMessage {
    Extraction {
        sequence: u64,
        outcome: ClientResult<ExtractionResult>,
    },
    Export {
        format: ExportFormat,
        outcome: ClientResult<PathBuf>,
    },
    Health(ClientResult<()>),
}

/// Drives selection, extraction and export.
///
/// Network calls run on worker threads and report back over a channel;
/// nothing touches the state until [`ExtractionWorkflow::poll_updates`]
/// runs on the UI thread. Every extraction carries a sequence number and
/// only the latest dispatched one is allowed to land.
pub struct ExtractionWorkflow {
    state: WorkflowState,
    client: ExtractionClient,
    download_dir: PathBuf,
    dispatched_sequence: u64,
    sender: Sender<WorkerMessage>,
    receiver: Receiver<WorkerMessage>,
    repaint: Option<egui::Context>,
}

impl ExtractionWorkflow {
    pub fn new(config: &ClientConfig) -> Self {
        let (sender, receiver) = std_mpsc::channel();
        Self {
            state: WorkflowState::default(),
            client: ExtractionClient::new(config),
            download_dir: config.download_dir.clone(),
            dispatched_sequence: 0,
            sender,
            receiver,
            repaint: None,
        }
    }

    /// Workers wake this context when they finish so the frame picks up the result.
    pub fn set_repaint(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn backend_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn select_file(&mut self, candidate: Option<SelectedFile>) {
        let Some(file) = candidate else {
            return;
        };

        if !file.is_image() {
            warn!(
                "Rejected '{}': media type {} is not an image",
                file.name, file.media_type
            );
            let err = ClientError::Validation(INVALID_FILE_MESSAGE.to_string());
            self.state.error = Some(err.to_string());
            return;
        }

        if self.state.is_loading {
            info!("Selection changed while extracting; the pending response will be discarded");
            self.dispatched_sequence += 1;
        }

        info!(
            "Selected '{}' ({}, {} bytes)",
            file.name,
            file.media_type,
            file.size()
        );
        self.state.selected_file = Some(file);
        self.state.error = None;
        self.state.result = None;
        if !self.state.is_loading {
            self.state.phase = RequestPhase::Idle;
        }
        self.state.selection_generation += 1;
    }

    pub fn select_path(&mut self, path: &Path) {
        match SelectedFile::from_path(path) {
            Ok(file) => self.select_file(Some(file)),
            Err(e) => {
                error!("Could not read {}: {}", path.display(), e);
                self.state.error = Some(format!("Could not read {}: {}", path.display(), e));
            }
        }
    }

    pub fn drag_enter(&mut self) {
        self.state.drag_active = true;
    }

    pub fn drag_over(&mut self) {
        self.state.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.state.drag_active = false;
    }

    /// Only the first dropped file is used.
    pub fn drop_files(&mut self, files: impl IntoIterator<Item = SelectedFile>) {
        self.state.drag_active = false;
        self.select_file(files.into_iter().next());
    }

    pub fn drop_paths(&mut self, paths: &[PathBuf]) {
        self.state.drag_active = false;
        if paths.len() > 1 {
            debug!("Ignoring {} extra dropped files", paths.len() - 1);
        }
        if let Some(path) = paths.first() {
            self.select_path(path);
        }
    }

    /// Returns whether a request was dispatched.
    pub fn start_extraction(&mut self) -> bool {
        if self.state.is_loading {
            debug!("Extraction already in flight; ignoring trigger");
            return false;
        }
        let Some(file) = self.state.selected_file.clone() else {
            debug!("No file selected; ignoring extraction trigger");
            return false;
        };

        self.dispatched_sequence += 1;
        let sequence = self.dispatched_sequence;
        self.state.is_loading = true;
        self.state.error = None;
        self.state.phase = RequestPhase::Requesting;
        info!("Starting extraction #{} for '{}'", sequence, file.name);

        let client = self.client.clone();
        let sender = self.sender.clone();
        let repaint = self.repaint.clone();
        std::thread::spawn(move || {
            let outcome = block_on(client.extract(&file));
            notify(&sender, repaint.as_ref(), WorkerMessage::Extraction { sequence, outcome });
        });

        true
    }

    /// Returns whether an export was dispatched. Exports do not wait on
    /// extraction or on each other.
    pub fn start_export(&mut self, format: ExportFormat) -> bool {
        let Some(result) = self.state.result.clone() else {
            debug!("Nothing extracted yet; ignoring {} export", format.label());
            return false;
        };

        let client = self.client.clone();
        let download_dir = self.download_dir.clone();
        let sender = self.sender.clone();
        let repaint = self.repaint.clone();
        std::thread::spawn(move || {
            let outcome = block_on(client.export(&result, format))
                .and_then(|bytes| save_download(&download_dir, format, &bytes));
            notify(&sender, repaint.as_ref(), WorkerMessage::Export { format, outcome });
        });

        true
    }

    pub fn check_health(&mut self) {
        let client = self.client.clone();
        let sender = self.sender.clone();
        let repaint = self.repaint.clone();
        std::thread::spawn(move || {
            let outcome = block_on(client.health()).map(|health| {
                debug!("Backend health: {} {:?}", health.status, health.message);
            });
            notify(&sender, repaint.as_ref(), WorkerMessage::Health(outcome));
        });
    }

    /// An extraction still on the network keeps the trigger disabled; its
    /// response is discarded when it lands.
    pub fn reset(&mut self) {
        info!("Resetting workflow state");
        self.dispatched_sequence += 1;
        self.state.clear();
    }

    /// Applies every finished worker message. Returns whether anything changed.
    pub fn poll_updates(&mut self) -> bool {
        let mut had_updates = false;
        while let Ok(message) = self.receiver.try_recv() {
            had_updates = true;
            self.apply(message);
        }
        had_updates
    }

    fn apply(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Extraction { sequence, outcome } => {
                if sequence != self.dispatched_sequence {
                    info!(
                        "Discarding stale extraction #{} (latest is #{})",
                        sequence, self.dispatched_sequence
                    );
                    // Only one extraction is ever on the network, so this was it.
                    self.state.is_loading = false;
                    self.state.phase = RequestPhase::Idle;
                    return;
                }

                self.state.is_loading = false;
                match outcome {
                    Ok(result) => {
                        if result.is_empty() {
                            warn!("Extraction #{} returned no sections", sequence);
                        } else {
                            info!("Extraction #{} succeeded", sequence);
                        }
                        self.state.result = Some(result);
                        self.state.error = None;
                        self.state.phase = RequestPhase::Succeeded;
                    }
                    Err(e) => {
                        match &e {
                            ClientError::Request { status, .. } => {
                                error!("Extraction #{} rejected with HTTP {}", sequence, status)
                            }
                            other => error!("Extraction #{} failed: {}", sequence, other),
                        }
                        self.state.error = Some(e.to_string());
                        self.state.phase = RequestPhase::Failed;
                    }
                }
            }
            WorkerMessage::Export { format, outcome } => match outcome {
                Ok(path) => {
                    self.state.last_download = Some(path);
                }
                Err(e) => {
                    error!("{} export failed: {}", format.label(), e);
                    self.state.error = Some(format!("Failed to download {}: {}", format.label(), e));
                }
            },
            WorkerMessage::Health(outcome) => {
                self.state.backend = match outcome {
                    Ok(()) => BackendStatus::Online,
                    Err(e) => {
                        warn!("Backend at {} is not reachable: {}", self.client.base_url(), e);
                        BackendStatus::Offline
                    }
                };
            }
        }
    }
}

fn block_on<T>(future: impl Future<Output = ClientResult<T>>) -> ClientResult<T> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}

fn notify(sender: &Sender<WorkerMessage>, repaint: Option<&egui::Context>, message: WorkerMessage) {
    sender.send(message).unwrap_or_default();
    if let Some(ctx) = repaint {
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render, RenderedBlock};
    use serde_json::json;
    use std::fs;
    use std::time::{Duration, Instant};

    fn workflow_for(base_url: &str, download_dir: &Path) -> ExtractionWorkflow {
        ExtractionWorkflow::new(&ClientConfig::new(base_url, download_dir.to_path_buf()))
    }

    fn png(name: &str) -> SelectedFile {
        SelectedFile::new(name, "image/png", b"png-bytes".to_vec())
    }

    fn previous_result() -> ExtractionResult {
        serde_json::from_value(json!({"invoice_info": {"gst_invoice_number": "OLD-1"}})).unwrap()
    }

    fn wait_until(workflow: &mut ExtractionWorkflow, done: impl Fn(&WorkflowState) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            workflow.poll_updates();
            if done(workflow.state()) {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("workflow did not settle in time: {:?}", workflow.state());
    }

    #[test]
    fn non_image_selection_keeps_current_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow_for("http://127.0.0.1:1", dir.path());
        workflow.select_file(Some(png("first.png")));
        workflow.state.result = Some(previous_result());

        workflow.select_file(Some(SelectedFile::new(
            "invoice.pdf",
            "application/pdf",
            b"%PDF".to_vec(),
        )));

        let state = workflow.state();
        assert_eq!(state.selected_file.as_ref().unwrap().name, "first.png");
        assert_eq!(state.error.as_deref(), Some(INVALID_FILE_MESSAGE));
        assert_eq!(state.result, Some(previous_result()));
    }

    #[test]
    fn image_selection_clears_error_and_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow_for("http://127.0.0.1:1", dir.path());
        workflow.state.error = Some("old failure".to_string());
        workflow.state.result = Some(previous_result());

        workflow.select_file(Some(png("scan.png")));

        let state = workflow.state();
        assert_eq!(state.selected_file.as_ref().unwrap().name, "scan.png");
        assert!(state.error.is_none());
        assert!(state.result.is_none());
        assert_eq!(state.selection_generation, 1);
    }

    #[test]
    fn selecting_nothing_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow_for("http://127.0.0.1:1", dir.path());
        workflow.state.error = Some("keep me".to_string());

        workflow.select_file(None);

        assert!(workflow.state().selected_file.is_none());
        assert_eq!(workflow.state().error.as_deref(), Some("keep me"));
    }

    #[test]
    fn drag_toggles_and_drop_takes_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow_for("http://127.0.0.1:1", dir.path());

        workflow.drag_enter();
        assert!(workflow.state().drag_active);
        workflow.drag_leave();
        assert!(!workflow.state().drag_active);
        workflow.drag_over();
        assert!(workflow.state().drag_active);

        workflow.drop_files(vec![png("first.png"), png("second.png")]);

        assert!(!workflow.state().drag_active);
        assert_eq!(
            workflow.state().selected_file.as_ref().unwrap().name,
            "first.png"
        );
    }

    #[test]
    fn dropped_path_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.jpg");
        fs::write(&path, b"jpeg-ish").unwrap();
        let mut workflow = workflow_for("http://127.0.0.1:1", dir.path());
        workflow.drag_enter();

        workflow.drop_paths(&[path.clone(), dir.path().join("ignored.png")]);

        let file = workflow.state().selected_file.as_ref().unwrap();
        assert!(!workflow.state().drag_active);
        assert_eq!(file.media_type, "image/jpeg");
        assert_eq!(file.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn extraction_without_file_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/api/extract").expect(0).create();
        let mut workflow = workflow_for(&server.url(), dir.path());

        assert!(!workflow.start_extraction());

        let state = workflow.state();
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(state.phase, RequestPhase::Idle);
        mock.assert();
    }

    #[test]
    fn retrigger_while_loading_sends_one_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/extract")
            .with_status(200)
            .with_body(r#"{"totals": {"total_invoice": 5}}"#)
            .expect(1)
            .create();
        let mut workflow = workflow_for(&server.url(), dir.path());
        workflow.select_file(Some(png("scan.png")));

        assert!(workflow.start_extraction());
        assert!(workflow.state().is_loading);
        assert!(!workflow.start_extraction());

        wait_until(&mut workflow, |s| !s.is_loading);
        assert_eq!(workflow.state().phase, RequestPhase::Succeeded);
        mock.assert();
    }

    #[test]
    fn successful_extraction_renders_summary_and_items() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/extract")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"totals": {"grand_total": 1234.5, "discount": 0}, "items": [{"description":"Widget","amount":"10.00"}]}"#,
            )
            .create();
        let mut workflow = workflow_for(&server.url(), dir.path());
        workflow.select_file(Some(png("scan.png")));
        workflow.state.error = Some("stale".to_string());

        workflow.start_extraction();
        assert!(workflow.state().error.is_none());
        wait_until(&mut workflow, |s| !s.is_loading);

        let state = workflow.state();
        assert!(state.error.is_none());
        let rendered = render(state.result.as_ref().unwrap());

        let summary = rendered
            .blocks
            .iter()
            .find_map(|b| match b {
                RenderedBlock::Summary(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(summary.spec.title, "Financial Summary");
        assert_eq!(summary.fields.len(), 1);
        assert_eq!(summary.fields[0].key, "grand_total");
        assert_eq!(summary.fields[0].value, "₹1,234.5");

        let items = rendered
            .blocks
            .iter()
            .find_map(|b| match b {
                RenderedBlock::Items(i) => Some(i),
                _ => None,
            })
            .unwrap();
        assert_eq!(items.cards.len(), 1);
        let values: Vec<(&str, &str)> = items.cards[0]
            .fields
            .iter()
            .map(|f| (f.key.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(values, [("description", "Widget"), ("amount", "₹10")]);
    }

    #[test]
    fn failed_extraction_keeps_previous_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/extract")
            .with_status(500)
            .with_body(r#"{"error": "Processing failed"}"#)
            .create();
        let mut workflow = workflow_for(&server.url(), dir.path());
        workflow.select_file(Some(png("scan.png")));
        workflow.state.result = Some(previous_result());

        workflow.start_extraction();
        assert_eq!(workflow.state().result, Some(previous_result()));
        wait_until(&mut workflow, |s| !s.is_loading);

        let state = workflow.state();
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to extract data from invoice")
        );
        assert_eq!(state.result, Some(previous_result()));
        assert_eq!(state.phase, RequestPhase::Failed);
    }

    #[test]
    fn transport_failure_surfaces_underlying_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow_for("http://127.0.0.1:1", dir.path());
        workflow.select_file(Some(png("scan.png")));

        workflow.start_extraction();
        wait_until(&mut workflow, |s| !s.is_loading);

        let error = workflow.state().error.clone().unwrap();
        assert!(!error.is_empty());
        assert_ne!(error, "Failed to extract data from invoice");
    }

    #[test]
    fn selection_during_extraction_waits_for_pending_response() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/extract")
            .with_status(200)
            .with_body(r#"{"invoice_info": {"gst_invoice_number": "INV-7"}}"#)
            .expect(2)
            .create();
        let mut workflow = workflow_for(&server.url(), dir.path());
        workflow.select_file(Some(png("old.png")));
        assert!(workflow.start_extraction());

        workflow.select_file(Some(png("new.png")));
        assert!(workflow.state().is_loading);
        assert!(!workflow.state().can_extract());
        assert!(!workflow.start_extraction());

        wait_until(&mut workflow, |s| !s.is_loading);
        let state = workflow.state();
        assert!(state.result.is_none());
        assert!(state.error.is_none());
        assert_eq!(state.selected_file.as_ref().unwrap().name, "new.png");
        assert_eq!(state.phase, RequestPhase::Idle);

        assert!(workflow.start_extraction());
        wait_until(&mut workflow, |s| s.result.is_some());
        assert_eq!(workflow.state().phase, RequestPhase::Succeeded);
        mock.assert();
    }

    #[test]
    fn stale_failure_does_not_touch_new_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/extract")
            .with_status(500)
            .create();
        let mut workflow = workflow_for(&server.url(), dir.path());
        workflow.select_file(Some(png("old.png")));
        workflow.start_extraction();

        workflow.select_file(Some(png("new.png")));
        wait_until(&mut workflow, |s| !s.is_loading);

        let state = workflow.state();
        assert!(state.error.is_none());
        assert!(state.result.is_none());
        assert_eq!(state.phase, RequestPhase::Idle);
        assert_eq!(state.selected_file.as_ref().unwrap().name, "new.png");
        assert!(state.can_extract());
    }

    #[test]
    fn export_requires_a_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/api/download-json").expect(0).create();
        let mut workflow = workflow_for(&server.url(), dir.path());

        assert!(!workflow.start_export(ExportFormat::Json));
        mock.assert();
    }

    #[test]
    fn json_export_saves_fixed_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/download-json")
            .match_body(mockito::Matcher::Json(json!({
                "invoice_info": {"gst_invoice_number": "OLD-1"}
            })))
            .with_status(200)
            .with_body(r#"{"invoice_info": {"gst_invoice_number": "OLD-1"}}"#)
            .create();
        let mut workflow = workflow_for(&server.url(), dir.path());
        workflow.state.result = Some(previous_result());
        workflow.state.is_loading = true;

        assert!(workflow.start_export(ExportFormat::Json));
        wait_until(&mut workflow, |s| s.last_download.is_some());

        let path = workflow.state().last_download.clone().unwrap();
        assert_eq!(path, dir.path().join("extracted_invoice_data.json"));
        assert!(fs::read_to_string(path).unwrap().contains("OLD-1"));
    }

    #[test]
    fn csv_export_failure_sets_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/download-csv")
            .with_status(500)
            .create();
        let mut workflow = workflow_for(&server.url(), dir.path());
        workflow.state.result = Some(previous_result());

        workflow.start_export(ExportFormat::Csv);
        wait_until(&mut workflow, |s| s.error.is_some());

        assert_eq!(
            workflow.state().error.as_deref(),
            Some("Failed to download CSV: Failed to generate CSV")
        );
        assert!(workflow.state().last_download.is_none());
        assert!(!dir.path().join("extracted_invoice_data.csv").exists());
    }

    #[test]
    fn health_check_marks_backend_online_or_offline() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body(r#"{"status": "healthy"}"#)
            .create();

        let mut online = workflow_for(&server.url(), dir.path());
        online.check_health();
        wait_until(&mut online, |s| s.backend != BackendStatus::Unknown);
        assert_eq!(online.state().backend, BackendStatus::Online);

        let mut offline = workflow_for("http://127.0.0.1:1", dir.path());
        offline.check_health();
        wait_until(&mut offline, |s| s.backend != BackendStatus::Unknown);
        assert_eq!(offline.state().backend, BackendStatus::Offline);
    }

    #[test]
    fn reset_discards_in_flight_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow_for("http://127.0.0.1:1", dir.path());
        workflow.select_file(Some(png("scan.png")));
        workflow.start_extraction();

        workflow.reset();
        assert!(workflow.state().is_loading);
        assert!(workflow.state().selected_file.is_none());

        wait_until(&mut workflow, |s| !s.is_loading);
        let state = workflow.state();
        assert!(state.selected_file.is_none());
        assert!(state.error.is_none());
        assert_eq!(state.phase, RequestPhase::Idle);
    }
}
