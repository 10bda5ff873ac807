use crate::extract::{ExtractionResult, SelectedFile};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestPhase {
    #[default]
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

#[derive(Debug, Default)]
pub struct WorkflowState {
    pub selected_file: Option<SelectedFile>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub result: Option<ExtractionResult>,
    pub drag_active: bool,
    pub phase: RequestPhase,
    pub backend: BackendStatus,
    pub last_download: Option<PathBuf>,
    /// Bumped on every accepted selection so the UI knows to rebuild its preview.
    pub selection_generation: u64,
}

impl WorkflowState {
    /// Back to a blank form. Backend reachability and any request still
    /// on the network are not part of the form, so they survive.
    pub fn clear(&mut self) {
        *self = WorkflowState {
            is_loading: self.is_loading,
            phase: if self.is_loading {
                RequestPhase::Requesting
            } else {
                RequestPhase::Idle
            },
            backend: self.backend,
            selection_generation: self.selection_generation + 1,
            ..WorkflowState::default()
        };
    }

    pub fn can_extract(&self) -> bool {
        self.selected_file.is_some() && !self.is_loading
    }

    pub fn can_export(&self) -> bool {
        self.result.is_some()
    }

    pub fn get_status_text(&self) -> &'static str {
        match (self.phase, self.backend) {
            (RequestPhase::Requesting, _) => "Processing...",
            (_, BackendStatus::Offline) => "Backend offline",
            (_, BackendStatus::Unknown) => "Connecting...",
            (_, BackendStatus::Online) => "Ready",
        }
    }
}
