mod state;
mod ui;
mod workflow;

use crate::config::ClientConfig;
use crate::extract::{media_type_for_path, SelectedFile, IMAGE_EXTENSIONS};
use eframe::{egui, App};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use workflow::ExtractionWorkflow;

/// Preview for one selection. `texture` is `None` when decoding failed,
/// so a broken file is only decoded once.
struct PreviewTexture {
    generation: u64,
    texture: Option<egui::TextureHandle>,
}

pub struct InvoiceExtractorApp {
    workflow: ExtractionWorkflow,
    preview: Option<PreviewTexture>,
}

impl InvoiceExtractorApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ClientConfig) -> Self {
        info!("Initializing Invoice Data Extractor");
        let mut workflow = ExtractionWorkflow::new(&config);
        workflow.set_repaint(cc.egui_ctx.clone());
        workflow.check_health();

        Self {
            workflow,
            preview: None,
        }
    }

    pub fn choose_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.workflow.select_path(&path);
        }
    }

    pub fn reset_state(&mut self) {
        self.workflow.reset();
        self.preview = None;
    }

    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (!i.raw.hovered_files.is_empty(), i.raw.dropped_files.clone())
        });

        if !dropped.is_empty() {
            let paths: Vec<PathBuf> = dropped.iter().filter_map(|f| f.path.clone()).collect();
            if paths.is_empty() {
                self.workflow
                    .drop_files(dropped.iter().filter_map(in_memory_file));
            } else {
                self.workflow.drop_paths(&paths);
            }
        } else if hovering {
            if self.workflow.state().drag_active {
                self.workflow.drag_over();
            } else {
                self.workflow.drag_enter();
            }
        } else if self.workflow.state().drag_active {
            self.workflow.drag_leave();
        }
    }

    fn refresh_preview(&mut self, ctx: &egui::Context) {
        let state = self.workflow.state();
        let generation = state.selection_generation;
        if self
            .preview
            .as_ref()
            .is_some_and(|p| p.generation == generation)
        {
            return;
        }

        let texture = state
            .selected_file
            .as_ref()
            .and_then(|file| load_preview(ctx, file));
        self.preview = Some(PreviewTexture {
            generation,
            texture,
        });
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        self.workflow.poll_updates();
        self.handle_drag_and_drop(ctx);
        self.refresh_preview(ctx);

        if self.workflow.state().is_loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

/// Drops that carry bytes instead of a path, e.g. from a sandboxed file manager.
fn in_memory_file(file: &egui::DroppedFile) -> Option<SelectedFile> {
    let bytes = file.bytes.as_ref()?;
    Some(SelectedFile::new(
        file.name.clone(),
        media_type_for_path(Path::new(&file.name)),
        bytes.to_vec(),
    ))
}

fn load_preview(ctx: &egui::Context, file: &SelectedFile) -> Option<egui::TextureHandle> {
    let decoded = match image::load_from_memory(&file.bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("No preview for '{}': {}", file.name, e);
            return None;
        }
    };

    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    Some(ctx.load_texture(
        format!("preview-{}", file.name),
        image,
        egui::TextureOptions::LINEAR,
    ))
}

impl App for InvoiceExtractorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
