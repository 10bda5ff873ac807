mod client;
mod download;
mod types;

pub use client::ExtractionClient;
pub use download::save_download;
pub use types::{
    media_type_for_path, ExportFormat, ExtractionResult, SelectedFile, IMAGE_EXTENSIONS,
};
