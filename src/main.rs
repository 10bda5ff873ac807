mod app;
mod config;
mod error;
mod extract;
mod render;
mod utils;

use app::InvoiceExtractorApp;
use config::ClientConfig;
use eframe::CreationContext;
use log::info;

fn main() -> Result<(), eframe::Error> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ClientConfig::from_env();
    info!(
        "Extraction backend: {} (downloads go to {})",
        config.base_url,
        config.download_dir.display()
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Invoice Data Extractor",
        options,
        Box::new(move |cc: &CreationContext| Box::new(InvoiceExtractorApp::new(cc, config))),
    )
}
