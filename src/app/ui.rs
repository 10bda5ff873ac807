use super::state::BackendStatus;
use super::InvoiceExtractorApp;
use crate::extract::ExportFormat;
use crate::render::{self, ItemCard, RenderedBlock, RenderedField, RenderedItems, RenderedSection};
use crate::utils::color::ColorExt;
use crate::utils::file_size::FileSizeUtils;
use eframe::egui::{self, Align, Color32, Layout, RichText, Stroke};
use log::warn;
use std::hash::Hash;

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 50, 50);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(0, 180, 0);
const DRAG_COLOR: Color32 = Color32::from_rgb(96, 165, 250);

impl InvoiceExtractorApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            self.render_header(ui);
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                self.render_upload(&mut columns[0]);
                self.render_results(&mut columns[1]);
            });
        });
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        let state = self.workflow.state();
        ui.horizontal(|ui| {
            ui.heading("🧾 Invoice Data Extractor");

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let color = match state.backend {
                    BackendStatus::Online => SUCCESS_COLOR,
                    BackendStatus::Offline => ERROR_COLOR,
                    BackendStatus::Unknown => Color32::GRAY,
                };
                ui.label(state.get_status_text())
                    .on_hover_text(self.workflow.backend_url());
                ui.colored_label(color, "●");
            });
        });
    }

    fn render_upload(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.set_min_width(ui.available_width());
            ui.heading("Upload Invoice");
            ui.add_space(8.0);

            let state = self.workflow.state();
            let (stroke, fill) = if state.drag_active {
                (DRAG_COLOR, Color32::from_rgba_unmultiplied(96, 165, 250, 24))
            } else if state.selected_file.is_some() {
                (SUCCESS_COLOR, Color32::from_rgba_unmultiplied(0, 180, 0, 16))
            } else {
                (Color32::GRAY, Color32::TRANSPARENT)
            };

            let drop_zone = egui::Frame::none()
                .stroke(Stroke::new(2.0, stroke))
                .fill(fill)
                .rounding(8.0)
                .inner_margin(24.0)
                .show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.vertical_centered(|ui| match &state.selected_file {
                        Some(file) => {
                            ui.label(RichText::new("✔").size(28.0).color(SUCCESS_COLOR));
                            let name = ui.label(RichText::new(&file.name).strong());
                            if let Some(path) = &file.path {
                                name.on_hover_text(path.display().to_string());
                            }
                            ui.label(
                                RichText::new(FileSizeUtils::format_size(file.size()))
                                    .small()
                                    .weak(),
                            );
                        }
                        None => {
                            ui.label(RichText::new("📤").size(28.0));
                            ui.label(RichText::new("Drop your invoice here").strong());
                            ui.label(RichText::new("or click to browse files").small().weak());
                            ui.label(RichText::new("Supports JPG, PNG, PDF").small().weak());
                        }
                    });
                });

            if drop_zone
                .response
                .interact(egui::Sense::click())
                .on_hover_cursor(egui::CursorIcon::PointingHand)
                .clicked()
            {
                self.choose_file();
            }

            ui.add_space(12.0);
            let can_extract = self.workflow.state().can_extract();
            let is_loading = self.workflow.state().is_loading;
            ui.horizontal(|ui| {
                let choose = egui::Button::new("📁 Choose File").min_size(egui::vec2(140.0, 36.0));
                if ui.add(choose).clicked() {
                    self.choose_file();
                }

                let label = if is_loading {
                    "⏳ Processing..."
                } else {
                    "🔍 Extract Data"
                };
                let extract = egui::Button::new(label).min_size(egui::vec2(160.0, 36.0));
                if ui.add_enabled(can_extract, extract).clicked() {
                    self.workflow.start_extraction();
                }
                if is_loading {
                    ui.spinner();
                }

                if ui.button("🗑 Clear").clicked() {
                    self.reset_state();
                }
            });

            if let Some(error) = &self.workflow.state().error {
                ui.add_space(8.0);
                ui.colored_label(ERROR_COLOR, format!("⚠ {}", error));
            }
        });

        if let Some(texture) = self.preview.as_ref().and_then(|p| p.texture.as_ref()) {
            ui.add_space(12.0);
            ui.group(|ui| {
                ui.set_min_width(ui.available_width());
                ui.heading("Preview");
                ui.add_space(6.0);
                ui.add(egui::Image::new(texture).max_height(260.0));
            });
        }
    }

    fn render_results(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.set_min_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.heading("Extracted Data");
                if self.workflow.state().can_export() {
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        for format in [ExportFormat::Csv, ExportFormat::Json] {
                            if ui.button(format!("⬇ {}", format.label())).clicked() {
                                self.workflow.start_export(format);
                            }
                        }
                    });
                }
            });

            if let Some(path) = &self.workflow.state().last_download {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Saved to").small().weak());
                    if ui.link(path.display().to_string()).clicked() {
                        if let Err(e) = open::that(path) {
                            warn!("Failed to open {}: {}", path.display(), e);
                        }
                    }
                });
            }

            ui.separator();

            match &self.workflow.state().result {
                Some(result) => {
                    let rendered = render::render(result);
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            if rendered.is_empty() {
                                ui.label(
                                    RichText::new("No invoice fields were found in the response")
                                        .weak(),
                                );
                            }
                            for block in &rendered.blocks {
                                render_block(ui, block);
                                ui.add_space(12.0);
                            }
                        });
                }
                None => {
                    ui.add_space(48.0);
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new("📄").size(28.0));
                        ui.label(
                            RichText::new("Upload and process an invoice to see extracted data")
                                .weak(),
                        );
                    });
                    ui.add_space(48.0);
                }
            }
        });
    }
}

fn render_block(ui: &mut egui::Ui, block: &RenderedBlock) {
    match block {
        RenderedBlock::Section(section) => render_section(ui, section, false),
        RenderedBlock::Summary(section) => render_section(ui, section, true),
        RenderedBlock::Items(items) => render_items(ui, items),
    }
}

fn section_heading(ui: &mut egui::Ui, icon: &str, title: &str, accent: Color32) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(icon).size(18.0).color(accent));
        ui.label(RichText::new(title).strong().size(16.0));
    });
}

fn render_section(ui: &mut egui::Ui, section: &RenderedSection, summary: bool) {
    let accent = Color32::accent_or(section.spec.accent, ui.visuals().text_color());
    let mut frame = egui::Frame::group(ui.style());
    if summary {
        frame = frame.stroke(Stroke::new(2.0, accent));
    }

    frame.show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        section_heading(ui, section.spec.icon, section.spec.title, accent);
        ui.add_space(6.0);
        render_fields(ui, section.spec.key, &section.fields, summary);
    });
}

fn render_items(ui: &mut egui::Ui, items: &RenderedItems) {
    let accent = Color32::accent_or(items.spec.accent, ui.visuals().text_color());
    section_heading(ui, items.spec.icon, &items.title, accent);
    ui.add_space(6.0);

    for (index, card) in items.cards.iter().enumerate() {
        render_card(ui, index, card, accent);
        ui.add_space(6.0);
    }
}

fn render_card(ui: &mut egui::Ui, index: usize, card: &ItemCard, accent: Color32) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(RichText::new(&card.label).strong().color(accent));
            if let Some(amount) = &card.amount {
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(RichText::new(amount).strong().size(16.0).color(SUCCESS_COLOR));
                });
            }
        });
        render_fields(ui, ("item", index), &card.fields, false);
    });
}

fn render_fields(ui: &mut egui::Ui, id_source: impl Hash, fields: &[RenderedField], emphasized: bool) {
    egui::Grid::new(id_source)
        .num_columns(2)
        .spacing([16.0, 6.0])
        .striped(true)
        .show(ui, |ui| {
            for field in fields {
                ui.label(RichText::new(field.label.to_uppercase()).small().weak())
                    .on_hover_text(&field.key);
                let value = RichText::new(&field.value);
                ui.label(if emphasized {
                    value.strong().size(16.0)
                } else {
                    value
                });
                ui.end_row();
            }
        });
}
