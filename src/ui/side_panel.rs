//! Side panel - vehicle/day selection, load status and view options.

use eframe::egui;
use strum::IntoEnumIterator;

use crate::app::FleetLogApp;
use crate::settings::SourceKind;
use crate::state::{LoadStatus, Padding, ViewMode};
use crate::units::{LatitudeHemisphere, LongitudeHemisphere};

impl FleetLogApp {
    /// Render the side panel
    pub fn render_side_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("FleetLog");
        });
        ui.add_space(8.0);
        ui.separator();
        ui.add_space(8.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.render_selection_section(ui);
                ui.add_space(8.0);
                self.render_status_section(ui);
                ui.separator();
                self.render_view_section(ui);
                ui.separator();
                self.render_series_list(ui);
                ui.separator();
                self.render_source_section(ui);
            });
    }

    fn render_selection_section(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Vehicle").strong());
        let vehicle = ui.add(
            egui::TextEdit::singleline(&mut self.vehicle_input)
                .hint_text("e.g. KT-204")
                .desired_width(f32::INFINITY),
        );

        ui.label(egui::RichText::new("Day").strong());
        let date = ui.add(
            egui::TextEdit::singleline(&mut self.date_input)
                .hint_text("YYYY-MM-DD")
                .desired_width(f32::INFINITY),
        );

        let submitted = (vehicle.lost_focus() || date.lost_focus())
            && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let load = ui.add_enabled(!self.is_loading(), egui::Button::new("Load"));
            if load.clicked() || submitted {
                self.request_load();
            }
            if ui.button("Open file…").clicked() {
                self.open_payload_file();
            }
        });

        if let Some(path) = self.payload_file.clone() {
            ui.horizontal(|ui| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                ui.label(
                    egui::RichText::new(format!("File: {}", name))
                        .small()
                        .color(egui::Color32::LIGHT_GRAY),
                );
                if ui.small_button("✕").on_hover_text("Use the configured source").clicked() {
                    self.payload_file = None;
                }
            });
        }
    }

    fn render_status_section(&mut self, ui: &mut egui::Ui) {
        match self.dashboard.status().clone() {
            LoadStatus::Idle => {
                ui.label(egui::RichText::new("Select a vehicle and day").color(egui::Color32::GRAY));
            }
            LoadStatus::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Fetching telemetry…");
                });
            }
            LoadStatus::Processing { done, total } => {
                let progress = if total == 0 {
                    1.0
                } else {
                    done as f32 / total as f32
                };
                ui.add(
                    egui::ProgressBar::new(progress)
                        .text(format!("Processing channels {}/{}", done, total)),
                );
            }
            LoadStatus::Ready => {
                if let Some(key) = self.dashboard.current_key() {
                    ui.label(
                        egui::RichText::new(key.to_string())
                            .color(egui::Color32::from_rgb(144, 238, 144)),
                    );
                }
            }
            LoadStatus::Empty => {
                ui.label(
                    egui::RichText::new("No data for this selection")
                        .color(egui::Color32::from_rgb(253, 193, 73)),
                );
            }
            LoadStatus::Failed(message) => {
                ui.label(
                    egui::RichText::new(message).color(egui::Color32::from_rgb(191, 78, 48)),
                );
            }
        }
    }

    fn render_view_section(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("View").strong());

        let mut view_mode = self.settings.view_mode;
        egui::ComboBox::from_id_salt("view_mode")
            .selected_text(view_mode.to_string())
            .width(140.0)
            .show_ui(ui, |ui| {
                for mode in ViewMode::iter() {
                    ui.selectable_value(&mut view_mode, mode, mode.to_string());
                }
            });
        if view_mode != self.settings.view_mode {
            self.settings.view_mode = view_mode;
            self.dashboard.set_view_mode(view_mode);
            self.save_settings();
        }

        let mut percent = match self.settings.padding {
            Padding::Fraction(f) => f * 100.0,
            Padding::Fixed(_) => 0.0,
        };
        let fixed = matches!(self.settings.padding, Padding::Fixed(_));
        let slider = ui.add_enabled(
            !fixed,
            egui::Slider::new(&mut percent, 0.0..=50.0)
                .suffix(" %")
                .text("Padding"),
        );
        if slider.changed() {
            self.settings.padding = Padding::Fraction(percent / 100.0);
            self.dashboard.set_padding(self.settings.padding);
        }
        if slider.drag_stopped() {
            self.save_settings();
        }

        if ui
            .checkbox(&mut self.settings.colorblind_mode, "Colorblind palette")
            .changed()
        {
            self.save_settings();
        }
    }

    fn render_series_list(&mut self, ui: &mut egui::Ui) {
        let series = self.dashboard.series();
        if series.is_empty() {
            return;
        }

        ui.label(egui::RichText::new("Channels").strong());
        let pointer = self.dashboard.pointer_time();

        for (index, s) in series.iter().enumerate() {
            let value = pointer
                .and_then(|t| self.dashboard.value_at(&s.id, t))
                .or(s.current_value);
            let color = self.series_color(&s.color, index);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("■").color(color));
                ui.label(&s.name);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let text = match (value, &s.unit) {
                        (Some(v), Some(unit)) => format!("{:.2} {}", v, unit),
                        (Some(v), None) => format!("{:.2}", v),
                        (None, _) => "–".to_string(),
                    };
                    ui.label(egui::RichText::new(text).color(egui::Color32::LIGHT_GRAY));
                });
            });
        }
    }

    fn render_source_section(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Source & decoding")
            .default_open(false)
            .show(ui, |ui| {
                egui::ComboBox::from_id_salt("source_kind")
                    .selected_text(self.settings.source.to_string())
                    .width(140.0)
                    .show_ui(ui, |ui| {
                        for kind in SourceKind::iter() {
                            ui.selectable_value(&mut self.settings.source, kind, kind.to_string());
                        }
                    });

                match self.settings.source {
                    SourceKind::Api => {
                        ui.label("API base URL");
                        ui.text_edit_singleline(&mut self.settings.api_base_url);
                    }
                    SourceKind::Files => {
                        let dir = self
                            .settings
                            .data_dir
                            .as_ref()
                            .map(|d| d.display().to_string())
                            .unwrap_or_else(|| "(working directory)".to_string());
                        ui.label(egui::RichText::new(dir).small());
                        if ui.button("Choose data folder…").clicked() {
                            if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                                self.settings.data_dir = Some(dir);
                            }
                        }
                    }
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label("UTC offset (min)");
                    ui.add(
                        egui::DragValue::new(&mut self.settings.utc_offset_minutes)
                            .range(-720..=840)
                            .speed(15),
                    );
                });

                let convention = &mut self.settings.coordinate_convention;
                ui.horizontal(|ui| {
                    ui.label("Packed latitude");
                    egui::ComboBox::from_id_salt("lat_hemisphere")
                        .selected_text(convention.latitude.to_string())
                        .show_ui(ui, |ui| {
                            for h in LatitudeHemisphere::iter() {
                                ui.selectable_value(&mut convention.latitude, h, h.to_string());
                            }
                        });
                });
                ui.horizontal(|ui| {
                    ui.label("Packed longitude");
                    egui::ComboBox::from_id_salt("lng_hemisphere")
                        .selected_text(convention.longitude.to_string())
                        .show_ui(ui, |ui| {
                            for h in LongitudeHemisphere::iter() {
                                ui.selectable_value(&mut convention.longitude, h, h.to_string());
                            }
                        });
                });

                ui.horizontal(|ui| {
                    ui.label("Analog channels per frame");
                    ui.add(egui::DragValue::new(&mut self.settings.analog_chunk_size).range(1..=64));
                });

                ui.add_space(4.0);
                if ui
                    .button("Apply")
                    .on_hover_text("Save and reload with these settings")
                    .clicked()
                {
                    self.apply_settings();
                    if self.selection_key().is_ok() {
                        self.request_load();
                    }
                }
            });
    }
}
