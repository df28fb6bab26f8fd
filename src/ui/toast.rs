//! Toast notifications for load results and settings errors.

use eframe::egui;

use crate::app::FleetLogApp;

/// Seconds a toast stays on screen
const TOAST_SECONDS: u64 = 3;

impl FleetLogApp {
    /// Render the current toast in the bottom right corner, above the scrubber
    pub fn render_toast(&mut self, ctx: &egui::Context) {
        let Some((message, shown_at, toast_type)) = &self.toast_message else {
            return;
        };
        if shown_at.elapsed().as_secs() >= TOAST_SECONDS {
            self.toast_message = None;
            return;
        }

        let [br, bg, bb] = toast_type.color();
        let [tr, tg, tb] = toast_type.text_color();

        egui::Area::new(egui::Id::new("fleetlog_toast"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-20.0, -120.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_rgb(br, bg, bb))
                    .corner_radius(6)
                    .inner_margin(egui::Margin::symmetric(14, 10))
                    .shadow(egui::epaint::Shadow {
                        offset: [2, 2],
                        blur: 8,
                        spread: 0,
                        color: egui::Color32::from_black_alpha(60),
                    })
                    .show(ui, |ui| {
                        ui.set_max_width(360.0);
                        ui.label(
                            egui::RichText::new(message.as_str())
                                .color(egui::Color32::from_rgb(tr, tg, tb)),
                        );
                    });
            });

        // Keep repainting so the toast disappears without further input
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
