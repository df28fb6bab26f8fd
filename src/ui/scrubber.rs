//! Range scrubber and record indicator UI.
//!
//! The scrubber is painted by hand: egui's slider has a single thumb, and the
//! range needs two handles, a draggable body and a separate knob lane.

use eframe::egui;

use crate::app::FleetLogApp;
use crate::scrubber::{ticks, Lane, ScrubberEvent};
use crate::state::{DragState, TimeDomain, HOUR_MS, MINUTE_MS};

/// Height of the lane holding the selection body and handles
const RANGE_LANE_HEIGHT: f32 = 30.0;

/// Height of the lane holding the pointer knob
const KNOB_LANE_HEIGHT: f32 = 18.0;

/// Height reserved below the lanes for tick labels
const LABEL_HEIGHT: f32 = 14.0;

/// Minimum horizontal spacing between tick labels
const MIN_LABEL_SPACING: f32 = 48.0;

const HANDLE_WIDTH: f32 = 6.0;

/// Linear mapping between data time and screen x inside the scrubber
#[derive(Clone, Copy)]
struct TimeAxis {
    view: TimeDomain,
    rect: egui::Rect,
}

impl TimeAxis {
    fn x(&self, time: i64) -> f32 {
        let width = self.view.width().max(1) as f32;
        self.rect.left() + (time - self.view.start) as f32 / width * self.rect.width()
    }

    fn time(&self, x: f32) -> i64 {
        let fraction = ((x - self.rect.left()) / self.rect.width().max(1.0)) as f64;
        self.view.start + (fraction * self.view.width() as f64).round() as i64
    }
}

fn format_duration(ms: i64) -> String {
    let hours = ms / HOUR_MS;
    let minutes = (ms % HOUR_MS) / MINUTE_MS;
    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

impl FleetLogApp {
    /// Render the dual-handle range scrubber
    pub fn render_scrubber(&mut self, ui: &mut egui::Ui) {
        let Some(state) = self.dashboard.scrubber().state().copied() else {
            return;
        };
        let Some(clock) = self.dashboard.clock() else {
            return;
        };

        let size = egui::vec2(
            ui.available_width(),
            RANGE_LANE_HEIGHT + KNOB_LANE_HEIGHT + LABEL_HEIGHT,
        );
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

        // A selection wider than the data (short days) stays fully visible
        let view = state.domain.union(&state.selection.as_domain());
        let lanes = egui::Rect::from_min_max(
            rect.min,
            egui::pos2(rect.right(), rect.bottom() - LABEL_HEIGHT),
        );
        let axis = TimeAxis { view, rect: lanes };
        let range_lane = egui::Rect::from_min_max(
            lanes.min,
            egui::pos2(lanes.right(), lanes.top() + RANGE_LANE_HEIGHT),
        );
        let knob_lane =
            egui::Rect::from_min_max(egui::pos2(lanes.left(), range_lane.bottom()), lanes.max);

        // ---- Input ----
        let mut events = Vec::new();
        if response.drag_started() {
            if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                let lane = if origin.y < range_lane.bottom() {
                    Lane::Range
                } else {
                    Lane::Knob
                };
                events.push(ScrubberEvent::PointerDown {
                    lane,
                    time: axis.time(origin.x),
                });
            }
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let lane = if pos.y < range_lane.bottom() {
                    Lane::Range
                } else {
                    Lane::Knob
                };
                let time = axis.time(pos.x);
                events.push(ScrubberEvent::PointerDown { lane, time });
                events.push(ScrubberEvent::PointerUp { time });
            }
        }

        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(ScrubberEvent::PointerMove {
                    time: axis.time(pos.x),
                });
            }
        }
        if response.drag_stopped() {
            let pos = response
                .interact_pointer_pos()
                .or_else(|| ui.input(|i| i.pointer.latest_pos()));
            if let Some(pos) = pos {
                events.push(ScrubberEvent::PointerUp {
                    time: axis.time(pos.x),
                });
            }
        }

        let dragging = state.drag.is_dragging() || response.dragged() || response.drag_stopped();
        if !dragging {
            match response.hover_pos() {
                Some(pos) => events.push(ScrubberEvent::PointerMove {
                    time: axis.time(pos.x),
                }),
                None if state.hover_time.is_some() => events.push(ScrubberEvent::PointerLeave),
                None => {}
            }
        }

        let mut changed = false;
        for event in events {
            changed |= !self.dashboard.handle_pointer(event).is_empty();
        }
        if changed || self.dashboard.scrubber().has_pending_move() {
            ui.ctx().request_repaint();
        }

        // Paint with the state after this frame's input
        let Some(state) = self.dashboard.scrubber().state().copied() else {
            return;
        };
        let painter = ui.painter_at(rect);

        painter.rect_filled(range_lane, 3.0, egui::Color32::from_rgb(35, 35, 35));
        painter.rect_filled(knob_lane, 0.0, egui::Color32::from_rgb(25, 25, 25));

        // Data extent inside the lane (narrower than the lane on short days)
        let extent_rect = egui::Rect::from_x_y_ranges(
            axis.x(state.domain.start)..=axis.x(state.domain.end),
            range_lane.y_range(),
        );
        painter.rect_filled(extent_rect, 3.0, egui::Color32::from_rgb(45, 45, 45));

        // Ticks
        let tick_color = egui::Color32::from_gray(90);
        let mut last_label_x = f32::NEG_INFINITY;
        for tick in ticks(&view) {
            let x = axis.x(tick);
            painter.line_segment(
                [egui::pos2(x, lanes.bottom() - 4.0), egui::pos2(x, lanes.bottom())],
                egui::Stroke::new(1.0, tick_color),
            );
            if x - last_label_x >= MIN_LABEL_SPACING {
                painter.text(
                    egui::pos2(x, rect.bottom()),
                    egui::Align2::CENTER_BOTTOM,
                    clock.format_hm(tick),
                    egui::FontId::proportional(10.0),
                    egui::Color32::GRAY,
                );
                last_label_x = x;
            }
        }

        // Selection body and handles
        let accent = egui::Color32::from_rgb(191, 78, 48);
        let left = axis.x(state.selection.start);
        let right = axis.x(state.selection.end);
        let body = egui::Rect::from_x_y_ranges(left..=right, range_lane.y_range());
        let body_alpha = if state.drag == DragState::RangePan { 110 } else { 70 };
        painter.rect_filled(
            body,
            2.0,
            egui::Color32::from_rgba_unmultiplied(191, 78, 48, body_alpha),
        );

        for (x, active) in [
            (left, state.drag == DragState::LeftHandle),
            (right, state.drag == DragState::RightHandle),
        ] {
            let handle = egui::Rect::from_center_size(
                egui::pos2(x, range_lane.center().y),
                egui::vec2(HANDLE_WIDTH, RANGE_LANE_HEIGHT),
            );
            let color = if active {
                egui::Color32::from_rgb(253, 193, 73)
            } else {
                accent
            };
            painter.rect_filled(handle, 2.0, color);
        }

        // Hover marker
        if let Some(hover) = state.hover_time {
            let x = axis.x(hover);
            painter.line_segment(
                [egui::pos2(x, lanes.top()), egui::pos2(x, lanes.bottom())],
                egui::Stroke::new(1.0, egui::Color32::from_white_alpha(60)),
            );
        }

        // Pointer knob
        let cyan = egui::Color32::from_rgb(0, 255, 255);
        let knob_x = axis.x(state.pointer_time);
        painter.line_segment(
            [egui::pos2(knob_x, lanes.top()), egui::pos2(knob_x, lanes.bottom())],
            egui::Stroke::new(1.5, cyan),
        );
        let radius = if state.drag == DragState::Knob { 7.0 } else { 5.5 };
        painter.circle_filled(egui::pos2(knob_x, knob_lane.center().y), radius, cyan);

        let cursor = match state.drag {
            DragState::LeftHandle | DragState::RightHandle => {
                Some(egui::CursorIcon::ResizeHorizontal)
            }
            DragState::RangePan | DragState::Knob => Some(egui::CursorIcon::Grabbing),
            DragState::None if response.hovered() => Some(egui::CursorIcon::PointingHand),
            DragState::None => None,
        };
        if let Some(cursor) = cursor {
            ui.ctx().set_cursor_icon(cursor);
        }
    }

    /// Render the pointer time, sample counter and selection summary
    pub fn render_record_indicator(&mut self, ui: &mut egui::Ui) {
        let Some(clock) = self.dashboard.clock() else {
            return;
        };

        ui.horizontal(|ui| {
            if let Some(time) = self.dashboard.pointer_time() {
                ui.label(
                    egui::RichText::new(format!("Time: {}", clock.format_time(time)))
                        .strong()
                        .color(egui::Color32::from_rgb(0, 255, 255)),
                );

                ui.separator();

                let total = self.dashboard.sample_count();
                if let Some(index) = self.dashboard.sample_index_at(time) {
                    ui.label(
                        egui::RichText::new(format!("Sample {} / {}", index + 1, total))
                            .color(egui::Color32::LIGHT_GRAY),
                    );
                    ui.separator();
                }
            }

            if let Some(selection) = self.dashboard.selection() {
                ui.label(
                    egui::RichText::new(format!(
                        "Range {} – {} ({})",
                        clock.format_hm(selection.start),
                        clock.format_hm(selection.end),
                        format_duration(selection.width())
                    ))
                    .color(egui::Color32::LIGHT_GRAY),
                );
            }
        });
    }
}
