//! Synchronized chart rendering.
//!
//! One plot per visible series, stacked vertically. Every plot gets the same
//! X bounds (the dashboard's chart domain) and the same tick grid, so a
//! vertical line through one chart lines up with every other chart.

use eframe::egui;
use egui_plot::{GridMark, Line, Plot, PlotBounds, PlotPoints, VLine};

use crate::app::FleetLogApp;
use crate::scrubber::{Lane, ScrubberEvent};
use crate::state::{LoadStatus, PointValue, Series, SignalKind, TICK_INTERVAL_MS};

/// Minimum height of a single chart in pixels
const MIN_CHART_HEIGHT: f32 = 90.0;

/// Vertical margin added around the data range of a chart
const Y_MARGIN_FRACTION: f64 = 0.08;

/// Digital series as a step line: the value holds until the next sample
fn step_points(series: &Series) -> Vec<[f64; 2]> {
    let mut out: Vec<[f64; 2]> = Vec::with_capacity(series.points.len() * 2);
    for point in &series.points {
        let Some(value) = point.primary() else {
            continue;
        };
        let x = point.time as f64;
        if let Some(&[_, previous]) = out.last() {
            out.push([x, previous]);
        }
        out.push([x, value]);
    }
    out
}

fn primary_points(series: &Series) -> Vec<[f64; 2]> {
    series
        .points
        .iter()
        .filter_map(|p| p.primary().map(|v| [p.time as f64, v]))
        .collect()
}

/// Minimum and maximum envelope lines of an analog series
fn envelope_points(series: &Series) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    let mut mins = Vec::new();
    let mut maxs = Vec::new();
    for point in &series.points {
        if let PointValue::Analog(sample) = point.value {
            let x = point.time as f64;
            if let Some(min) = sample.min {
                mins.push([x, min]);
            }
            if let Some(max) = sample.max {
                maxs.push([x, max]);
            }
        }
    }
    (mins, maxs)
}

/// Y range of a chart: the configured axis range, or the data range with a
/// small margin
fn y_bounds(series: &Series) -> (f64, f64) {
    if let Some(range) = series.y_axis_range {
        return range;
    }

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for point in &series.points {
        let values: [Option<f64>; 3] = match point.value {
            PointValue::Analog(sample) => [sample.min, sample.avg, sample.max],
            _ => [point.primary(), None, None],
        };
        for v in values.into_iter().flatten() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }

    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = (hi - lo).max(1e-6);
    (lo - span * Y_MARGIN_FRACTION, hi + span * Y_MARGIN_FRACTION)
}

impl FleetLogApp {
    fn render_centered_message(&self, ui: &mut egui::Ui, message: &str) {
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new(message)
                    .size(20.0)
                    .color(egui::Color32::GRAY),
            );
        });
    }

    /// Render every visible series as a stack of time-synchronized charts
    pub fn render_charts(&mut self, ui: &mut egui::Ui) {
        match self.dashboard.status() {
            LoadStatus::Idle => {
                self.render_centered_message(ui, "Select a vehicle and day to load telemetry");
                return;
            }
            LoadStatus::Loading => {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }
            LoadStatus::Empty => {
                self.render_centered_message(ui, "No data for the selected vehicle and day");
                return;
            }
            LoadStatus::Failed(_) if self.dashboard.series().is_empty() => {
                self.render_centered_message(ui, "Telemetry could not be loaded");
                return;
            }
            _ => {}
        }

        let (Some(domain), Some(clock)) = (self.dashboard.chart_domain(), self.dashboard.clock())
        else {
            self.render_centered_message(ui, "No data");
            return;
        };

        let visible = self.dashboard.visible_series();
        if visible.is_empty() {
            self.render_centered_message(ui, "No data");
            return;
        }

        let tick_marks: Vec<GridMark> = self
            .dashboard
            .ticks()
            .into_iter()
            .map(|t| GridMark {
                value: t as f64,
                step_size: TICK_INTERVAL_MS as f64,
            })
            .collect();
        let pointer_time = self.dashboard.pointer_time();
        let hover_time = self.chart_hover_time;

        let chart_height = (ui.available_height() / visible.len() as f32 - 24.0)
            .max(MIN_CHART_HEIGHT);

        let mut hovered: Option<i64> = None;
        let mut clicked: Option<i64> = None;

        egui::ScrollArea::vertical()
            .id_salt("charts_scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for (index, series) in visible.iter().enumerate() {
                    let color = self.series_color(&series.color, index);

                    // Header with the value under the pointer
                    let value = pointer_time.and_then(|t| self.dashboard.value_at(&series.id, t));
                    let header = match (value, &series.unit) {
                        (Some(v), Some(unit)) => format!("{}: {:.2} {}", series.name, v, unit),
                        (Some(v), None) => format!("{}: {:.2}", series.name, v),
                        (None, _) => series.name.clone(),
                    };
                    ui.label(egui::RichText::new(header).color(color).strong());

                    let marks = tick_marks.clone();
                    let (y_min, y_max) = y_bounds(series);

                    let plot = Plot::new(("series_chart", &series.id, series.resolution))
                        .height(chart_height)
                        .show_axes([true, true])
                        .allow_zoom(false)
                        .allow_drag(false)
                        .allow_scroll(false)
                        .allow_boxed_zoom(false)
                        .allow_double_click_reset(false)
                        .x_grid_spacer(move |_input| marks.clone())
                        .x_axis_formatter(move |mark, _range| clock.format_hm(mark.value as i64));

                    let response = plot.show(ui, |plot_ui| {
                        plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                            [domain.start as f64, y_min],
                            [domain.end as f64, y_max],
                        ));

                        match series.kind {
                            SignalKind::Digital => {
                                let points: PlotPoints = step_points(series).into();
                                plot_ui.line(Line::new(series.name.clone(), points).color(color).width(1.5));
                            }
                            SignalKind::Analog => {
                                let (mins, maxs) = envelope_points(series);
                                let faint = color.gamma_multiply(0.4);
                                plot_ui.line(Line::new("min", PlotPoints::from(mins)).color(faint).width(1.0));
                                plot_ui.line(Line::new("max", PlotPoints::from(maxs)).color(faint).width(1.0));
                                let avg: PlotPoints = primary_points(series).into();
                                plot_ui.line(Line::new(series.name.clone(), avg).color(color).width(1.5));
                            }
                            SignalKind::Gps => {
                                let points: PlotPoints = primary_points(series).into();
                                plot_ui.line(Line::new(series.name.clone(), points).color(color).width(1.5));
                            }
                        }

                        if let Some(time) = hover_time {
                            plot_ui.vline(
                                VLine::new("Hover", time as f64)
                                    .color(egui::Color32::from_white_alpha(60))
                                    .width(1.0),
                            );
                        }
                        if let Some(time) = pointer_time {
                            plot_ui.vline(
                                VLine::new("Pointer", time as f64)
                                    .color(egui::Color32::from_rgb(0, 255, 255))
                                    .width(1.5),
                            );
                        }

                        plot_ui.pointer_coordinate()
                    });

                    if response.response.hovered() {
                        if let Some(pos) = response.inner {
                            hovered = Some(pos.x as i64);
                        }
                    }
                    if response.response.clicked() {
                        if let Some(pos) = response.inner {
                            clicked = Some(pos.x as i64);
                        }
                    }

                    if series.is_empty() {
                        ui.label(
                            egui::RichText::new("No points in the selected range")
                                .small()
                                .color(egui::Color32::GRAY),
                        );
                    }
                    ui.add_space(4.0);
                }
            });

        if hovered != self.chart_hover_time {
            self.chart_hover_time = hovered;
            ui.ctx().request_repaint();
        }

        // Clicking a chart moves the pointer like a tap on the knob lane
        if let Some(time) = clicked {
            self.dashboard.handle_pointer(ScrubberEvent::PointerDown {
                lane: Lane::Knob,
                time,
            });
            self.dashboard.handle_pointer(ScrubberEvent::PointerUp { time });
            ui.ctx().request_repaint();
        }
    }
}
