//! Main application state and eframe::App implementation.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use crate::adapters::{FileSource, TelemetrySource};
use crate::dashboard::{Dashboard, LoadTicket};
use crate::parsers::{JsonPayload, PayloadParser, RawTelemetry};
use crate::settings::UserSettings;
use crate::state::{CacheKey, LoadStatus, ToastType, CHART_COLORS, COLORBLIND_COLORS};

/// Result from a background fetch
pub(crate) enum LoadResult {
    Success(LoadTicket, Box<RawTelemetry>),
    Error(LoadTicket, String),
}

/// Main application state
pub struct FleetLogApp {
    pub(crate) settings: UserSettings,
    pub(crate) dashboard: Dashboard,
    /// Vehicle identifier being edited in the side panel
    pub(crate) vehicle_input: String,
    /// Day being edited in the side panel (`YYYY-MM-DD`)
    pub(crate) date_input: String,
    /// Payload file chosen through the file dialog, overriding the source
    pub(crate) payload_file: Option<PathBuf>,
    /// Channel for receiving fetched payloads from the background thread
    load_receiver: Option<Receiver<LoadResult>>,
    /// Toast messages for user feedback
    pub(crate) toast_message: Option<(String, std::time::Instant, ToastType)>,
    /// Time under the mouse in any chart, shown as a hover line
    pub(crate) chart_hover_time: Option<i64>,
}

impl Default for FleetLogApp {
    fn default() -> Self {
        Self::with_settings(UserSettings::default())
    }
}

impl FleetLogApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_settings(UserSettings::load())
    }

    pub fn with_settings(settings: UserSettings) -> Self {
        let dashboard = Dashboard::new(settings.dashboard_config());
        Self {
            vehicle_input: settings.last_vehicle.clone(),
            date_input: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            settings,
            dashboard,
            payload_file: None,
            load_receiver: None,
            toast_message: None,
            chart_hover_time: None,
        }
    }

    /// Show a toast notification
    pub fn show_toast(&mut self, message: impl Into<String>, toast_type: ToastType) {
        self.toast_message = Some((message.into(), std::time::Instant::now(), toast_type));
    }

    /// Color for the series at `index`: the channel's own color when it has
    /// one, otherwise the active palette
    pub fn series_color(&self, color: &str, index: usize) -> egui::Color32 {
        let rgb = crate::state::parse_hex_color(color)
            .filter(|_| !self.settings.colorblind_mode)
            .unwrap_or_else(|| {
                let palette = if self.settings.colorblind_mode {
                    COLORBLIND_COLORS
                } else {
                    CHART_COLORS
                };
                palette[index % palette.len()]
            });
        egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2])
    }

    pub fn is_loading(&self) -> bool {
        self.load_receiver.is_some()
    }

    /// Persist settings, reporting failures as a toast
    pub fn save_settings(&mut self) {
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
            self.show_toast(format!("Failed to save settings: {}", e), ToastType::Warning);
        }
    }

    /// Re-create the dashboard after settings that affect normalization
    /// changed. The current selection has to be loaded again.
    pub fn apply_settings(&mut self) {
        self.dashboard = Dashboard::new(self.settings.dashboard_config());
        self.load_receiver = None;
        self.save_settings();
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Parse the side panel inputs into a selection key
    pub fn selection_key(&self) -> Result<CacheKey, String> {
        let vehicle = self.vehicle_input.trim();
        if vehicle.is_empty() {
            return Err("Enter a vehicle ID".to_string());
        }
        let date = NaiveDate::parse_from_str(self.date_input.trim(), "%Y-%m-%d")
            .map_err(|_| format!("Invalid date {:?}, expected YYYY-MM-DD", self.date_input))?;
        Ok(CacheKey::new(vehicle, date))
    }

    /// Start loading the selection from the side panel inputs
    pub fn request_load(&mut self) {
        let key = match self.selection_key() {
            Ok(key) => key,
            Err(message) => {
                self.show_toast(message, ToastType::Warning);
                return;
            }
        };

        let source: Box<dyn TelemetrySource> = match &self.payload_file {
            Some(path) => Box::new(FileSource::file(path.clone())),
            None => self.settings.telemetry_source(),
        };

        if self.settings.last_vehicle != key.vehicle_id {
            self.settings.last_vehicle = key.vehicle_id.clone();
            self.save_settings();
        }

        self.start_loading(key, source);
    }

    /// Fetch and decode a selection in the background
    fn start_loading(&mut self, key: CacheKey, source: Box<dyn TelemetrySource>) {
        let ticket = self.dashboard.begin_load(key);
        tracing::info!("Fetching {} from {}", ticket.key, source.describe());

        let (sender, receiver): (Sender<LoadResult>, Receiver<LoadResult>) = channel();
        self.load_receiver = Some(receiver);

        // Spawn background thread for fetching
        thread::spawn(move || {
            let result = match Self::fetch_sync(source.as_ref(), &ticket.key) {
                Ok(raw) => LoadResult::Success(ticket, Box::new(raw)),
                Err(e) => LoadResult::Error(ticket, format!("{:#}", e)),
            };
            let _ = sender.send(result);
        });
    }

    /// Fetch and decode one payload (runs in background thread)
    fn fetch_sync(source: &dyn TelemetrySource, key: &CacheKey) -> anyhow::Result<RawTelemetry> {
        let body = source
            .fetch(key)
            .with_context(|| format!("Failed to fetch {} from {}", key, source.describe()))?;
        let raw = JsonPayload
            .parse(&body)
            .with_context(|| format!("Failed to decode telemetry for {}", key))?;
        Ok(raw)
    }

    /// Check for completed background fetches
    fn check_loading_complete(&mut self) {
        let Some(receiver) = &self.load_receiver else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.load_receiver = None;

        match result {
            LoadResult::Success(ticket, raw) => {
                if raw.is_empty() {
                    tracing::info!("{} returned no channels", ticket.key);
                }
                self.dashboard.accept_payload(&ticket, *raw);
            }
            LoadResult::Error(ticket, message) => {
                self.dashboard.fail_load(&ticket, message.clone());
                self.show_toast(message, ToastType::Error);
            }
        }

        match self.dashboard.status() {
            LoadStatus::Empty => {
                self.show_toast("No telemetry for the selected vehicle and day", ToastType::Info)
            }
            LoadStatus::Ready => self.show_toast("Telemetry loaded", ToastType::Success),
            _ => {}
        }
    }

    /// Advance chunked processing and report the final status once
    fn process_pending(&mut self, ctx: &egui::Context) {
        if !self.dashboard.is_processing() {
            return;
        }
        if self.dashboard.process_frame() {
            ctx.request_repaint();
            return;
        }
        match self.dashboard.status() {
            LoadStatus::Ready => self.show_toast("Telemetry loaded", ToastType::Success),
            LoadStatus::Empty => {
                self.show_toast("No telemetry for the selected vehicle and day", ToastType::Info)
            }
            _ => {}
        }
        ctx.request_repaint();
    }

    /// Ask for a payload file and load it
    pub fn open_payload_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Telemetry JSON", &["json"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_payload_file(path);
        }
    }

    /// Load a payload file. A `{vehicle}_{date}.json` name fills in the
    /// selection; any other name is loaded for the current inputs.
    pub fn load_payload_file(&mut self, path: PathBuf) {
        if let Some((vehicle, date)) = FileSource::selection_from_path(&path) {
            self.vehicle_input = vehicle;
            self.date_input = date.format("%Y-%m-%d").to_string();
        }
        self.payload_file = Some(path);
        self.request_load();
    }

    /// Load the first `.json` file dropped onto the window
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if self.is_loading() {
            return;
        }

        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if dropped.is_empty() {
            return;
        }

        match first_json_file(dropped) {
            Some(path) => self.load_payload_file(path),
            None => self.show_toast("Drop a telemetry .json file", ToastType::Warning),
        }
    }
}

/// First path with a `.json` extension
pub fn first_json_file(paths: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    paths.into_iter().find(|path| {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    })
}

impl eframe::App for FleetLogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background loads
        self.check_loading_complete();

        self.handle_dropped_files(ctx);

        // One chunk of analog channels per frame
        self.process_pending(ctx);

        // Apply any pointer move the scrubber coalesced last frame
        if !self.dashboard.begin_frame().is_empty() {
            ctx.request_repaint();
        }

        // Apply dark theme
        ctx.set_visuals(egui::Visuals::dark());

        // Request repaint while loading (for spinner animation)
        if self.is_loading() {
            ctx.request_repaint();
        }

        // Toast notifications
        self.render_toast(ctx);

        egui::SidePanel::left("selection_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                self.render_side_panel(ui);
            });

        // Bottom panel for the range scrubber (render before central to claim space)
        if self.dashboard.data_extent().is_some() {
            egui::TopBottomPanel::bottom("scrubber_panel")
                .resizable(false)
                .min_height(90.0)
                .show(ctx, |ui| {
                    ui.add_space(5.0);
                    self.render_record_indicator(ui);
                    ui.separator();
                    self.render_scrubber(ui);
                    ui.add_space(5.0);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_charts(ui);
        });
    }
}
