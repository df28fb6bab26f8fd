//! Dashboard orchestration.
//!
//! [`Dashboard`] is the context object the UI talks to. It owns the series
//! cache, the scrubber, the load generation counter and the cache of
//! windowed series handed to the charts.
//!
//! Loading is split into steps so a day of per-second analog data never
//! blocks a frame:
//!
//! 1. [`Dashboard::begin_load`] hands out a [`LoadTicket`] and forgets the
//!    previous selection.
//! 2. [`Dashboard::accept_payload`] normalizes digital and GPS channels
//!    right away and queues analog channels.
//! 3. [`Dashboard::process_frame`] normalizes one chunk of analog channels
//!    per call and publishes the growing series list.
//!
//! Every step checks the ticket's generation, so a payload or chunk that
//! belongs to an abandoned selection is discarded instead of overwriting the
//! current one.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::domain::{compute_domain, data_extent};
use crate::normalize::{
    ensure_not_empty, normalize, normalize_analog, normalize_digital, normalize_gps,
    normalize_sample_times, SeriesCache,
};
use crate::parsers::types::RawAnalogChannel;
use crate::parsers::RawTelemetry;
use crate::scrubber::{self, DashboardEvent, ScrubberController, ScrubberEvent};
use crate::state::{
    CacheKey, LoadStatus, Padding, SelectionRange, Series, SignalKind, TimeDomain, ViewMode,
    DEFAULT_ANALOG_CHUNK_SIZE,
};
use crate::time_align::DayClock;
use crate::units::CoordinateConvention;
use crate::window::extract_window;

/// Settings the dashboard needs from the user configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashboardConfig {
    pub view_mode: ViewMode,
    pub padding: Padding,
    pub convention: CoordinateConvention,
    /// Offset of the fleet's local day from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// Analog channels normalized per frame
    pub analog_chunk_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::default(),
            padding: Padding::default(),
            convention: CoordinateConvention::default(),
            utc_offset_minutes: 0,
            analog_chunk_size: DEFAULT_ANALOG_CHUNK_SIZE,
        }
    }
}

/// Identifies one load request. Results carrying an outdated generation are
/// ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub key: CacheKey,
}

/// Analog work left over from an accepted payload
struct PendingLoad {
    ticket: LoadTicket,
    clock: DayClock,
    queue: VecDeque<RawAnalogChannel>,
    series: Vec<Series>,
    total: usize,
    done: usize,
}

/// Windowed series for one (domain, view mode) pair
struct WindowCache {
    domain: TimeDomain,
    view_mode: ViewMode,
    series: Arc<[Series]>,
}

pub struct Dashboard {
    config: DashboardConfig,
    cache: SeriesCache,
    scrubber: ScrubberController,
    generation: u64,
    current: Option<CacheKey>,
    sample_times: Vec<i64>,
    pending: Option<PendingLoad>,
    window_cache: Option<WindowCache>,
    status: LoadStatus,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config: DashboardConfig {
                analog_chunk_size: config.analog_chunk_size.max(1),
                ..config
            },
            cache: SeriesCache::new(),
            scrubber: ScrubberController::new(),
            generation: 0,
            current: None,
            sample_times: Vec::new(),
            pending: None,
            window_cache: None,
            status: LoadStatus::Idle,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_key(&self) -> Option<&CacheKey> {
        self.current.as_ref()
    }

    pub fn scrubber(&self) -> &ScrubberController {
        &self.scrubber
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.scrubber.selection()
    }

    pub fn pointer_time(&self) -> Option<i64> {
        self.scrubber.pointer_time()
    }

    /// Whether analog chunks are still waiting to be normalized
    pub fn is_processing(&self) -> bool {
        self.pending.is_some()
    }

    /// Snapshot of every canonical series of the current selection
    pub fn series(&self) -> Arc<[Series]> {
        self.current
            .as_ref()
            .and_then(|key| self.cache.get(key))
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Local day clock for the current selection
    pub fn clock(&self) -> Option<DayClock> {
        self.current
            .as_ref()
            .map(|key| DayClock::with_offset_minutes(key.date, self.config.utc_offset_minutes))
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        if self.config.view_mode != view_mode {
            self.config.view_mode = view_mode;
            self.window_cache = None;
        }
    }

    pub fn set_padding(&mut self, padding: Padding) {
        if self.config.padding != padding {
            self.config.padding = padding;
            self.window_cache = None;
        }
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Start loading a new selection. Everything held for the previous one
    /// is dropped.
    pub fn begin_load(&mut self, key: CacheKey) -> LoadTicket {
        self.generation += 1;
        tracing::info!("Loading {} (generation {})", key, self.generation);

        self.cache.invalidate();
        self.scrubber.clear();
        self.pending = None;
        self.window_cache = None;
        self.sample_times.clear();
        self.current = Some(key.clone());
        self.status = LoadStatus::Loading;

        LoadTicket {
            generation: self.generation,
            key,
        }
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && self.current.as_ref() == Some(&ticket.key)
    }

    /// Accept the decoded payload for `ticket`.
    ///
    /// Returns `false` when the ticket is stale. Digital and GPS channels are
    /// published immediately; analog channels are left for
    /// [`process_frame`](Self::process_frame).
    pub fn accept_payload(&mut self, ticket: &LoadTicket, raw: RawTelemetry) -> bool {
        if !self.is_current(ticket) {
            tracing::warn!(
                "Discarding stale payload for {} (generation {}, current {})",
                ticket.key,
                ticket.generation,
                self.generation
            );
            return false;
        }

        let clock = DayClock::with_offset_minutes(ticket.key.date, self.config.utc_offset_minutes);
        let RawTelemetry {
            sample_times,
            digital,
            analog,
            gps,
        } = raw;

        self.sample_times = normalize_sample_times(&sample_times, &clock);

        let mut series: Vec<Series> = digital
            .iter()
            .map(|channel| normalize_digital(channel, &clock))
            .collect();
        series.extend(normalize_gps(&gps, &clock, &self.config.convention));

        let total = analog.len();
        self.cache.publish(ticket.key.clone(), Arc::from(series.clone()));
        self.window_cache = None;

        self.pending = Some(PendingLoad {
            ticket: ticket.clone(),
            clock,
            queue: analog.into(),
            series,
            total,
            done: 0,
        });

        if total == 0 {
            self.finish_load();
        } else {
            self.status = LoadStatus::Processing { done: 0, total };
        }
        true
    }

    /// Record a failed fetch or decode for `ticket`. Stale failures are
    /// ignored.
    pub fn fail_load(&mut self, ticket: &LoadTicket, message: impl Into<String>) {
        if !self.is_current(ticket) {
            return;
        }
        let message = message.into();
        tracing::warn!("Load of {} failed: {}", ticket.key, message);
        self.pending = None;
        self.status = LoadStatus::Failed(message);
    }

    /// Normalize one chunk of pending analog channels.
    ///
    /// Returns `true` while more work remains, so the caller keeps
    /// requesting frames.
    pub fn process_frame(&mut self) -> bool {
        let Some(mut pending) = self.pending.take() else {
            return false;
        };

        if !self.is_current(&pending.ticket) {
            tracing::warn!(
                "Dropping analog work for {} from generation {}",
                pending.ticket.key,
                pending.ticket.generation
            );
            return false;
        }

        let chunk = self.config.analog_chunk_size.min(pending.queue.len());
        for channel in pending.queue.drain(..chunk) {
            pending.series.push(normalize_analog(&channel, &pending.clock));
        }
        pending.done += chunk;

        // Replace the published list wholesale, never mutate it in place
        self.cache.publish(
            pending.ticket.key.clone(),
            Arc::from(pending.series.clone()),
        );
        self.window_cache = None;

        if pending.queue.is_empty() {
            self.pending = Some(pending);
            self.finish_load();
            false
        } else {
            self.status = LoadStatus::Processing {
                done: pending.done,
                total: pending.total,
            };
            self.pending = Some(pending);
            true
        }
    }

    /// Load a payload in one step, without chunking
    pub fn load_now(&mut self, key: CacheKey, raw: &RawTelemetry) -> Vec<DashboardEvent> {
        let ticket = self.begin_load(key);
        let clock = DayClock::with_offset_minutes(ticket.key.date, self.config.utc_offset_minutes);
        let convention = self.config.convention;

        self.sample_times = normalize_sample_times(&raw.sample_times, &clock);
        self.cache
            .get_or_normalize(&ticket.key, || normalize(raw, &clock, &convention));
        self.finish_load()
    }

    fn finish_load(&mut self) -> Vec<DashboardEvent> {
        self.pending = None;
        self.window_cache = None;

        let series = self.series();
        let key = self
            .current
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        match ensure_not_empty(&series) {
            Ok(()) => {
                let points: usize = series.iter().map(|s| s.points.len()).sum();
                tracing::info!(
                    "Loaded {}: {} series, {} points",
                    key,
                    series.len(),
                    points
                );
                self.status = LoadStatus::Ready;
            }
            Err(e) => {
                tracing::info!("{}: {}", key, e);
                self.status = LoadStatus::Empty;
            }
        }

        match data_extent(&series) {
            Some(extent) => self.scrubber.reset(extent),
            None => {
                self.scrubber.clear();
                Vec::new()
            }
        }
    }

    // ------------------------------------------------------------------
    // Interaction
    // ------------------------------------------------------------------

    /// Forward a pointer event to the scrubber
    pub fn handle_pointer(&mut self, event: ScrubberEvent) -> Vec<DashboardEvent> {
        let events = self.scrubber.handle(event);
        self.observe(&events);
        events
    }

    /// Start a UI frame, applying any move the scrubber coalesced
    pub fn begin_frame(&mut self) -> Vec<DashboardEvent> {
        let events = self.scrubber.begin_frame();
        self.observe(&events);
        events
    }

    fn observe(&mut self, events: &[DashboardEvent]) {
        if events
            .iter()
            .any(|e| matches!(e, DashboardEvent::SelectionChanged(_)))
        {
            self.window_cache = None;
        }
    }

    // ------------------------------------------------------------------
    // Chart data
    // ------------------------------------------------------------------

    /// X domain shared by every chart
    pub fn chart_domain(&self) -> Option<TimeDomain> {
        compute_domain(self.selection().as_ref(), &self.series())
    }

    /// Union of all series' first and last timestamps
    pub fn data_extent(&self) -> Option<TimeDomain> {
        data_extent(&self.series())
    }

    /// Tick positions for the chart domain
    pub fn ticks(&self) -> Vec<i64> {
        self.chart_domain()
            .map(|domain| scrubber::ticks(&domain))
            .unwrap_or_default()
    }

    /// Windowed, budgeted series for the charts, cached until the domain or
    /// view mode changes
    pub fn visible_series(&mut self) -> Arc<[Series]> {
        let Some(domain) = self.chart_domain() else {
            return Arc::from(Vec::new());
        };
        let view_mode = self.config.view_mode;

        if let Some(cached) = &self.window_cache {
            if cached.domain == domain && cached.view_mode == view_mode {
                return Arc::clone(&cached.series);
            }
        }

        let all = self.series();
        let budget = view_mode.render_budget();
        let windowed: Arc<[Series]> = series_for_view(&all, view_mode)
            .into_iter()
            .map(|series| extract_window(series, &domain, self.config.padding, budget))
            .collect();

        self.window_cache = Some(WindowCache {
            domain,
            view_mode,
            series: Arc::clone(&windowed),
        });
        windowed
    }

    /// Primary value of a series at `time` (latest point at or before it)
    pub fn value_at(&self, series_id: &str, time: i64) -> Option<f64> {
        let all = self.series();
        series_for_view(&all, self.config.view_mode)
            .into_iter()
            .find(|series| series.id == series_id)
            .and_then(|series| series.point_at(time))
            .and_then(|point| point.primary())
    }

    /// Number of sample instants of the current selection
    pub fn sample_count(&self) -> usize {
        if self.sample_times.is_empty() {
            self.densest_series_len()
        } else {
            self.sample_times.len()
        }
    }

    /// Index of the sample at or before `time`, for the record indicator
    pub fn sample_index_at(&self, time: i64) -> Option<usize> {
        let index = if self.sample_times.is_empty() {
            let all = self.series();
            let densest = all.iter().max_by_key(|s| s.points.len())?;
            densest.points.partition_point(|p| p.time <= time)
        } else {
            self.sample_times.partition_point(|t| *t <= time)
        };
        index.checked_sub(1)
    }

    fn densest_series_len(&self) -> usize {
        self.series()
            .iter()
            .map(|s| s.points.len())
            .max()
            .unwrap_or(0)
    }
}

/// Series shown in a view mode: every digital and GPS series, and for each
/// analog channel the resolution matching the view (falling back to the
/// other resolution when the channel has only one)
pub fn series_for_view(series: &[Series], view_mode: ViewMode) -> Vec<&Series> {
    let preferred = view_mode.analog_resolution();
    series
        .iter()
        .filter(|s| {
            if s.kind != SignalKind::Analog || s.resolution == preferred {
                return true;
            }
            !series.iter().any(|other| {
                other.kind == SignalKind::Analog && other.id == s.id && other.resolution == preferred
            })
        })
        .collect()
}
