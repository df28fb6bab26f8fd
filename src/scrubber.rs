//! Range scrubber interaction.
//!
//! The scrubber has two lanes: the range lane holds the selection body and
//! its two handles, the knob lane holds the pointer (crosshair) knob. All
//! pointer handling is a pure state machine over [`ScrubberState`];
//! [`ScrubberController`] adds per-frame throttling on top and is what the
//! dashboard drives.

use crate::state::{
    DragState, SelectionRange, TimeDomain, HANDLE_TOLERANCE_MS, MAX_TICKS, MIN_RANGE_MS,
    TICK_INTERVAL_MS,
};
use crate::time_align::align_to_grid;

/// Which lane of the scrubber a pointer-down landed on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lane {
    Range,
    Knob,
}

/// Pointer input in data space (epoch milliseconds)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrubberEvent {
    PointerDown { lane: Lane, time: i64 },
    PointerMove { time: i64 },
    PointerUp { time: i64 },
    PointerLeave,
}

/// Changes the rest of the dashboard reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashboardEvent {
    SelectionChanged(SelectionRange),
    PointerMoved(i64),
}

/// A requested position that had to be clamped. Recorded, never an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeViolation {
    /// Requested position fell before the domain start
    BeforeDomain { requested: i64, applied: i64 },
    /// Requested position fell after the domain end
    AfterDomain { requested: i64, applied: i64 },
    /// A handle was pushed closer than the minimum range width
    MinimumWidth { requested: i64, applied: i64 },
    /// The knob was dragged outside the selection
    OutsideSelection { requested: i64, applied: i64 },
}

/// Complete interaction state of the scrubber
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrubberState {
    pub drag: DragState,
    pub selection: SelectionRange,
    pub pointer_time: i64,
    /// Full data extent the selection lives in
    pub domain: TimeDomain,
    /// Distance from the selection start to where a pan grabbed it
    pub grab_offset: i64,
    /// Hover position while idle, cleared when the pointer leaves
    pub hover_time: Option<i64>,
}

/// Result of applying one event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: ScrubberState,
    pub events: Vec<DashboardEvent>,
    pub violation: Option<RangeViolation>,
}

impl ScrubberState {
    /// Fresh state for a newly loaded data extent: the whole extent is
    /// selected (widened to the minimum range) and the pointer sits at its
    /// start
    pub fn new(extent: TimeDomain) -> Self {
        Self {
            drag: DragState::None,
            selection: SelectionRange::covering(extent),
            pointer_time: extent.start,
            domain: extent,
            grab_offset: 0,
            hover_time: None,
        }
    }

    /// Compute the state after `event` without touching `self`
    pub fn apply(&self, event: ScrubberEvent) -> Transition {
        let mut next = *self;
        let mut violation = None;

        match event {
            ScrubberEvent::PointerDown { lane, time } => {
                next.hover_time = None;
                match lane {
                    Lane::Knob => {
                        next.drag = DragState::Knob;
                        violation = next.move_knob(time);
                    }
                    Lane::Range => violation = next.press_range(time),
                }
            }
            ScrubberEvent::PointerMove { time } => {
                if next.drag.is_dragging() {
                    violation = next.drag_to(time);
                } else {
                    next.hover_time = Some(time);
                }
            }
            ScrubberEvent::PointerUp { time } => {
                if next.drag.is_dragging() {
                    violation = next.drag_to(time);
                }
                next.drag = DragState::None;
                next.grab_offset = 0;
            }
            ScrubberEvent::PointerLeave => {
                if !next.drag.is_dragging() {
                    next.hover_time = None;
                }
            }
        }

        // The crosshair always stays inside the selection
        let pointer = next.pointer_time.clamp(next.selection.start, next.selection.end);
        next.pointer_time = pointer;

        let mut events = Vec::new();
        if next.selection != self.selection {
            events.push(DashboardEvent::SelectionChanged(next.selection));
        }
        if next.pointer_time != self.pointer_time {
            events.push(DashboardEvent::PointerMoved(next.pointer_time));
        }

        Transition {
            next,
            events,
            violation,
        }
    }

    fn press_range(&mut self, time: i64) -> Option<RangeViolation> {
        let to_left = (time - self.selection.start).abs();
        let to_right = (time - self.selection.end).abs();

        if to_left <= HANDLE_TOLERANCE_MS || to_right <= HANDLE_TOLERANCE_MS {
            self.drag = if to_left <= to_right {
                DragState::LeftHandle
            } else {
                DragState::RightHandle
            };
            return None;
        }

        if self.selection.contains(time) {
            self.drag = DragState::RangePan;
            self.grab_offset = time - self.selection.start;
            return None;
        }

        // Missed the range: jump a minimum-width range onto the click
        let requested = time - MIN_RANGE_MS / 2;
        let start = self.clamp_pan_start(requested, MIN_RANGE_MS);
        self.selection = SelectionRange {
            start,
            end: start + MIN_RANGE_MS,
        };
        self.drag = DragState::RangePan;
        self.grab_offset = time - start;
        self.domain_violation(requested, start)
    }

    fn drag_to(&mut self, time: i64) -> Option<RangeViolation> {
        match self.drag {
            DragState::None => None,
            DragState::LeftHandle => {
                let upper = self.selection.end - MIN_RANGE_MS;
                let lower = self.domain.start.min(upper);
                let start = time.clamp(lower, upper);
                self.selection.start = start;
                if time > upper {
                    Some(RangeViolation::MinimumWidth {
                        requested: time,
                        applied: start,
                    })
                } else {
                    self.domain_violation(time, start)
                }
            }
            DragState::RightHandle => {
                let lower = self.selection.start + MIN_RANGE_MS;
                let upper = self.domain.end.max(lower);
                let end = time.clamp(lower, upper);
                self.selection.end = end;
                if time < lower {
                    Some(RangeViolation::MinimumWidth {
                        requested: time,
                        applied: end,
                    })
                } else {
                    self.domain_violation(time, end)
                }
            }
            DragState::RangePan => {
                let width = self.selection.width();
                let requested = time - self.grab_offset;
                let start = self.clamp_pan_start(requested, width);
                self.selection = SelectionRange {
                    start,
                    end: start + width,
                };
                self.domain_violation(requested, start)
            }
            DragState::Knob => self.move_knob(time),
        }
    }

    fn move_knob(&mut self, time: i64) -> Option<RangeViolation> {
        let applied = time.clamp(self.selection.start, self.selection.end);
        self.pointer_time = applied;
        (applied != time).then_some(RangeViolation::OutsideSelection {
            requested: time,
            applied,
        })
    }

    /// Clamp a range start so a range of `width` stays inside the domain.
    /// When the domain is narrower than the range, the range starts at the
    /// domain start and runs past its end.
    fn clamp_pan_start(&self, start: i64, width: i64) -> i64 {
        let latest = (self.domain.end - width).max(self.domain.start);
        start.clamp(self.domain.start, latest)
    }

    fn domain_violation(&self, requested: i64, applied: i64) -> Option<RangeViolation> {
        if applied > requested {
            Some(RangeViolation::BeforeDomain { requested, applied })
        } else if applied < requested {
            Some(RangeViolation::AfterDomain { requested, applied })
        } else {
            None
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Drives [`ScrubberState`] from raw pointer input.
///
/// At most one move is applied per frame. Further moves inside the same frame
/// coalesce to the latest position, which is applied by the next
/// [`begin_frame`](Self::begin_frame). Pointer-up always applies its final
/// position immediately.
#[derive(Debug, Default)]
pub struct ScrubberController {
    state: Option<ScrubberState>,
    pending_move: Option<i64>,
    moved_this_frame: bool,
    last_violation: Option<RangeViolation>,
}

impl ScrubberController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-initialise for a new data extent
    pub fn reset(&mut self, extent: TimeDomain) -> Vec<DashboardEvent> {
        let state = ScrubberState::new(extent);
        self.state = Some(state);
        self.pending_move = None;
        self.moved_this_frame = false;
        self.last_violation = None;
        vec![
            DashboardEvent::SelectionChanged(state.selection),
            DashboardEvent::PointerMoved(state.pointer_time),
        ]
    }

    /// Forget the loaded extent
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn state(&self) -> Option<&ScrubberState> {
        self.state.as_ref()
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.state.map(|s| s.selection)
    }

    pub fn pointer_time(&self) -> Option<i64> {
        self.state.map(|s| s.pointer_time)
    }

    pub fn drag(&self) -> DragState {
        self.state.map_or(DragState::None, |s| s.drag)
    }

    /// Most recent clamp, for display
    pub fn last_violation(&self) -> Option<RangeViolation> {
        self.last_violation
    }

    /// Whether a coalesced move is waiting for the next frame
    pub fn has_pending_move(&self) -> bool {
        self.pending_move.is_some()
    }

    /// Feed one pointer event. Ignored until an extent has been loaded.
    pub fn handle(&mut self, event: ScrubberEvent) -> Vec<DashboardEvent> {
        if self.state.is_none() {
            return Vec::new();
        }

        match event {
            ScrubberEvent::PointerMove { time } => {
                if self.moved_this_frame {
                    self.pending_move = Some(time);
                    return Vec::new();
                }
                self.moved_this_frame = true;
                self.commit(event)
            }
            ScrubberEvent::PointerUp { .. } => {
                self.pending_move = None;
                self.commit(event)
            }
            ScrubberEvent::PointerDown { .. } | ScrubberEvent::PointerLeave => {
                self.pending_move = None;
                self.commit(event)
            }
        }
    }

    /// Start a new frame, applying the coalesced move if one is pending
    pub fn begin_frame(&mut self) -> Vec<DashboardEvent> {
        self.moved_this_frame = false;
        match self.pending_move.take() {
            Some(time) => {
                self.moved_this_frame = true;
                self.commit(ScrubberEvent::PointerMove { time })
            }
            None => Vec::new(),
        }
    }

    fn commit(&mut self, event: ScrubberEvent) -> Vec<DashboardEvent> {
        let Some(state) = self.state else {
            return Vec::new();
        };

        let transition = state.apply(event);
        if let Some(violation) = transition.violation {
            tracing::trace!("Scrubber clamp: {:?}", violation);
            self.last_violation = Some(violation);
        }
        self.state = Some(transition.next);
        transition.events
    }
}

// ============================================================================
// Ticks
// ============================================================================

/// Tick positions shared by the scrubber and every chart.
///
/// Ticks fall every ten minutes on the grid anchored at the floor of the
/// domain start; only ticks inside the domain are returned. The interval
/// doubles until no more than [`MAX_TICKS`] ticks remain.
pub fn ticks(domain: &TimeDomain) -> Vec<i64> {
    let mut interval = TICK_INTERVAL_MS;
    loop {
        let mut first = align_to_grid(domain.start, interval);
        if first < domain.start {
            first += interval;
        }
        if first > domain.end {
            return Vec::new();
        }

        let count = ((domain.end - first) / interval) as usize + 1;
        if count <= MAX_TICKS {
            return (0..count as i64).map(|i| first + i * interval).collect();
        }
        interval *= 2;
    }
}
