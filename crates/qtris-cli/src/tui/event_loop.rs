use std::time::{Duration, Instant};

use crossterm::event;

use crate::tui::event::TuiEvent;

/// Rendering trigger mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Render at fixed intervals.
    Interval(Duration),
    /// Render after state changes (tick or crossterm event).
    #[default]
    OnDirty,
}

impl RenderMode {
    /// Renders at most `rate` times per second.
    pub fn from_rate(rate: f64) -> Self {
        RenderMode::Interval(Duration::from_secs_f64(1.0 / rate))
    }

    fn as_interval(self) -> Option<Duration> {
        match self {
            RenderMode::Interval(interval) => Some(interval),
            RenderMode::OnDirty => None,
        }
    }
}

/// Event loop state.
///
/// Tracks tick and render deadlines and returns the next event via `next()`.
/// If an interval is not set, that event type is never generated.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    render_mode: RenderMode,
    last_tick: Instant,
    last_render: Instant,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    /// Creates an event loop without ticks that renders on dirty.
    pub(super) fn new() -> Self {
        let now = Instant::now();
        Self {
            tick_interval: None,
            render_mode: RenderMode::default(),
            last_tick: now,
            last_render: now,
            dirty: true, // first frame
        }
    }

    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    pub(super) fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    /// Returns the next event.
    ///
    /// Blocks until a tick/render deadline is reached or a crossterm event occurs.
    /// A tick carries the wall time since the previous tick, so a late tick reports
    /// the full delay.
    pub(super) fn next(&mut self) -> anyhow::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(tick_interval) = self.tick_interval {
                let elapsed = now.duration_since(self.last_tick);
                if elapsed >= tick_interval {
                    self.last_tick = now;
                    self.dirty = true;
                    return Ok(TuiEvent::Tick(elapsed));
                }
            }

            let do_render = match self.render_mode {
                RenderMode::Interval(interval) => now.duration_since(self.last_render) >= interval,
                RenderMode::OnDirty => self.dirty,
            };
            if do_render {
                self.last_render = now;
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(timeout) = self.compute_timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn compute_timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self.tick_interval.map(|interval| self.last_tick + interval);
        let next_render_at = self
            .render_mode
            .as_interval()
            .map(|interval| self.last_render + interval);
        let next_timeout_at = [next_tick_at, next_render_at].into_iter().flatten().min()?;
        Some(next_timeout_at.saturating_duration_since(now))
    }
}
