//! The embedding environment: container geometry, clock, frame scheduling and resize events.
//!
//! [`HeadlessHost`] stands in for a browser tab. It owns a virtual display that ticks at a fixed
//! refresh rate, replays a scripted list of viewport resizes, and forwards every presented frame
//! to a [`FrameSink`].

use std::collections::{BTreeSet, VecDeque};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, LogicalSize, Rect};
use crate::foundation::error::{WildwoodError, WildwoodResult};
use crate::render::backend::FrameRGBA;
use crate::surface::clamp_device_pixel_ratio;

/// Identifies one outstanding frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// Identifies one registered resize listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Refresh-synchronized callback scheduling.
pub trait FrameScheduler {
    /// Ask for one callback on the next display refresh.
    fn request_animation_frame(&mut self) -> FrameHandle;
    /// Withdraw a request. Unknown or already-delivered handles are ignored.
    fn cancel_animation_frame(&mut self, handle: FrameHandle);
}

/// Everything a mounted component needs from its environment.
pub trait Host: FrameScheduler {
    /// On-screen rectangle of the container, in logical pixels.
    fn container_rect(&self) -> Rect;
    /// Reported device pixel ratio; not clamped.
    fn device_pixel_ratio(&self) -> f64;
    /// High-resolution clock in milliseconds.
    fn now_ms(&self) -> f64;
    fn add_resize_listener(&mut self) -> ListenerId;
    fn remove_resize_listener(&mut self, id: ListenerId);
    /// Show a finished frame.
    fn present(&mut self, frame: &FrameRGBA) -> WildwoodResult<()>;
}

/// Receiver of the callbacks a [`Host`] dispatches.
pub trait HostEvents {
    /// A requested frame is due; `timestamp_ms` is the host clock at the start of the refresh.
    fn on_animation_frame<H: Host + ?Sized>(
        &mut self,
        handle: FrameHandle,
        timestamp_ms: f64,
        host: &mut H,
    ) -> WildwoodResult<()>;

    /// The container was resized; `listener` is the registration being notified.
    fn on_resize<H: Host + ?Sized>(
        &mut self,
        listener: ListenerId,
        host: &mut H,
    ) -> WildwoodResult<()>;
}

/// A scripted viewport change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeEvent {
    pub at_ms: f64,
    pub size: LogicalSize,
}

/// Virtual display settings for a [`HeadlessHost`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadlessConfig {
    pub viewport: LogicalSize,
    pub device_pixel_ratio: f64,
    pub refresh: Fps,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            viewport: LogicalSize::new(800.0, 600.0),
            device_pixel_ratio: 1.0,
            refresh: Fps { num: 60, den: 1 },
        }
    }
}

/// Counters collected while running a [`HeadlessHost`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostStats {
    /// Display refreshes simulated.
    pub ticks: u64,
    /// Frame callbacks delivered.
    pub frame_callbacks: u64,
    /// Resize notifications delivered to listeners.
    pub resize_callbacks: u64,
    /// Frames handed to the sink.
    pub presented: u64,
}

/// A deterministic, single-threaded stand-in for a browser window.
pub struct HeadlessHost<S: FrameSink> {
    cfg: HeadlessConfig,
    viewport: LogicalSize,
    now_ms: f64,
    next_tick: u64,

    next_handle: u64,
    pending: BTreeSet<FrameHandle>,
    in_flight: VecDeque<FrameHandle>,

    next_listener: u64,
    listeners: BTreeSet<ListenerId>,
    resizes: VecDeque<ResizeEvent>,

    sink: S,
    sink_started: bool,
    stats: HostStats,
}

impl<S: FrameSink> HeadlessHost<S> {
    pub fn new(cfg: HeadlessConfig, sink: S) -> WildwoodResult<Self> {
        if cfg.refresh.num == 0 || cfg.refresh.den == 0 {
            return Err(WildwoodError::validation("refresh rate must be non-zero"));
        }
        Ok(Self {
            cfg,
            viewport: cfg.viewport,
            now_ms: 0.0,
            next_tick: 1,
            next_handle: 0,
            pending: BTreeSet::new(),
            in_flight: VecDeque::new(),
            next_listener: 0,
            listeners: BTreeSet::new(),
            resizes: VecDeque::new(),
            sink,
            sink_started: false,
            stats: HostStats::default(),
        })
    }

    /// Queue a viewport change, applied at the first refresh at or after `at_ms`.
    pub fn schedule_resize(&mut self, at_ms: f64, size: LogicalSize) {
        let event = ResizeEvent { at_ms, size };
        let pos = self.resizes.partition_point(|e| e.at_ms <= at_ms);
        self.resizes.insert(pos, event);
    }

    pub fn viewport(&self) -> LogicalSize {
        self.viewport
    }

    pub fn stats(&self) -> HostStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of frame requests not yet delivered or cancelled.
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Start the sink with the backing size the viewport has right now.
    ///
    /// Called implicitly by [`HeadlessHost::run_until`]; calling it again is a no-op.
    pub fn begin(&mut self) -> WildwoodResult<()> {
        if self.sink_started {
            return Ok(());
        }
        let scale = clamp_device_pixel_ratio(self.cfg.device_pixel_ratio);
        let backing = |v: f64| (v.max(0.0) * scale).floor() as u32;
        self.sink.begin(SinkConfig {
            width: backing(self.viewport.width),
            height: backing(self.viewport.height),
            fps: self.cfg.refresh,
        })?;
        self.sink_started = true;
        Ok(())
    }

    /// Advance the virtual display through every refresh up to and including `until_ms`.
    ///
    /// Each refresh first applies due resizes (notifying every registered listener), then
    /// delivers the frame callbacks that were requested before the refresh started.
    pub fn run_until<E: HostEvents>(
        &mut self,
        events: &mut E,
        until_ms: f64,
    ) -> WildwoodResult<()> {
        self.begin()?;
        loop {
            let tick_ms = self.tick_time_ms(self.next_tick);
            if tick_ms > until_ms {
                break;
            }
            self.now_ms = tick_ms;
            self.next_tick += 1;
            self.stats.ticks += 1;

            self.dispatch_resizes(events)?;
            self.dispatch_frames(events)?;
        }
        Ok(())
    }

    /// End the sink and hand it back along with the run counters.
    pub fn finish(mut self) -> WildwoodResult<(S, HostStats)> {
        if self.sink_started {
            self.sink.end()?;
        }
        Ok((self.sink, self.stats))
    }

    fn tick_time_ms(&self, tick: u64) -> f64 {
        let Fps { num, den } = self.cfg.refresh;
        (tick as f64 * 1000.0 * f64::from(den)) / f64::from(num)
    }

    fn dispatch_resizes<E: HostEvents>(&mut self, events: &mut E) -> WildwoodResult<()> {
        while let Some(event) = self.resizes.front().copied() {
            if event.at_ms > self.now_ms {
                break;
            }
            self.resizes.pop_front();
            self.viewport = event.size;
            tracing::debug!(
                at_ms = self.now_ms,
                width = event.size.width,
                height = event.size.height,
                "viewport resized"
            );

            let listeners: Vec<ListenerId> = self.listeners.iter().copied().collect();
            for id in listeners {
                // A listener removed by an earlier callback is not notified.
                if self.listeners.contains(&id) {
                    self.stats.resize_callbacks += 1;
                    events.on_resize(id, self)?;
                }
            }
        }
        Ok(())
    }

    fn dispatch_frames<E: HostEvents>(&mut self, events: &mut E) -> WildwoodResult<()> {
        // Requests made while these callbacks run wait for the next refresh.
        self.in_flight = std::mem::take(&mut self.pending).into_iter().collect();
        while let Some(handle) = self.in_flight.pop_front() {
            self.stats.frame_callbacks += 1;
            events.on_animation_frame(handle, self.now_ms, self)?;
        }
        Ok(())
    }
}

impl<S: FrameSink> FrameScheduler for HeadlessHost<S> {
    fn request_animation_frame(&mut self) -> FrameHandle {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending.insert(handle);
        handle
    }

    fn cancel_animation_frame(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
        self.in_flight.retain(|h| *h != handle);
    }
}

impl<S: FrameSink> Host for HeadlessHost<S> {
    fn container_rect(&self) -> Rect {
        self.viewport.to_rect()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.cfg.device_pixel_ratio
    }

    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn present(&mut self, frame: &FrameRGBA) -> WildwoodResult<()> {
        let idx = FrameIndex(self.stats.presented);
        self.sink.push_frame(idx, frame)?;
        self.stats.presented += 1;
        tracing::trace!(frame = idx.0, at_ms = self.now_ms, "frame presented");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/host.rs"]
mod tests;
