//! Animation Driver: the mount-scoped frame loop.
//!
//! The driver never renders by itself. It tracks which frame request is outstanding so the
//! component can tell a live tick from a stale one, and it cancels that request on stop.

use crate::host::{FrameHandle, FrameScheduler};

/// Lifecycle of the frame loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriverState {
    /// Not mounted; no frame request outstanding.
    Idle,
    /// Mounted; exactly one frame request outstanding.
    Running {
        /// The request whose callback will drive the next frame.
        pending: FrameHandle,
        /// Host clock reading at mount, in milliseconds.
        origin_ms: f64,
    },
}

#[derive(Debug)]
pub struct AnimationDriver {
    state: DriverState,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self {
            state: DriverState::Idle,
        }
    }
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Running { .. })
    }

    /// Idle -> Running: request the first frame. A running driver is left untouched.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S, origin_ms: f64) {
        if self.is_running() {
            tracing::debug!("animation driver already running");
            return;
        }
        let pending = scheduler.request_animation_frame();
        self.state = DriverState::Running { pending, origin_ms };
        tracing::debug!(handle = pending.0, origin_ms, "animation driver started");
    }

    /// Check a delivered frame callback against the outstanding request.
    ///
    /// Returns the mount origin for a live tick and `None` for stale or post-stop callbacks.
    pub fn accept(&self, handle: FrameHandle) -> Option<f64> {
        match self.state {
            DriverState::Running { pending, origin_ms } if pending == handle => Some(origin_ms),
            _ => None,
        }
    }

    /// Request the next frame after a tick has been rendered.
    pub fn reschedule<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let DriverState::Running { origin_ms, .. } = self.state {
            let pending = scheduler.request_animation_frame();
            self.state = DriverState::Running { pending, origin_ms };
        }
    }

    /// Running -> Idle: cancel the outstanding request.
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let DriverState::Running { pending, .. } = self.state {
            scheduler.cancel_animation_frame(pending);
            tracing::debug!(handle = pending.0, "animation driver stopped");
        }
        self.state = DriverState::Idle;
    }
}

#[cfg(test)]
#[path = "../tests/unit/driver.rs"]
mod tests;
