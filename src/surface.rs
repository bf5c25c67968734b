//! Sizing of the drawing surface against its container.
//!
//! The backing store is measured in device pixels while every draw call is issued in logical
//! pixels; [`Surface::transform`] maps one onto the other.

use crate::foundation::core::{Affine, LogicalSize, Rect};

/// Largest device pixel ratio honored when sizing the backing store.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

/// Clamp a reported device pixel ratio to `[1, MAX_DEVICE_PIXEL_RATIO]`.
///
/// Missing or nonsensical ratios (non-finite, zero, negative) fall back to 1.
pub fn clamp_device_pixel_ratio(dpr: f64) -> f64 {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    dpr.clamp(1.0, MAX_DEVICE_PIXEL_RATIO)
}

/// A drawing surface's current geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    logical: LogicalSize,
    scale: f64,
    backing_width: u32,
    backing_height: u32,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            logical: LogicalSize::default(),
            scale: 1.0,
            backing_width: 0,
            backing_height: 0,
        }
    }
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-measure against the container's on-screen rectangle.
    ///
    /// Negative or non-finite container dimensions are treated as zero, which leaves a
    /// zero-sized backing store and turns drawing into a no-op until the next resize.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resize(&mut self, container: Rect, device_pixel_ratio: f64) {
        let scale = clamp_device_pixel_ratio(device_pixel_ratio);
        let sanitize = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let width = sanitize(container.width());
        let height = sanitize(container.height());

        self.logical = LogicalSize::new(width, height);
        self.scale = scale;
        self.backing_width = (width * scale).floor() as u32;
        self.backing_height = (height * scale).floor() as u32;

        tracing::debug!(
            backing_width = self.backing_width,
            backing_height = self.backing_height,
            scale,
            "surface resized"
        );
    }

    /// Displayed size in logical pixels.
    pub fn logical_size(&self) -> LogicalSize {
        self.logical
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn backing_width(&self) -> u32 {
        self.backing_width
    }

    pub fn backing_height(&self) -> u32 {
        self.backing_height
    }

    pub fn is_empty(&self) -> bool {
        self.backing_width == 0 || self.backing_height == 0
    }

    /// Logical-to-device transform applied beneath every draw call.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../tests/unit/surface.rs"]
mod tests;
