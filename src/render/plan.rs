use crate::foundation::core::{Affine, BezPath, LogicalSize, Rect, Rgba8Premul};

/// Which part of the scene an op belongs to. Used for diagnostics and ordering checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Sky,
    Stars,
    Mountains,
    Ground,
    Fog,
    BeautifulTrees,
    UglyTrees,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient axis in `0..=1`.
    pub offset: f32,
    pub color: Rgba8Premul,
}

/// Linear gradient along the vertical axis, in logical pixels.
///
/// Outside `[y0, y1]` the nearest end color is extended.
#[derive(Clone, Debug, PartialEq)]
pub struct VerticalGradient {
    pub y0: f64,
    pub y1: f64,
    pub stops: Vec<GradientStop>,
}

impl VerticalGradient {
    pub fn new(y0: f64, y1: f64) -> Self {
        Self {
            y0,
            y1,
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: f32, color: Rgba8Premul) -> Self {
        self.stops.push(GradientStop { offset, color });
        self
    }

    /// Color at logical height `y`.
    pub fn sample(&self, y: f64) -> Rgba8Premul {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgba8Premul::transparent();
        };
        let span = self.y1 - self.y0;
        let t = if span.abs() <= f64::EPSILON {
            if y < self.y0 { 0.0 } else { 1.0 }
        } else {
            ((y - self.y0) / span) as f32
        };

        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let width = b.offset - a.offset;
                if width <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.offset) / width);
            }
        }
        last.color
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba8Premul),
    Vertical(VerticalGradient),
}

/// One drawing command, in logical pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Discard everything drawn so far. `rect` is the region that must end up cleared;
    /// backends may clear the whole target.
    Clear { rect: Rect },
    FillRect {
        rect: Rect,
        paint: Paint,
        layer: Layer,
    },
    FillPath {
        path: BezPath,
        transform: Affine,
        color: Rgba8Premul,
        layer: Layer,
    },
    /// Soft halo around `path`, drawn beneath a fill of the same shape.
    Glow {
        path: BezPath,
        transform: Affine,
        color: Rgba8Premul,
        blur: f64,
        layer: Layer,
    },
}

impl DrawOp {
    pub fn layer(&self) -> Option<Layer> {
        match self {
            DrawOp::Clear { .. } => None,
            DrawOp::FillRect { layer, .. }
            | DrawOp::FillPath { layer, .. }
            | DrawOp::Glow { layer, .. } => Some(*layer),
        }
    }
}

/// Everything needed to paint one frame, independent of the rasterizer.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub logical: LogicalSize,
    pub backing_width: u32,
    pub backing_height: u32,
    /// Logical-to-device transform.
    pub device_transform: Affine,
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
