//! Everything behind the trees: sky, stars, mountains, ground and fog.

use rand::Rng;

use crate::foundation::core::{Affine, BezPath, LogicalSize, Point, Rect, Rgba8Premul};
use crate::paint::color::ColorDef;
use crate::render::plan::{DrawOp, Layer, Paint, VerticalGradient};

pub const STAR_COUNT: usize = 80;
/// Stars occupy the top part of the sky only.
const STAR_BAND: f64 = 0.4;
const STAR_ALPHA: f64 = 0.6;

const MOUNTAIN_STEP: f64 = 60.0;

/// `(baseline fraction of height, color, jaggedness)`, back ridge first.
const MOUNTAINS: [(f64, ColorDef, f64); 2] = [
    (0.62, ColorDef::rgb8(0x0e, 0x1a, 0x2d), 0.55),
    (0.70, ColorDef::rgb8(0x0b, 0x15, 0x26), 0.8),
];

/// `(center fraction of height, opacity)`, farthest band first.
const FOG_BANDS: [(f64, f64); 3] = [(0.62, 0.08), (0.72, 0.12), (0.82, 0.16)];

const GROUND_TOP: f64 = 0.55;

fn premul(c: ColorDef) -> Rgba8Premul {
    c.to_rgba8_premul()
}

pub(crate) fn sky(ops: &mut Vec<DrawOp>, size: LogicalSize) {
    let gradient = VerticalGradient::new(0.0, size.height)
        .stop(0.0, premul(ColorDef::rgb8(0x0b, 0x10, 0x20)))
        .stop(0.4, premul(ColorDef::rgb8(0x11, 0x1a, 0x2e)))
        .stop(1.0, premul(ColorDef::rgb8(0x0a, 0x12, 0x0f)));
    ops.push(DrawOp::FillRect {
        rect: size.to_rect(),
        paint: Paint::Vertical(gradient),
        layer: Layer::Sky,
    });
}

/// Position of star `i`. Fixed for a given viewport so stars never wander between frames.
pub fn star_position(i: usize, size: LogicalSize) -> Point {
    let fi = i as f64;
    let nudge = if i % 2 == 1 { 0.5 } else { -0.5 };
    Point::new(
        (fi * 73.7) % size.width + nudge,
        (fi * 91.3) % (size.height * STAR_BAND),
    )
}

/// Opacity of star `i` at `timestamp_ms`, in `[0.6 * 0.5 / 3.5, 0.6 * 2.5 / 3.5]`.
pub fn star_alpha(i: usize, timestamp_ms: f64) -> f64 {
    let twinkle = ((timestamp_ms * 0.0015 + i as f64).sin() + 1.5) / 3.5;
    STAR_ALPHA * twinkle
}

pub(crate) fn stars(ops: &mut Vec<DrawOp>, size: LogicalSize, timestamp_ms: f64) {
    for i in 0..STAR_COUNT {
        let p = star_position(i, size);
        let color = ColorDef::rgba8(255, 255, 255, star_alpha(i, timestamp_ms));
        ops.push(DrawOp::FillRect {
            rect: Rect::new(p.x, p.y, p.x + 1.0, p.y + 1.0),
            paint: Paint::Solid(premul(color)),
            layer: Layer::Stars,
        });
    }
}

/// A jagged ridgeline whose peaks are re-rolled on every call.
pub fn mountain_path<R: Rng + ?Sized>(
    rng: &mut R,
    width: f64,
    base_y: f64,
    jagged: f64,
) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((0.0, base_y));
    let mut x = 0.0;
    while x <= width {
        let peak = base_y - rng.random_range(60.0..180.0) * jagged;
        path.line_to((x + rng.random_range(20.0..MOUNTAIN_STEP), peak));
        x += MOUNTAIN_STEP;
    }
    path.line_to((width + 40.0, base_y + 40.0));
    path.line_to((-40.0, base_y + 40.0));
    path.close_path();
    path
}

pub(crate) fn mountains<R: Rng + ?Sized>(ops: &mut Vec<DrawOp>, size: LogicalSize, rng: &mut R) {
    for (base, color, jagged) in MOUNTAINS {
        ops.push(DrawOp::FillPath {
            path: mountain_path(rng, size.width, size.height * base, jagged),
            transform: Affine::IDENTITY,
            color: premul(color),
            layer: Layer::Mountains,
        });
    }
}

pub(crate) fn ground(ops: &mut Vec<DrawOp>, size: LogicalSize) {
    let top = size.height * GROUND_TOP;
    let gradient = VerticalGradient::new(top, size.height)
        .stop(0.0, premul(ColorDef::rgb8(0x0b, 0x17, 0x14)))
        .stop(1.0, premul(ColorDef::rgb8(0x0a, 0x0f, 0x0d)));
    ops.push(DrawOp::FillRect {
        rect: Rect::new(0.0, top, size.width, size.height),
        paint: Paint::Vertical(gradient),
        layer: Layer::Ground,
    });
}

fn fog_band(ops: &mut Vec<DrawOp>, width: f64, y: f64, opacity: f64) {
    let haze = ColorDef::rgba8(200, 220, 255, 1.0);
    let gradient = VerticalGradient::new(y - 60.0, y + 100.0)
        .stop(0.0, premul(haze.with_alpha(0.0)))
        .stop(1.0, premul(haze.with_alpha(opacity)));
    ops.push(DrawOp::FillRect {
        rect: Rect::new(0.0, y - 60.0, width, y + 120.0),
        paint: Paint::Vertical(gradient),
        layer: Layer::Fog,
    });
}

pub(crate) fn fog(ops: &mut Vec<DrawOp>, size: LogicalSize) {
    for (center, opacity) in FOG_BANDS {
        fog_band(ops, size.width, size.height * center, opacity);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backdrop.rs"]
mod tests;
