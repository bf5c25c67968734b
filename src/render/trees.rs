//! Tree primitives and their sway.

use std::f64::consts::TAU;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::foundation::core::{Affine, BezPath, Rect, Vec2};
use crate::paint::color::ColorDef;
use crate::render::plan::{DrawOp, Layer, Paint};
use crate::scene::{BeautifulTree, UglyTree};

pub const BEAUTIFUL_SWAY_PX: f64 = 2.0;
pub const UGLY_SWAY_PX: f64 = 3.0;

const UGLY_ROTATION: f64 = 0.15;
const GLOW_BLUR: f64 = 8.0;

/// `(hue, saturation %, lightness %)` of the clashing foliage colors.
const UGLY_FOLIAGE: [(f64, f64, f64); 4] = [
    (320.0, 85.0, 60.0),
    (190.0, 85.0, 60.0),
    (60.0, 90.0, 60.0),
    (0.0, 90.0, 60.0),
];

const UGLY_TRUNKS: [ColorDef; 3] = [
    ColorDef::rgb8(0x6a, 0x2c, 0x70),
    ColorDef::rgb8(0x26, 0x46, 0x53),
    ColorDef::rgb8(0xc4, 0x45, 0x36),
];

/// Horizontal offset of a well-composed tree `elapsed_s` seconds after mount.
pub fn beautiful_sway(tree: &BeautifulTree, elapsed_s: f64) -> f64 {
    (elapsed_s * tree.sway + tree.x * 0.01).sin() * BEAUTIFUL_SWAY_PX
}

/// Horizontal offset of a clashing tree `elapsed_s` seconds after mount.
pub fn ugly_sway(tree: &UglyTree, elapsed_s: f64) -> f64 {
    (elapsed_s * tree.sway + tree.x * 0.02).sin() * UGLY_SWAY_PX
}

/// Stacked foliage triangle `layer` of a conifer `height` tall, rooted at `(x, base_y)`.
pub(crate) fn foliage_layer(x: f64, base_y: f64, height: f64, layer: usize) -> BezPath {
    let li = layer as f64;
    let layer_h = height * (0.18 + li * 0.2);
    let layer_w = height * (0.12 + li * 0.18);
    let mut path = BezPath::new();
    path.move_to((x, base_y - layer_h));
    path.line_to((x - layer_w, base_y - layer_h * 0.2));
    path.line_to((x + layer_w, base_y - layer_h * 0.2));
    path.close_path();
    path
}

pub(crate) fn beautiful_tree<R: Rng + ?Sized>(
    ops: &mut Vec<DrawOp>,
    rng: &mut R,
    x: f64,
    base_y: f64,
    height: f64,
    hue: f64,
) {
    let trunk = ColorDef::hsl(hue, 25.0, 25.0).to_rgba8_premul();
    ops.push(DrawOp::FillRect {
        rect: Rect::new(
            x - height * 0.03,
            base_y - height * 0.2,
            x + height * 0.03,
            base_y,
        ),
        paint: Paint::Solid(trunk),
        layer: Layer::BeautifulTrees,
    });

    let layers = 4 + rng.random_range(0..3usize);
    for i in 0..layers {
        let lightness = (22.0 + i as f64 * 8.0).clamp(20.0, 55.0);
        ops.push(DrawOp::FillPath {
            path: foliage_layer(x, base_y, height, i),
            transform: Affine::IDENTITY,
            color: ColorDef::hsl(hue, 45.0, lightness).to_rgba8_premul(),
            layer: Layer::BeautifulTrees,
        });
    }
}

/// Irregular spiked crown centered above the local origin.
pub(crate) fn spiked_crown<R: Rng + ?Sized>(rng: &mut R, height: f64) -> BezPath {
    let spikes = 5 + rng.random_range(0..5usize);
    let mut path = BezPath::new();
    for i in 0..spikes {
        let fi = i as f64;
        let angle = fi / spikes as f64 * TAU;
        let r = height * (0.08 + (fi * 2.2).sin() * 0.07 + rng.random_range(0.0..0.1));
        let stretch = if i % 2 == 0 { 1.6 } else { 0.9 };
        let p = (
            angle.cos() * r * stretch,
            -height * 0.4 - angle.sin() * r * 0.6,
        );
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Draw a clashing tree. Colors and shape are re-rolled on every call.
pub(crate) fn ugly_tree<R: Rng + ?Sized>(
    ops: &mut Vec<DrawOp>,
    rng: &mut R,
    x: f64,
    base_y: f64,
    height: f64,
) {
    let transform = Affine::translate(Vec2::new(x, base_y))
        * Affine::rotate(rng.random_range(-UGLY_ROTATION..UGLY_ROTATION));
    let crown = spiked_crown(rng, height);

    let (h, s, l) = *UGLY_FOLIAGE.choose(rng).unwrap_or(&UGLY_FOLIAGE[0]);
    ops.push(DrawOp::Glow {
        path: crown.clone(),
        transform,
        color: ColorDef::rgba8(255, 255, 255, 0.35).to_rgba8_premul(),
        blur: GLOW_BLUR,
        layer: Layer::UglyTrees,
    });
    ops.push(DrawOp::FillPath {
        path: crown,
        transform,
        color: ColorDef::hsl(h, s, l).to_rgba8_premul(),
        layer: Layer::UglyTrees,
    });

    let trunk = *UGLY_TRUNKS.choose(rng).unwrap_or(&UGLY_TRUNKS[0]);
    let trunk_rect = Rect::new(-height * 0.03, -height * 0.2, height * 0.03, height * 0.02);
    ops.push(DrawOp::FillPath {
        path: kurbo::Shape::to_path(&trunk_rect, 0.1),
        transform,
        color: trunk.to_rgba8_premul(),
        layer: Layer::UglyTrees,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/render/trees.rs"]
mod tests;
