use rand::Rng;
use rand::rngs::ThreadRng;

use crate::foundation::core::Rect;
use crate::render::backdrop;
use crate::render::plan::{DrawOp, FramePlan};
use crate::render::trees::{self, beautiful_sway, ugly_sway};
use crate::scene::{Scene, depth_sorted};
use crate::surface::Surface;

/// Converts a scene and a timestamp into a [`FramePlan`].
///
/// Owns the per-frame random source that re-rolls mountain ridges, foliage layer counts and
/// clashing colors on every frame. Tree layout randomness lives with the scene generator.
#[derive(Debug)]
pub struct FrameRenderer<R = ThreadRng> {
    rng: R,
}

impl Default for FrameRenderer<ThreadRng> {
    fn default() -> Self {
        Self::new(rand::rng())
    }
}

impl<R: Rng> FrameRenderer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Build the full back-to-front plan for one frame.
    ///
    /// `timestamp_ms` drives the star twinkle; `elapsed_s` (seconds since mount) drives sway.
    /// An empty surface yields a plan with no ops.
    pub fn compose(
        &mut self,
        surface: &Surface,
        scene: &Scene,
        timestamp_ms: f64,
        elapsed_s: f64,
    ) -> FramePlan {
        let size = surface.logical_size();
        let mut plan = FramePlan {
            logical: size,
            backing_width: surface.backing_width(),
            backing_height: surface.backing_height(),
            device_transform: surface.transform(),
            ops: Vec::new(),
        };
        if surface.is_empty() || size.is_empty() {
            tracing::trace!("empty surface; nothing to draw");
            return plan;
        }

        let ops = &mut plan.ops;
        ops.push(DrawOp::Clear {
            rect: Rect::new(0.0, 0.0, size.width, size.height),
        });
        backdrop::sky(ops, size);
        backdrop::stars(ops, size, timestamp_ms);
        backdrop::mountains(ops, size, &mut self.rng);
        backdrop::ground(ops, size);
        backdrop::fog(ops, size);

        for tree in depth_sorted(&scene.beautiful) {
            let dx = beautiful_sway(tree, elapsed_s);
            trees::beautiful_tree(
                ops,
                &mut self.rng,
                tree.x + dx,
                tree.baseline,
                tree.height,
                tree.hue,
            );
        }

        // Second pass: clashing trees always land on top of the whole first population.
        for tree in depth_sorted(&scene.ugly) {
            let dx = ugly_sway(tree, elapsed_s);
            trees::ugly_tree(ops, &mut self.rng, tree.x + dx, tree.baseline, tree.height);
        }

        plan
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
