use rand::Rng;

use crate::foundation::core::LogicalSize;
use crate::scene::model::{BeautifulTree, Scene, UglyTree};

pub const BEAUTIFUL_TREE_COUNT: usize = 160;
pub const UGLY_TREE_BASE_COUNT: usize = 10;
/// Exclusive bound on the random number of ugly trees added to the base count.
pub const UGLY_TREE_EXTRA_MAX: usize = 6;
/// Trees may spawn this far past either horizontal edge.
pub const SPAWN_MARGIN: f64 = 40.0;

fn spawn_x<R: Rng + ?Sized>(rng: &mut R, width: f64) -> f64 {
    rng.random_range(-SPAWN_MARGIN..width + SPAWN_MARGIN)
}

fn beautiful_tree<R: Rng + ?Sized>(rng: &mut R, size: LogicalSize) -> BeautifulTree {
    let depth: f64 = rng.random();
    let baseline = size.height * (0.45 + depth * 0.5) + rng.random_range(-6.0..6.0);
    let height = 40.0 + depth * 90.0 + rng.random_range(-6.0..10.0);
    let hue = 130.0 + depth * 30.0 + rng.random_range(-6.0..6.0);
    let sway = rng.random_range(0.2..0.6);
    BeautifulTree {
        x: spawn_x(rng, size.width),
        baseline,
        height,
        hue,
        sway,
    }
}

fn ugly_tree<R: Rng + ?Sized>(rng: &mut R, size: LogicalSize) -> UglyTree {
    let depth: f64 = rng.random();
    let baseline = size.height * (0.5 + depth * 0.48) + rng.random_range(-8.0..8.0);
    let height = 60.0 + depth * 110.0 + rng.random_range(-10.0..14.0);
    let sway = rng.random_range(0.1..0.5);
    UglyTree {
        x: spawn_x(rng, size.width),
        baseline,
        height,
        sway,
    }
}

/// Lay out a fresh forest for a viewport of `size` logical pixels.
///
/// The ugly population size is drawn once here, so it holds steady until the next call.
/// A viewport narrower than zero is treated as zero wide.
#[tracing::instrument(level = "debug", skip(rng))]
pub fn generate_scene<R: Rng + ?Sized>(size: LogicalSize, rng: &mut R) -> Scene {
    let size = LogicalSize::new(finite_or_zero(size.width), finite_or_zero(size.height));
    let ugly_count = UGLY_TREE_BASE_COUNT + rng.random_range(0..UGLY_TREE_EXTRA_MAX);

    let beautiful = (0..BEAUTIFUL_TREE_COUNT)
        .map(|_| beautiful_tree(rng, size))
        .collect();
    let ugly = (0..ugly_count).map(|_| ugly_tree(rng, size)).collect();

    tracing::debug!(ugly_count, "scene regenerated");
    Scene { beautiful, ugly }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

impl Scene {
    /// Discard both populations and lay out new ones for `size`.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, size: LogicalSize, rng: &mut R) {
        *self = generate_scene(size, rng);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/generate.rs"]
mod tests;
