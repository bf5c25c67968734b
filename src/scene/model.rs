use serde::Serialize;

/// A conifer from the well-composed population.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BeautifulTree {
    /// Horizontal position in logical pixels; may lie up to 40px outside the viewport.
    pub x: f64,
    /// Vertical baseline; larger values are nearer the viewer.
    pub baseline: f64,
    pub height: f64,
    /// Hue in degrees, within the green band.
    pub hue: f64,
    /// Per-tree sway speed multiplier.
    pub sway: f64,
}

/// A tree from the clashing population. Its colors are picked when drawn, not stored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UglyTree {
    pub x: f64,
    pub baseline: f64,
    pub height: f64,
    pub sway: f64,
}

/// Anything ordered back-to-front by its baseline.
pub trait Depth {
    fn baseline(&self) -> f64;
}

impl Depth for BeautifulTree {
    fn baseline(&self) -> f64 {
        self.baseline
    }
}

impl Depth for UglyTree {
    fn baseline(&self) -> f64 {
        self.baseline
    }
}

/// Borrow `items` in painter's order (ascending baseline). Ties keep generation order.
pub fn depth_sorted<T: Depth>(items: &[T]) -> Vec<&T> {
    let mut out: Vec<&T> = items.iter().collect();
    out.sort_by(|a, b| a.baseline().total_cmp(&b.baseline()));
    out
}

/// Both tree populations for the current viewport.
///
/// Replaced wholesale by every regeneration; renderers only ever borrow it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Scene {
    pub beautiful: Vec<BeautifulTree>,
    pub ugly: Vec<UglyTree>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.beautiful.is_empty() && self.ugly.is_empty()
    }
}
