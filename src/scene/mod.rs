//! Tree descriptors and the generator that lays them out for a viewport.

mod generate;
mod model;

pub use generate::{
    BEAUTIFUL_TREE_COUNT, SPAWN_MARGIN, UGLY_TREE_BASE_COUNT, UGLY_TREE_EXTRA_MAX, generate_scene,
};
pub use model::{BeautifulTree, Depth, Scene, UglyTree, depth_sorted};
