use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::scene::model::depth_sorted;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn population_sizes_hold_across_regenerations() {
    let mut rng = rng();
    let mut scene = Scene::default();
    for _ in 0..50 {
        scene.regenerate(LogicalSize::new(800.0, 600.0), &mut rng);
        assert_eq!(scene.beautiful.len(), BEAUTIFUL_TREE_COUNT);
        assert!((10..=15).contains(&scene.ugly.len()), "{}", scene.ugly.len());
    }
}

#[test]
fn beautiful_trees_stay_in_band() {
    let mut rng = rng();
    let size = LogicalSize::new(800.0, 600.0);
    let scene = generate_scene(size, &mut rng);
    for t in &scene.beautiful {
        assert!(t.baseline >= size.height * 0.45 - 6.0);
        assert!(t.baseline <= size.height * 0.95 + 6.0);
        assert!(t.height > 0.0);
        assert!((124.0..166.0).contains(&t.hue), "hue {}", t.hue);
        assert!((0.2..0.6).contains(&t.sway));
        assert!((-40.0..840.0).contains(&t.x));
    }
}

#[test]
fn ugly_trees_stay_in_band() {
    let mut rng = rng();
    let size = LogicalSize::new(800.0, 600.0);
    let scene = generate_scene(size, &mut rng);
    for t in &scene.ugly {
        assert!(t.baseline >= size.height * 0.5 - 8.0);
        assert!(t.baseline <= size.height * 0.98 + 8.0);
        assert!(t.height >= 50.0 && t.height < 184.0);
        assert!((0.1..0.5).contains(&t.sway));
        assert!((-40.0..840.0).contains(&t.x));
    }
}

#[test]
fn wider_viewport_widens_spawn_range() {
    let mut rng = rng();
    let scene = generate_scene(LogicalSize::new(1200.0, 900.0), &mut rng);
    assert!(scene.beautiful.iter().all(|t| (-40.0..1240.0).contains(&t.x)));
    assert!(scene.ugly.iter().all(|t| (-40.0..1240.0).contains(&t.x)));
    // 160 uniform samples over 1280px essentially always reach past the old 840px bound.
    assert!(scene.beautiful.iter().any(|t| t.x > 840.0));
}

#[test]
fn regeneration_replaces_values() {
    let mut rng = rng();
    let size = LogicalSize::new(800.0, 600.0);
    let a = generate_scene(size, &mut rng);
    let b = generate_scene(size, &mut rng);
    assert_eq!(a.beautiful.len(), b.beautiful.len());
    assert_ne!(a.beautiful, b.beautiful);
}

#[test]
fn zero_viewport_still_generates() {
    let mut rng = rng();
    let scene = generate_scene(LogicalSize::new(0.0, 0.0), &mut rng);
    assert_eq!(scene.beautiful.len(), BEAUTIFUL_TREE_COUNT);
    assert!(scene.beautiful.iter().all(|t| (-40.0..40.0).contains(&t.x)));
}

#[test]
fn depth_sort_orders_by_baseline() {
    let mut rng = rng();
    let scene = generate_scene(LogicalSize::new(640.0, 480.0), &mut rng);
    let sorted = depth_sorted(&scene.beautiful);
    assert_eq!(sorted.len(), scene.beautiful.len());
    assert!(sorted.windows(2).all(|w| w[0].baseline <= w[1].baseline));
    let sorted = depth_sorted(&scene.ugly);
    assert!(sorted.windows(2).all(|w| w[0].baseline <= w[1].baseline));
}
