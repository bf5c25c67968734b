use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::foundation::core::LogicalSize;
use crate::render::plan::{Layer, Paint};
use crate::scene::{BeautifulTree, UglyTree, generate_scene};

fn sized(w: f64, h: f64, dpr: f64) -> Surface {
    let mut s = Surface::new();
    s.resize(Rect::new(0.0, 0.0, w, h), dpr);
    s
}

fn ops_in(plan: &FramePlan, layer: Layer) -> impl Iterator<Item = &DrawOp> {
    plan.ops.iter().filter(move |op| op.layer() == Some(layer))
}

fn renderer(seed: u64) -> FrameRenderer<StdRng> {
    FrameRenderer::new(StdRng::seed_from_u64(seed))
}

#[test]
fn layers_are_drawn_back_to_front() {
    let surface = sized(400.0, 300.0, 1.0);
    let scene = generate_scene(surface.logical_size(), &mut StdRng::seed_from_u64(1));
    let plan = renderer(2).compose(&surface, &scene, 16.0, 0.016);

    assert!(matches!(plan.ops[0], DrawOp::Clear { .. }));
    let order = [
        Layer::Sky,
        Layer::Stars,
        Layer::Mountains,
        Layer::Ground,
        Layer::Fog,
        Layer::BeautifulTrees,
        Layer::UglyTrees,
    ];
    let rank = |l: Layer| order.iter().position(|o| *o == l).unwrap_or(usize::MAX);
    let ranks: Vec<usize> = plan.ops.iter().filter_map(|op| op.layer()).map(rank).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn ugly_trees_composite_above_all_beautiful_trees() {
    let surface = sized(400.0, 300.0, 1.0);
    // A clashing tree far behind every conifer still paints after them.
    let scene = Scene {
        beautiful: vec![BeautifulTree {
            x: 100.0,
            baseline: 290.0,
            height: 80.0,
            hue: 140.0,
            sway: 0.3,
        }],
        ugly: vec![UglyTree {
            x: 100.0,
            baseline: 10.0,
            height: 80.0,
            sway: 0.3,
        }],
    };
    let plan = renderer(4).compose(&surface, &scene, 0.0, 0.0);
    let last_beautiful = plan
        .ops
        .iter()
        .rposition(|op| op.layer() == Some(Layer::BeautifulTrees))
        .unwrap();
    let first_ugly = plan
        .ops
        .iter()
        .position(|op| op.layer() == Some(Layer::UglyTrees))
        .unwrap();
    assert!(last_beautiful < first_ugly);
}

#[test]
fn trees_are_painted_in_baseline_order() {
    let surface = sized(400.0, 300.0, 1.0);
    let tree = |baseline: f64, hue: f64| BeautifulTree {
        x: 50.0,
        baseline,
        height: 60.0,
        hue,
        sway: 0.2,
    };
    let scene = Scene {
        beautiful: vec![tree(250.0, 120.0), tree(150.0, 160.0), tree(200.0, 140.0)],
        ugly: Vec::new(),
    };
    let plan = renderer(6).compose(&surface, &scene, 0.0, 0.0);
    let trunk_bottoms: Vec<f64> = ops_in(&plan, Layer::BeautifulTrees)
        .filter_map(|op| match op {
            DrawOp::FillRect {
                rect,
                paint: Paint::Solid(_),
                ..
            } => Some(rect.y1),
            _ => None,
        })
        .collect();
    assert_eq!(trunk_bottoms, vec![150.0, 200.0, 250.0]);
}

#[test]
fn compose_does_not_touch_the_scene() {
    let surface = sized(640.0, 480.0, 2.0);
    let scene = generate_scene(surface.logical_size(), &mut StdRng::seed_from_u64(8));
    let before = scene.clone();
    let mut r = renderer(9);
    for i in 0..5 {
        r.compose(&surface, &scene, i as f64 * 16.7, i as f64 * 0.0167);
    }
    assert_eq!(scene, before);
}

#[test]
fn plan_carries_device_geometry() {
    let surface = sized(640.0, 480.0, 2.0);
    let plan = renderer(1).compose(&surface, &Scene::default(), 0.0, 0.0);
    assert_eq!((plan.backing_width, plan.backing_height), (1280, 960));
    assert_eq!(plan.logical, LogicalSize::new(640.0, 480.0));
    assert_eq!(plan.device_transform, kurbo::Affine::scale(2.0));
}

#[test]
fn empty_surface_produces_empty_plan() {
    let surface = sized(0.0, 0.0, 1.0);
    let scene = generate_scene(LogicalSize::new(0.0, 0.0), &mut StdRng::seed_from_u64(3));
    let plan = renderer(1).compose(&surface, &scene, 0.0, 0.0);
    assert!(plan.is_empty());
}

#[test]
fn mountains_differ_between_frames() {
    let surface = sized(400.0, 300.0, 1.0);
    let scene = Scene::default();
    let mut r = renderer(12);
    let a = r.compose(&surface, &scene, 0.0, 0.0);
    let b = r.compose(&surface, &scene, 0.0, 0.0);
    let ridge = |p: &FramePlan| ops_in(p, Layer::Mountains).cloned().collect::<Vec<_>>();
    assert_ne!(ridge(&a), ridge(&b));
    // Stars depend on time only.
    let stars = |p: &FramePlan| ops_in(p, Layer::Stars).cloned().collect::<Vec<_>>();
    assert_eq!(stars(&a), stars(&b));
}
