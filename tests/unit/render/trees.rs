use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::foundation::core::Rgba8Premul;

fn beautiful(x: f64, sway: f64) -> BeautifulTree {
    BeautifulTree {
        x,
        baseline: 400.0,
        height: 80.0,
        hue: 140.0,
        sway,
    }
}

fn ugly(x: f64, sway: f64) -> UglyTree {
    UglyTree {
        x,
        baseline: 450.0,
        height: 100.0,
        sway,
    }
}

#[test]
fn sway_never_exceeds_amplitude() {
    for step in 0..5000 {
        let t = step as f64 * 0.37;
        for x in [-40.0, 0.0, 123.4, 900.0] {
            assert!(beautiful_sway(&beautiful(x, 0.6), t).abs() <= BEAUTIFUL_SWAY_PX);
            assert!(ugly_sway(&ugly(x, 0.5), t).abs() <= UGLY_SWAY_PX);
        }
    }
}

#[test]
fn sway_phase_depends_on_position() {
    let a = beautiful_sway(&beautiful(0.0, 0.3), 0.0);
    let b = beautiful_sway(&beautiful(100.0, 0.3), 0.0);
    assert_eq!(a, 0.0);
    assert!((b - 1.0f64.sin() * 2.0).abs() < 1e-12);
}

#[test]
fn beautiful_tree_has_trunk_and_four_to_six_layers() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut seen = [false; 7];
    for _ in 0..200 {
        let mut ops = Vec::new();
        beautiful_tree(&mut ops, &mut rng, 50.0, 300.0, 90.0, 140.0);
        let layers = ops.len() - 1;
        assert!((4..=6).contains(&layers), "{layers}");
        seen[layers] = true;
        assert!(matches!(ops[0], DrawOp::FillRect { .. }));
        assert!(ops.iter().all(|op| op.layer() == Some(Layer::BeautifulTrees)));
    }
    assert!(seen[4] && seen[5] && seen[6]);
}

#[test]
fn foliage_gets_lighter_per_layer() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut ops = Vec::new();
    beautiful_tree(&mut ops, &mut rng, 0.0, 0.0, 100.0, 150.0);
    let sums: Vec<u32> = ops[1..]
        .iter()
        .map(|op| match op {
            DrawOp::FillPath { color, .. } => {
                u32::from(color.r) + u32::from(color.g) + u32::from(color.b)
            }
            _ => 0,
        })
        .collect();
    assert!(sums.windows(2).all(|w| w[0] < w[1]), "{sums:?}");
}

#[test]
fn foliage_triangle_geometry() {
    let path = foliage_layer(10.0, 100.0, 50.0, 1);
    let pts: Vec<_> = path
        .elements()
        .iter()
        .filter_map(|el| match el {
            kurbo::PathEl::MoveTo(p) | kurbo::PathEl::LineTo(p) => Some(*p),
            _ => None,
        })
        .collect();
    // layer_h = 50 * 0.38 = 19, layer_w = 50 * 0.30 = 15
    assert!((pts[0].y - 81.0).abs() < 1e-9);
    assert!((pts[1].x - (-5.0)).abs() < 1e-9);
    assert!((pts[2].x - 25.0).abs() < 1e-9);
    assert!((pts[1].y - (100.0 - 19.0 * 0.2)).abs() < 1e-9);
}

#[test]
fn ugly_tree_is_glow_crown_then_trunk() {
    let foliage: Vec<Rgba8Premul> = UGLY_FOLIAGE
        .iter()
        .map(|&(h, s, l)| ColorDef::hsl(h, s, l).to_rgba8_premul())
        .collect();
    let trunks: Vec<Rgba8Premul> = UGLY_TRUNKS.iter().map(|c| c.to_rgba8_premul()).collect();

    let mut rng = StdRng::seed_from_u64(21);
    let mut crown_colors = std::collections::HashSet::new();
    for _ in 0..100 {
        let mut ops = Vec::new();
        ugly_tree(&mut ops, &mut rng, 200.0, 500.0, 120.0);
        assert_eq!(ops.len(), 3);
        let DrawOp::Glow { blur, .. } = &ops[0] else {
            panic!("glow first");
        };
        assert_eq!(*blur, 8.0);
        let DrawOp::FillPath { color, .. } = &ops[1] else {
            panic!("crown second");
        };
        assert!(foliage.contains(color));
        crown_colors.insert(*color);
        let DrawOp::FillPath { color, .. } = &ops[2] else {
            panic!("trunk third");
        };
        assert!(trunks.contains(color));
    }
    // Colors are re-rolled per draw.
    assert!(crown_colors.len() > 1);
}

#[test]
fn crown_has_five_to_nine_spikes() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..100 {
        let crown = spiked_crown(&mut rng, 100.0);
        // One point per spike plus close_path.
        let spikes = crown.elements().len() - 1;
        assert!((5..=9).contains(&spikes), "{spikes}");
    }
}
