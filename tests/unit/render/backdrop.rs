use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

#[test]
fn stars_stay_put_and_inside_band() {
    let size = LogicalSize::new(800.0, 600.0);
    for i in 0..STAR_COUNT {
        let p = star_position(i, size);
        assert_eq!(p, star_position(i, size));
        assert!(p.x >= -0.5 && p.x < 800.5);
        assert!(p.y >= 0.0 && p.y < 240.0);
    }
}

#[test]
fn star_alpha_oscillates_within_bounds() {
    let lo = 0.6 * 0.5 / 3.5;
    let hi = 0.6 * 2.5 / 3.5;
    let mut seen_low = false;
    let mut seen_high = false;
    for step in 0..2000 {
        let a = star_alpha(3, step as f64 * 5.0);
        assert!(a >= lo - 1e-12 && a <= hi + 1e-12);
        seen_low |= a < 0.15;
        seen_high |= a > 0.35;
    }
    assert!(seen_low && seen_high);
}

#[test]
fn mountain_jitters_between_calls() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = mountain_path(&mut rng, 800.0, 372.0, 0.55);
    let b = mountain_path(&mut rng, 800.0, 372.0, 0.55);
    assert_ne!(a, b);

    // move_to + one point per 60px step (0..=780 -> 14) + 2 closing corners + close_path.
    assert_eq!(a.elements().len(), 1 + 14 + 2 + 1);
    for el in a.elements() {
        if let kurbo::PathEl::LineTo(p) = el {
            assert!(p.y >= 372.0 - 180.0 * 0.55 && p.y <= 372.0 + 40.0);
        }
    }
}

#[test]
fn backdrop_ops_cover_expected_layers() {
    let size = LogicalSize::new(320.0, 200.0);
    let mut rng = StdRng::seed_from_u64(9);
    let mut ops = Vec::new();
    sky(&mut ops, size);
    stars(&mut ops, size, 1234.0);
    mountains(&mut ops, size, &mut rng);
    ground(&mut ops, size);
    fog(&mut ops, size);

    let count = |layer| ops.iter().filter(|op| op.layer() == Some(layer)).count();
    assert_eq!(count(Layer::Sky), 1);
    assert_eq!(count(Layer::Stars), STAR_COUNT);
    assert_eq!(count(Layer::Mountains), 2);
    assert_eq!(count(Layer::Ground), 1);
    assert_eq!(count(Layer::Fog), 3);
}

#[test]
fn fog_fades_from_transparent() {
    let mut ops = Vec::new();
    fog(&mut ops, LogicalSize::new(100.0, 1000.0));
    let DrawOp::FillRect {
        rect,
        paint: Paint::Vertical(g),
        ..
    } = &ops[0]
    else {
        panic!("fog band should be a gradient rect");
    };
    assert_eq!(*rect, Rect::new(0.0, 560.0, 100.0, 740.0));
    assert_eq!(g.sample(rect.y0).a, 0);
    assert_eq!(g.sample(rect.y1).a, (0.08f64 * 255.0).round() as u8);

    // Later bands are denser.
    let alphas: Vec<u8> = ops
        .iter()
        .map(|op| match op {
            DrawOp::FillRect {
                paint: Paint::Vertical(g),
                ..
            } => g.sample(f64::MAX).a,
            _ => 0,
        })
        .collect();
    assert!(alphas.windows(2).all(|w| w[0] < w[1]));
}
