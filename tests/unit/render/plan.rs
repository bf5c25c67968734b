use super::*;

fn rgb(v: u8) -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(v, v, v, 255)
}

#[test]
fn gradient_samples_and_pads() {
    let g = VerticalGradient::new(100.0, 200.0)
        .stop(0.0, rgb(0))
        .stop(1.0, rgb(200));
    assert_eq!(g.sample(0.0), rgb(0));
    assert_eq!(g.sample(100.0), rgb(0));
    assert_eq!(g.sample(150.0), rgb(100));
    assert_eq!(g.sample(200.0), rgb(200));
    assert_eq!(g.sample(500.0), rgb(200));
}

#[test]
fn gradient_with_middle_stop() {
    let g = VerticalGradient::new(0.0, 100.0)
        .stop(0.0, rgb(0))
        .stop(0.4, rgb(40))
        .stop(1.0, rgb(100));
    assert_eq!(g.sample(20.0), rgb(20));
    assert_eq!(g.sample(40.0), rgb(40));
    assert_eq!(g.sample(70.0), rgb(70));
}

#[test]
fn gradient_without_stops_is_transparent() {
    let g = VerticalGradient::new(0.0, 10.0);
    assert_eq!(g.sample(5.0), Rgba8Premul::transparent());
}

#[test]
fn clear_has_no_layer() {
    let op = DrawOp::Clear {
        rect: Rect::new(0.0, 0.0, 1.0, 1.0),
    };
    assert_eq!(op.layer(), None);
    let op = DrawOp::FillRect {
        rect: Rect::new(0.0, 0.0, 1.0, 1.0),
        paint: Paint::Solid(rgb(1)),
        layer: Layer::Ground,
    };
    assert_eq!(op.layer(), Some(Layer::Ground));
}
