use super::*;

#[test]
fn device_pixel_ratio_is_clamped() {
    assert_eq!(clamp_device_pixel_ratio(0.5), 1.0);
    assert_eq!(clamp_device_pixel_ratio(1.5), 1.5);
    assert_eq!(clamp_device_pixel_ratio(3.0), 2.0);
    assert_eq!(clamp_device_pixel_ratio(0.0), 1.0);
    assert_eq!(clamp_device_pixel_ratio(-2.0), 1.0);
    assert_eq!(clamp_device_pixel_ratio(f64::NAN), 1.0);
}

#[test]
fn backing_store_scales_with_ratio() {
    let mut s = Surface::new();
    s.resize(Rect::new(0.0, 0.0, 800.0, 600.0), 1.0);
    assert_eq!((s.backing_width(), s.backing_height()), (800, 600));
    assert_eq!(s.logical_size(), LogicalSize::new(800.0, 600.0));

    s.resize(Rect::new(0.0, 72.0, 1200.0, 972.0), 1.5);
    assert_eq!((s.backing_width(), s.backing_height()), (1800, 1350));
    assert_eq!(s.logical_size(), LogicalSize::new(1200.0, 900.0));
    assert_eq!(s.transform(), Affine::scale(1.5));

    s.resize(Rect::new(0.0, 0.0, 1200.0, 900.0), 4.0);
    assert_eq!((s.backing_width(), s.backing_height()), (2400, 1800));
}

#[test]
fn fractional_sizes_floor() {
    let mut s = Surface::new();
    s.resize(Rect::new(0.0, 0.0, 100.7, 50.2), 1.25);
    assert_eq!(s.backing_width(), 125);
    assert_eq!(s.backing_height(), 62);
}

#[test]
fn zero_container_gives_empty_surface() {
    let mut s = Surface::new();
    assert!(s.is_empty());
    s.resize(Rect::new(0.0, 0.0, 0.0, 600.0), 2.0);
    assert!(s.is_empty());
    assert_eq!(s.backing_width(), 0);
    assert_eq!(s.backing_height(), 600 * 2);
}
