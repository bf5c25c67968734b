use super::*;
use crate::foundation::core::{LogicalSize, Rect};

#[derive(Default)]
struct MockBackend {
    calls: Vec<&'static str>,
    size: (u32, u32),
}

impl PaintBackend for MockBackend {
    fn begin_frame(&mut self, width: u32, height: u32) -> WildwoodResult<()> {
        self.calls.push("begin_frame");
        self.size = (width, height);
        Ok(())
    }

    fn draw(&mut self, op: &DrawOp, _device: Affine) -> WildwoodResult<()> {
        self.calls.push(match op {
            DrawOp::Clear { .. } => "clear",
            DrawOp::FillRect { .. } => "fill_rect",
            DrawOp::FillPath { .. } => "fill_path",
            DrawOp::Glow { .. } => "glow",
        });
        Ok(())
    }

    fn finish_frame(&mut self) -> WildwoodResult<FrameRGBA> {
        self.calls.push("finish_frame");
        Ok(FrameRGBA {
            width: self.size.0,
            height: self.size.1,
            data: vec![0; (self.size.0 * self.size.1 * 4) as usize],
            premultiplied: true,
        })
    }
}

fn plan(w: u32, h: u32, ops: Vec<DrawOp>) -> FramePlan {
    FramePlan {
        logical: LogicalSize::new(f64::from(w), f64::from(h)),
        backing_width: w,
        backing_height: h,
        device_transform: Affine::IDENTITY,
        ops,
    }
}

#[test]
fn execute_plan_calls_in_expected_order() {
    let p = plan(
        4,
        3,
        vec![
            DrawOp::Clear {
                rect: Rect::new(0.0, 0.0, 4.0, 3.0),
            },
            DrawOp::FillRect {
                rect: Rect::new(0.0, 0.0, 4.0, 3.0),
                paint: crate::render::plan::Paint::Solid(
                    crate::foundation::core::Rgba8Premul::transparent(),
                ),
                layer: crate::render::plan::Layer::Sky,
            },
        ],
    );
    let mut b = MockBackend::default();
    let frame = execute_plan(&mut b, &p).unwrap();
    assert_eq!(b.calls, vec!["begin_frame", "clear", "fill_rect", "finish_frame"]);
    assert_eq!((frame.width, frame.height), (4, 3));
}

#[test]
fn empty_plan_skips_backend() {
    let mut b = MockBackend::default();
    let frame = execute_plan(&mut b, &plan(0, 0, Vec::new())).unwrap();
    assert!(frame.is_empty());
    assert!(b.calls.is_empty());
}

#[test]
fn pixel_lookup_bounds() {
    let f = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(f.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.pixel(0, 1), None);
}

#[test]
fn flatten_over_composites_on_background() {
    let f = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![0, 0, 0, 0, 100, 50, 0, 255],
        premultiplied: true,
    };
    let out = f.flatten_over([10, 20, 30, 255]).unwrap();
    assert_eq!(out, vec![10, 20, 30, 255, 100, 50, 0, 255]);
}
