use super::*;

fn frame(width: u32, height: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: px.repeat((width * height) as usize),
        premultiplied: true,
    }
}

const BG: [u8; 4] = [10, 20, 30, 255];

fn canvas_px(canvas: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [canvas[i], canvas[i + 1], canvas[i + 2], canvas[i + 3]]
}

#[test]
fn fit_pads_smaller_frames_with_background() {
    let mut canvas = vec![0u8; 4 * 4 * 4];
    fit_top_left(&mut canvas, 4, 4, &frame(2, 2, [255, 0, 0, 255]), BG).unwrap();
    assert_eq!(canvas_px(&canvas, 4, 1, 1), [255, 0, 0, 255]);
    assert_eq!(canvas_px(&canvas, 4, 2, 0), BG);
    assert_eq!(canvas_px(&canvas, 4, 0, 3), BG);
}

#[test]
fn fit_crops_larger_frames() {
    let mut canvas = vec![0u8; 2 * 2 * 4];
    fit_top_left(&mut canvas, 2, 2, &frame(5, 3, [0, 255, 0, 255]), BG).unwrap();
    assert!(canvas.chunks_exact(4).all(|px| px == [0, 255, 0, 255]));
}

#[test]
fn fit_flattens_translucent_pixels_and_empty_frames() {
    let mut canvas = vec![0u8; 2 * 2 * 4];
    fit_top_left(&mut canvas, 2, 2, &frame(2, 2, [0, 0, 0, 0]), BG).unwrap();
    assert!(canvas.chunks_exact(4).all(|px| px == BG));

    fit_top_left(&mut canvas, 2, 2, &FrameRGBA::empty(), BG).unwrap();
    assert!(canvas.chunks_exact(4).all(|px| px == BG));
}

#[test]
fn fit_rejects_mismatched_buffers() {
    let mut canvas = vec![0u8; 3];
    assert!(fit_top_left(&mut canvas, 2, 2, &frame(1, 1, BG), BG).is_err());
}

#[test]
fn begin_rejects_empty_viewport() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(
        std::env::temp_dir().join("wildwood_ffmpeg_empty.mp4"),
    ));
    let err = sink
        .begin(SinkConfig {
            width: 0,
            height: 480,
            fps: Fps::new(30, 1).unwrap(),
        })
        .unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2, BG)).is_err());
}
