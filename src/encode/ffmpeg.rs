use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{WildwoodError, WildwoodResult};
use crate::foundation::math::flatten_to_opaque_rgba8;
use crate::render::backend::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha and pad undersized frames (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// The video canvas is fixed at `begin` (rounded up to even dimensions for yuv420p). Frames
/// presented after a resize are placed at the top-left corner, cropped or padded with the
/// background color.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    canvas: Vec<u8>,
    canvas_size: (u32, u32),
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            canvas: Vec::new(),
            canvas_size: (0, 0),
            last_idx: None,
        }
    }

    /// Canvas dimensions chosen at `begin`.
    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> WildwoodResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(WildwoodError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(WildwoodError::validation(
                "ffmpeg sink needs a non-empty viewport at mount",
            ));
        }
        let width = cfg.width.next_multiple_of(2);
        let height = cfg.height.next_multiple_of(2);

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(WildwoodError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(WildwoodError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input: opaque RGBA8, already flattened in push_frame.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{width}x{height}"),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        // Output: h264 + yuv420p for broad compatibility.
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            WildwoodError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WildwoodError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| WildwoodError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(width, height, out = %self.opts.out_path.display(), "ffmpeg started");
        self.canvas = vec![0u8; (width as usize) * (height as usize) * 4];
        self.canvas_size = (width, height);
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> WildwoodResult<()> {
        if self.child.is_none() {
            return Err(WildwoodError::encode("ffmpeg sink not started"));
        }
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(WildwoodError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        let (width, height) = self.canvas_size;
        fit_top_left(&mut self.canvas, width, height, frame, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(WildwoodError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.canvas).map_err(|e| {
            WildwoodError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> WildwoodResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| WildwoodError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            WildwoodError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WildwoodError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| WildwoodError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(WildwoodError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` goes before `-i`. Rational fps is passed as `num/den`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Flatten `frame` over `bg_rgba` into an opaque `width`x`height` canvas, anchored top-left.
///
/// Rows and columns outside the frame are filled with the background; the excess is cropped.
pub(crate) fn fit_top_left(
    canvas: &mut [u8],
    width: u32,
    height: u32,
    frame: &FrameRGBA,
    bg_rgba: [u8; 4],
) -> WildwoodResult<()> {
    let (cw, ch) = (width as usize, height as usize);
    if canvas.len() != cw * ch * 4 {
        return Err(WildwoodError::validation(
            "canvas size mismatch with width*height*4",
        ));
    }
    let (fw, fh) = (frame.width as usize, frame.height as usize);
    if frame.data.len() != fw * fh * 4 {
        return Err(WildwoodError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let bg = [bg_rgba[0], bg_rgba[1], bg_rgba[2], 255];
    for px in canvas.chunks_exact_mut(4) {
        px.copy_from_slice(&bg);
    }

    let cols = cw.min(fw);
    if cols == 0 {
        return Ok(());
    }
    for y in 0..ch.min(fh) {
        let dst = &mut canvas[y * cw * 4..(y * cw + cols) * 4];
        let src = &frame.data[y * fw * 4..(y * fw + cols) * 4];
        flatten_to_opaque_rgba8(dst, src, frame.premultiplied, bg_rgba)?;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> WildwoodResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
