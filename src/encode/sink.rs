use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{WildwoodError, WildwoodResult};
use crate::foundation::math::flatten_to_opaque_rgba8;
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Backing width of the surface at mount, in device pixels.
    pub width: u32,
    /// Backing height of the surface at mount, in device pixels.
    pub height: u32,
    /// Presentation rate of the host display.
    pub fps: Fps,
}

/// Sink contract for consuming presented frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order. Frame
/// dimensions may change between pushes when the viewport is resized.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> WildwoodResult<()>;
    /// Push one presented frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> WildwoodResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> WildwoodResult<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn begin(&mut self, cfg: SinkConfig) -> WildwoodResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> WildwoodResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> WildwoodResult<()> {
        (**self).end()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> WildwoodResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> WildwoodResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> WildwoodResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes every presented frame as `frame_NNNNN.png` into a directory.
///
/// Frames keep their own size, so a resize mid-run shows up as a change in image dimensions.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    bg_rgba: [u8; 4],
    scratch: Vec<u8>,
    written: usize,
    started: bool,
}

impl PngSequenceSink {
    /// Create a sink writing into `dir`, flattening alpha over `bg_rgba` (straight RGBA8).
    pub fn new(dir: impl Into<PathBuf>, bg_rgba: [u8; 4]) -> Self {
        Self {
            dir: dir.into(),
            bg_rgba,
            scratch: Vec::new(),
            written: 0,
            started: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of PNG files written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> WildwoodResult<()> {
        use anyhow::Context as _;
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create frames directory '{}'", self.dir.display())
        })?;
        self.written = 0;
        self.started = true;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> WildwoodResult<()> {
        if !self.started {
            return Err(WildwoodError::encode("png sink not started"));
        }
        if frame.is_empty() {
            tracing::warn!(frame = idx.0, "skipping zero-size frame");
            return Ok(());
        }

        self.scratch.resize(frame.data.len(), 0);
        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.bg_rgba,
        )?;

        let path = self.frame_path(idx);
        image::save_buffer_with_format(
            &path,
            &self.scratch,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            WildwoodError::encode(format!("failed to write '{}': {e}", path.display()))
        })?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> WildwoodResult<()> {
        self.started = false;
        tracing::debug!(written = self.written, dir = %self.dir.display(), "png sequence done");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
