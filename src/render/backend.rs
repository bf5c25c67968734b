use crate::foundation::core::Affine;
use crate::foundation::error::{WildwoodError, WildwoodResult};
use crate::foundation::math::flatten_to_opaque_rgba8;
use crate::render::plan::{DrawOp, FramePlan};

/// A rendered frame as RGBA8 pixels at the surface's backing resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in device pixels.
    pub width: u32,
    /// Frame height in device pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
            premultiplied: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA8 of the pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Composite over an opaque background (straight RGBA8), returning opaque RGBA8 bytes.
    pub fn flatten_over(&self, bg_rgba: [u8; 4]) -> WildwoodResult<Vec<u8>> {
        let mut out = vec![0u8; self.data.len()];
        flatten_to_opaque_rgba8(&mut out, &self.data, self.premultiplied, bg_rgba)?;
        Ok(out)
    }
}

/// Rasterizer contract for executing a [`FramePlan`].
pub trait PaintBackend {
    /// Prepare a target of the given device size. Called once per frame, before any op.
    fn begin_frame(&mut self, width: u32, height: u32) -> WildwoodResult<()>;

    /// Execute one op; `device` maps logical pixels onto the target.
    fn draw(&mut self, op: &DrawOp, device: Affine) -> WildwoodResult<()>;

    /// Finish the frame and read back its pixels.
    fn finish_frame(&mut self) -> WildwoodResult<FrameRGBA>;
}

/// Largest target edge, in device pixels, that a backend can rasterize.
pub const MAX_TARGET_DIM: u32 = u16::MAX as u32;

/// Reject backing sizes no backend can allocate, before any work is spent on the frame.
pub fn check_target_size(width: u32, height: u32) -> WildwoodResult<()> {
    if width > MAX_TARGET_DIM || height > MAX_TARGET_DIM {
        return Err(WildwoodError::render(format!(
            "target {width}x{height} exceeds {MAX_TARGET_DIM} device pixels per side"
        )));
    }
    Ok(())
}

/// Run every op of `plan` through `backend` in order.
///
/// An empty plan or zero-sized target short-circuits to [`FrameRGBA::empty`].
pub fn execute_plan<B: PaintBackend + ?Sized>(
    backend: &mut B,
    plan: &FramePlan,
) -> WildwoodResult<FrameRGBA> {
    if plan.is_empty() || plan.backing_width == 0 || plan.backing_height == 0 {
        return Ok(FrameRGBA::empty());
    }

    backend.begin_frame(plan.backing_width, plan.backing_height)?;
    for op in &plan.ops {
        backend.draw(op, plan.device_transform)?;
    }
    backend.finish_frame()
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
