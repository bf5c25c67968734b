use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rect, Rgba8Premul, Vec2};
use crate::foundation::error::{WildwoodError, WildwoodResult};
use crate::render::backend::{FrameRGBA, PaintBackend};
use crate::render::plan::{DrawOp, Paint, VerticalGradient};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    stops: Vec<(u32, [u8; 4])>,
    y0_bits: u64,
    y1_bits: u64,
    top_bits: u64,
    scale_bits: u64,
    w: u32,
    h: u32,
}

/// CPU rasterizer powered by `vello_cpu`.
///
/// Gradients are baked into device-resolution image paints and cached until the target size
/// changes.
pub struct CpuBackend {
    width: u16,
    height: u16,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
    kernel_cache: HashMap<(u32, u32), Arc<Vec<u32>>>,
    blur_tmp: Vec<u8>,
    blur_out: Vec<u8>,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            ctx: None,
            pixmap: None,
            gradient_cache: HashMap::new(),
            kernel_cache: HashMap::new(),
            blur_tmp: Vec::new(),
            blur_out: Vec::new(),
        }
    }

    fn ctx_mut(&mut self) -> WildwoodResult<&mut vello_cpu::RenderContext> {
        self.ctx
            .as_mut()
            .ok_or_else(|| WildwoodError::render("draw called outside of a frame"))
    }

    fn gradient_paint(
        &mut self,
        gradient: &VerticalGradient,
        rect: Rect,
        scale: f64,
        w: u32,
        h: u32,
    ) -> WildwoodResult<vello_cpu::Image> {
        let key = GradientKey {
            stops: gradient
                .stops
                .iter()
                .map(|s| (s.offset.to_bits(), s.color.to_array()))
                .collect(),
            y0_bits: gradient.y0.to_bits(),
            y1_bits: gradient.y1.to_bits(),
            top_bits: rect.y0.to_bits(),
            scale_bits: scale.to_bits(),
            w,
            h,
        };
        if let Some(img) = self.gradient_cache.get(&key).cloned() {
            return Ok(img);
        }

        let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
        for y in 0..h {
            let logical_y = rect.y0 + (f64::from(y) + 0.5) / scale;
            let c = gradient.sample(logical_y).to_array();
            let row = (y as usize) * (w as usize) * 4;
            for px in bytes[row..row + (w as usize) * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&c);
            }
        }
        let img = rgba_premul_to_image(&bytes, w, h)?;
        self.gradient_cache.insert(key, img.clone());
        Ok(img)
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint, device: Affine) -> WildwoodResult<()> {
        let rect = rect.abs();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Ok(());
        }
        match paint {
            Paint::Solid(color) => {
                let ctx = self.ctx_mut()?;
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_transform(affine_to_cpu(device));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_rect(&rect_to_cpu(rect));
            }
            Paint::Vertical(gradient) => {
                // Bake at device resolution so the image maps 1:1 onto target pixels.
                let scale = device_scale(device);
                let w = (rect.width() * scale).ceil().max(1.0) as u32;
                let h = (rect.height() * scale).ceil().max(1.0) as u32;
                let img = self.gradient_paint(gradient, rect, scale, w, h)?;
                let transform = device
                    * Affine::translate(Vec2::new(rect.x0, rect.y0))
                    * Affine::scale(1.0 / scale);

                let ctx = self.ctx_mut()?;
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(img);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(w),
                    f64::from(h),
                ));
            }
        }
        Ok(())
    }

    fn fill_path(
        &mut self,
        path: &BezPath,
        transform: Affine,
        color: Rgba8Premul,
    ) -> WildwoodResult<()> {
        let ctx = self.ctx_mut()?;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(color_to_cpu(color));
        ctx.fill_path(&bezpath_to_cpu(path));
        Ok(())
    }

    fn blur_kernel(&mut self, radius: u32, sigma: f32) -> WildwoodResult<Arc<Vec<u32>>> {
        let key = (radius, sigma.to_bits());
        if let Some(k) = self.kernel_cache.get(&key) {
            return Ok(k.clone());
        }
        let k = Arc::new(gaussian_kernel_q16(radius, sigma)?);
        self.kernel_cache.insert(key, k.clone());
        Ok(k)
    }

    /// Canvas-style shadow: the path is rasterized offscreen in `color`, blurred with a Gaussian
    /// of sigma `blur / 2` device pixels, then composited as an image paint.
    fn glow(
        &mut self,
        path: &BezPath,
        transform: Affine,
        color: Rgba8Premul,
        blur: f64,
    ) -> WildwoodResult<()> {
        if !blur.is_finite() || blur <= 0.0 || color.a == 0 {
            return Ok(());
        }
        let sigma = (blur / 2.0) as f32;
        let radius = (3.0 * f64::from(sigma)).ceil() as u32;
        let pad = f64::from(radius);

        let bounds = transform.transform_rect_bbox(kurbo::Shape::bounding_box(path));
        let x0 = (bounds.x0 - pad).floor().max(-pad);
        let y0 = (bounds.y0 - pad).floor().max(-pad);
        let x1 = (bounds.x1 + pad).ceil().min(f64::from(self.width) + pad);
        let y1 = (bounds.y1 + pad).ceil().min(f64::from(self.height) + pad);
        if x1 <= x0 || y1 <= y0 {
            return Ok(());
        }
        let bw: u16 = ((x1 - x0) as u32)
            .try_into()
            .map_err(|_| WildwoodError::render("glow width exceeds u16"))?;
        let bh: u16 = ((y1 - y0) as u32)
            .try_into()
            .map_err(|_| WildwoodError::render("glow height exceeds u16"))?;

        let mut layer = vello_cpu::RenderContext::new(bw, bh);
        layer.set_transform(affine_to_cpu(
            Affine::translate(Vec2::new(-x0, -y0)) * transform,
        ));
        layer.set_paint(color_to_cpu(color));
        layer.fill_path(&bezpath_to_cpu(path));
        layer.flush();
        let mut mask = vello_cpu::Pixmap::new(bw, bh);
        layer.render_to_pixmap(&mut mask);

        let kernel = self.blur_kernel(radius, sigma)?;
        let (w, h) = (u32::from(bw), u32::from(bh));
        let len = (w as usize) * (h as usize) * 4;
        self.blur_tmp.resize(len, 0);
        self.blur_out.resize(len, 0);
        blur_rgba8_premul_q16(
            mask.data_as_u8_slice(),
            &mut self.blur_out,
            &mut self.blur_tmp,
            w,
            h,
            &kernel,
        );
        let img = rgba_premul_to_image(&self.blur_out, w, h)?;

        let ctx = self.ctx_mut()?;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(Affine::translate(Vec2::new(x0, y0))));
        ctx.set_paint(img);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
        Ok(())
    }
}

impl PaintBackend for CpuBackend {
    fn begin_frame(&mut self, width: u32, height: u32) -> WildwoodResult<()> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| WildwoodError::render("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| WildwoodError::render("surface height exceeds u16"))?;

        if width_u16 != self.width || height_u16 != self.height {
            tracing::debug!(width, height, "reallocating cpu surface");
            self.width = width_u16;
            self.height = height_u16;
            self.ctx = None;
            self.pixmap = None;
            self.gradient_cache.clear();
        }

        let mut ctx = match self.ctx.take() {
            Some(ctx) => ctx,
            None => vello_cpu::RenderContext::new(width_u16, height_u16),
        };
        ctx.reset();
        self.ctx = Some(ctx);

        let pixmap = self
            .pixmap
            .get_or_insert_with(|| vello_cpu::Pixmap::new(width_u16, height_u16));
        clear_pixmap(pixmap);
        Ok(())
    }

    fn draw(&mut self, op: &DrawOp, device: Affine) -> WildwoodResult<()> {
        match op {
            DrawOp::Clear { .. } => {
                self.ctx_mut()?.reset();
                Ok(())
            }
            DrawOp::FillRect { rect, paint, .. } => self.fill_rect(*rect, paint, device),
            DrawOp::FillPath {
                path,
                transform,
                color,
                ..
            } => self.fill_path(path, device * *transform, *color),
            DrawOp::Glow {
                path,
                transform,
                color,
                blur,
                ..
            } => self.glow(path, device * *transform, *color, *blur),
        }
    }

    fn finish_frame(&mut self) -> WildwoodResult<FrameRGBA> {
        let mut ctx = self
            .ctx
            .take()
            .ok_or_else(|| WildwoodError::render("finish_frame without begin_frame"))?;
        let pixmap = self
            .pixmap
            .as_mut()
            .ok_or_else(|| WildwoodError::render("cpu surface missing"))?;

        ctx.flush();
        ctx.render_to_pixmap(pixmap);
        let data = pixmap.data_as_u8_slice().to_vec();
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data,
            premultiplied: true,
        })
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> WildwoodResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(WildwoodError::render("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(WildwoodError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|&wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Rounding drift goes into the centre tap so the kernel sums to exactly 1.0 in q16.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

/// Separable blur over premultiplied RGBA8 with clamp-to-edge sampling.
fn blur_rgba8_premul_q16(
    src: &[u8],
    dst: &mut [u8],
    tmp: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }
    blur_pass_q16(src, tmp, width, height, kernel_q16, true);
    blur_pass_q16(tmp, dst, width, height, kernel_q16, false);
}

fn blur_pass_q16(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    k: &[u32],
    horizontal: bool,
) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (i64::from(width), i64::from(height));
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i64 - radius;
                let (sx, sy) = if horizontal {
                    ((x + d).clamp(0, w - 1), y)
                } else {
                    (x, (y + d).clamp(0, h - 1))
                };
                let idx = ((sy * w + sx) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out + c] = q16_to_u8(*a);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

/// Largest axis scale of `a`, used to pick a raster resolution for baked paints.
fn device_scale(a: Affine) -> f64 {
    let [m00, m10, m01, m11, _, _] = a.as_coeffs();
    let sx = (m00 * m00 + m10 * m10).sqrt();
    let sy = (m01 * m01 + m11 * m11).sqrt();
    let s = sx.max(sy);
    if s.is_finite() && s > 0.0 { s } else { 1.0 }
}

fn color_to_cpu(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = unpremultiply(c);
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn unpremultiply(c: Rgba8Premul) -> [u8; 4] {
    if c.a == 0 {
        return [0, 0, 0, 0];
    }
    let a = u32::from(c.a);
    let un = |v: u8| -> u8 { ((u32::from(v) * 255 + a / 2) / a).min(255) as u8 };
    [un(c.r), un(c.g), un(c.b), c.a]
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: crate::foundation::core::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> WildwoodResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| WildwoodError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| WildwoodError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(WildwoodError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> WildwoodResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
