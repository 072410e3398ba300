//! Immediate-mode software rasterizer with PNG export.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use glam::Vec2;

use super::sprite::CURVE_SEGMENTS;
use super::{RenderAdapter, RenderError};
use crate::color::Color;
use crate::primitive::{DrawPrimitive, FrameUniforms, quadratic_point};

/// Smallest on-screen radius, so sub-pixel stars still register.
const MIN_RADIUS: f32 = 0.5;

/// RGBA framebuffer that draws primitives with source-over blending.
///
/// Primitive coordinates are logical pixels and are scaled by the frame's
/// device pixel ratio onto the physical framebuffer.
#[derive(Debug)]
pub struct RasterAdapter {
    width: u32,
    height: u32,
    /// Linear RGB in `[0, 1]`, row-major.
    pixels: Vec<[f32; 3]>,
}

/// Framebuffer length, computed in `usize` so large surfaces cannot wrap.
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl RasterAdapter {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![[0.0; 3]; pixel_count(width, height)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize the framebuffer, clearing it to black.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.pixels = vec![[0.0; 3]; pixel_count(self.width, self.height)];
    }

    /// Pixel at `(x, y)` as 8-bit RGBA, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(self.index(x, y))
            .map(|p| to_rgba8(*p))
    }

    /// The whole framebuffer as tightly packed 8-bit RGBA.
    pub fn rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| to_rgba8(*p)).collect()
    }

    /// Encode the framebuffer as an 8-bit RGBA PNG.
    pub fn write_png(&self, path: &Path) -> Result<(), RenderError> {
        let file = File::create(path)?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.rgba_bytes())?;
        writer.finish()?;
        log::info!(
            "Wrote {}x{} snapshot to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn ensure_allocated(&mut self) {
        let len = pixel_count(self.width, self.height);
        if self.pixels.len() != len {
            self.pixels = vec![[0.0; 3]; len];
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        let src = color.to_rgba_f32(1.0);
        let index = self.index(x, y);
        if let Some(dst) = self.pixels.get_mut(index) {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = *d * (1.0 - alpha) + s * alpha;
            }
        }
    }

    /// Pixel range covering `[lo, hi]` on one axis, clipped to the framebuffer.
    fn span(lo: f32, hi: f32, limit: u32) -> std::ops::Range<u32> {
        let start = lo.floor().max(0.0) as u32;
        let end = (hi.ceil().max(0.0) as u32).min(limit);
        start.min(end)..end
    }

    fn fill_background(&mut self, top: Color, bottom: Color) {
        let top = top.to_rgba_f32(1.0);
        let bottom = bottom.to_rgba_f32(1.0);
        for y in 0..self.height {
            let t = (y as f32 + 0.5) / self.height as f32;
            let row = [
                top[0] + (bottom[0] - top[0]) * t,
                top[1] + (bottom[1] - top[1]) * t,
                top[2] + (bottom[2] - top[2]) * t,
            ];
            let start = self.index(0, y);
            let end = start + self.width as usize;
            if let Some(slice) = self.pixels.get_mut(start..end) {
                slice.fill(row);
            }
        }
    }

    /// Disc with a one-pixel anti-aliased rim, or a quadratic radial falloff
    /// when `soft`.
    fn draw_disc(&mut self, center: Vec2, radius: f32, color: Color, alpha: f32, soft: bool) {
        let radius = radius.max(MIN_RADIUS);
        let reach = radius + 1.0;
        for y in Self::span(center.y - reach, center.y + reach, self.height) {
            for x in Self::span(center.x - reach, center.x + reach, self.width) {
                let d = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center).length();
                let coverage = if soft {
                    let falloff = (1.0 - d / radius).max(0.0);
                    falloff * falloff
                } else {
                    (radius + 0.5 - d).clamp(0.0, 1.0)
                };
                self.blend(x, y, color, alpha * coverage);
            }
        }
    }

    /// Segment with alpha interpolated from `alpha_a` at `a` to `alpha_b` at `b`.
    fn draw_segment(&mut self, a: Vec2, b: Vec2, width: f32, color: Color, alpha_a: f32, alpha_b: f32) {
        let half = (width * 0.5).max(MIN_RADIUS);
        let reach = half + 1.0;
        let ab = b - a;
        let len_sq = ab.length_squared();
        let min = a.min(b) - Vec2::splat(reach);
        let max = a.max(b) + Vec2::splat(reach);
        for y in Self::span(min.y, max.y, self.height) {
            for x in Self::span(min.x, max.x, self.width) {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = (p - (a + ab * t)).length();
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                let alpha = alpha_a + (alpha_b - alpha_a) * t;
                self.blend(x, y, color, alpha * coverage);
            }
        }
    }
}

impl RenderAdapter for RasterAdapter {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn consume(&mut self, primitives: &[DrawPrimitive], uniforms: &FrameUniforms) {
        self.ensure_allocated();
        self.pixels.fill([0.0; 3]);
        let scale = if uniforms.device_pixel_ratio > 0.0 {
            uniforms.device_pixel_ratio
        } else {
            1.0
        };

        for primitive in primitives {
            match *primitive {
                DrawPrimitive::Background { top, bottom, .. } => self.fill_background(top, bottom),
                DrawPrimitive::Glow {
                    center,
                    radius,
                    color,
                    alpha,
                } => self.draw_disc(center * scale, radius * scale, color, alpha, true),
                DrawPrimitive::Dot {
                    center,
                    radius,
                    color,
                    alpha,
                } => self.draw_disc(center * scale, radius * scale, color, alpha, false),
                DrawPrimitive::Streak {
                    head,
                    tail,
                    width,
                    color,
                    alpha,
                } => self.draw_segment(head * scale, tail * scale, width * scale, color, alpha, 0.0),
                DrawPrimitive::Curve {
                    start,
                    control,
                    end,
                    width,
                    color,
                    alpha,
                } => {
                    let mut prev = start * scale;
                    for i in 1..=CURVE_SEGMENTS {
                        let t = i as f32 / CURVE_SEGMENTS as f32;
                        let next = quadratic_point(start, control, end, t) * scale;
                        self.draw_segment(prev, next, width * scale, color, alpha, alpha);
                        prev = next;
                    }
                }
            }
        }
    }

    fn release(&mut self) {
        self.pixels = Vec::new();
    }
}

fn to_rgba8(p: [f32; 3]) -> [u8; 4] {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(p[0]), channel(p[1]), channel(p[2]), 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms() -> FrameUniforms {
        FrameUniforms {
            viewport: [32.0, 32.0],
            device_pixel_ratio: 1.0,
            ..FrameUniforms::default()
        }
    }

    fn background() -> DrawPrimitive {
        DrawPrimitive::Background {
            size: Vec2::new(32.0, 32.0),
            top: Color::new(0, 0, 0),
            bottom: Color::new(0, 0, 100),
        }
    }

    #[test]
    fn test_background_gradient() {
        let mut raster = RasterAdapter::new(32, 32);
        raster.consume(&[background()], &uniforms());
        let top = raster.pixel(0, 0).unwrap_or_default();
        let bottom = raster.pixel(0, 31).unwrap_or_default();
        assert!(top[2] < 5, "top should be near black, got {top:?}");
        assert!(bottom[2] > 90, "bottom should be blue, got {bottom:?}");
        assert_eq!(top[3], 255);
    }

    #[test]
    fn test_dot_lights_its_center() {
        let mut raster = RasterAdapter::new(32, 32);
        let dot = DrawPrimitive::Dot {
            center: Vec2::new(16.0, 16.0),
            radius: 2.0,
            color: Color::WHITE,
            alpha: 1.0,
        };
        raster.consume(&[background(), dot], &uniforms());
        assert_eq!(raster.pixel(16, 16), Some([255, 255, 255, 255]));
        let far = raster.pixel(2, 2).unwrap_or_default();
        assert_eq!(far[0], 0, "dot leaked to {far:?}");
    }

    #[test]
    fn test_device_pixel_ratio_scales_positions() {
        let mut raster = RasterAdapter::new(64, 64);
        let dot = DrawPrimitive::Dot {
            center: Vec2::new(20.0, 20.0),
            radius: 1.0,
            color: Color::WHITE,
            alpha: 1.0,
        };
        let hi_dpi = FrameUniforms {
            device_pixel_ratio: 2.0,
            ..uniforms()
        };
        raster.consume(&[dot], &hi_dpi);
        assert_eq!(raster.pixel(40, 40), Some([255, 255, 255, 255]));
        assert_eq!(raster.pixel(20, 20), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_streak_fades_toward_tail() {
        let mut raster = RasterAdapter::new(32, 32);
        let streak = DrawPrimitive::Streak {
            head: Vec2::new(30.5, 16.5),
            tail: Vec2::new(2.5, 16.5),
            width: 2.0,
            color: Color::WHITE,
            alpha: 1.0,
        };
        raster.consume(&[streak], &uniforms());
        let head = raster.pixel(29, 16).unwrap_or_default()[0];
        let tail = raster.pixel(4, 16).unwrap_or_default()[0];
        assert!(head > tail, "head {head} should outshine tail {tail}");
    }

    #[test]
    fn test_out_of_bounds_primitives_are_clipped() {
        let mut raster = RasterAdapter::new(16, 16);
        let glow = DrawPrimitive::Glow {
            center: Vec2::new(-100.0, 500.0),
            radius: 40.0,
            color: Color::WHITE,
            alpha: 1.0,
        };
        raster.consume(&[glow], &uniforms());
        assert!(raster.rgba_bytes().chunks(4).all(|p| p[0] == 0));
        assert_eq!(raster.pixel(16, 0), None);
    }

    #[test]
    fn test_write_png_round_trip_header() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("frame.png");
        let mut raster = RasterAdapter::new(24, 12);
        raster.consume(&[background()], &uniforms());
        raster.write_png(&path).expect("write png");

        let file = File::open(&path).expect("open png");
        let reader = png::Decoder::new(file).read_info().expect("decode header");
        assert_eq!(reader.info().width, 24);
        assert_eq!(reader.info().height, 12);
    }

    #[test]
    fn test_release_then_reuse() {
        let mut raster = RasterAdapter::new(8, 8);
        raster.release();
        raster.consume(&[background()], &uniforms());
        assert!(raster.pixel(7, 7).is_some());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_pixel_count_does_not_wrap_for_huge_surfaces() {
        assert_eq!(pixel_count(70_000, 70_000), 4_900_000_000);
        assert_eq!(pixel_count(u32::MAX, 2), u32::MAX as usize * 2);
    }

    #[test]
    fn test_last_row_and_column_are_addressable() {
        let mut raster = RasterAdapter::new(5, 3);
        let dot = DrawPrimitive::Dot {
            center: Vec2::new(4.5, 2.5),
            radius: 0.6,
            color: Color::WHITE,
            alpha: 1.0,
        };
        raster.consume(&[background(), dot], &uniforms());
        assert_eq!(raster.index(4, 2), 14);
        let corner = raster.pixel(4, 2).unwrap_or_default();
        assert!(corner[0] > 200, "corner pixel not lit: {corner:?}");
        assert_eq!(raster.pixel(5, 0), None);
    }
}
