//! Point-sprite batching for a GPU pipeline.
//!
//! Discs and glows become one [`SpriteInstance`] each. Streaks and curves
//! become line-list vertex pairs, curves flattened into fixed segments. The
//! buffers are cleared but not freed between frames.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::RenderAdapter;
use crate::color::Color;
use crate::primitive::{DrawPrimitive, FrameUniforms, quadratic_point};

/// Segments per flattened quadratic curve.
pub const CURVE_SEGMENTS: usize = 12;

/// Fragment shader selector for a sprite.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteShape {
    Dot = 0,
    Glow = 1,
}

/// Per-instance data for one point sprite.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    pub radius: f32,
    /// A [`SpriteShape`] discriminant.
    pub shape: u32,
    pub color: [f32; 4],
}

/// One end of a line segment.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub width: f32,
    pub _pad: f32,
    pub color: [f32; 4],
}

impl LineVertex {
    fn new(position: Vec2, width: f32, color: Color, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            width,
            _pad: 0.0,
            color: color.to_rgba_f32(alpha),
        }
    }
}

/// Batches primitives into upload-ready instance and vertex buffers.
#[derive(Debug, Default)]
pub struct SpriteBatchAdapter {
    background: Option<(Color, Color)>,
    instances: Vec<SpriteInstance>,
    lines: Vec<LineVertex>,
    uniforms: FrameUniforms,
    frames: u64,
}

impl SpriteBatchAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top and bottom gradient colors of the last frame's background.
    pub fn background(&self) -> Option<(Color, Color)> {
        self.background
    }

    pub fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }

    /// Line-list vertices, two per segment.
    pub fn lines(&self) -> &[LineVertex] {
        &self.lines
    }

    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn line_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lines)
    }

    pub fn uniform_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.uniforms)
    }

    /// Number of frames consumed since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn push_sprite(&mut self, center: Vec2, radius: f32, shape: SpriteShape, color: Color, alpha: f32) {
        self.instances.push(SpriteInstance {
            position: center.to_array(),
            radius,
            shape: shape as u32,
            color: color.to_rgba_f32(alpha),
        });
    }

    fn push_segment(&mut self, a: LineVertex, b: LineVertex) {
        self.lines.push(a);
        self.lines.push(b);
    }
}

impl RenderAdapter for SpriteBatchAdapter {
    fn name(&self) -> &'static str {
        "sprites"
    }

    fn consume(&mut self, primitives: &[DrawPrimitive], uniforms: &FrameUniforms) {
        self.background = None;
        self.instances.clear();
        self.lines.clear();
        self.uniforms = *uniforms;

        for primitive in primitives {
            match *primitive {
                DrawPrimitive::Background { top, bottom, .. } => {
                    self.background = Some((top, bottom));
                }
                DrawPrimitive::Dot {
                    center,
                    radius,
                    color,
                    alpha,
                } => self.push_sprite(center, radius, SpriteShape::Dot, color, alpha),
                DrawPrimitive::Glow {
                    center,
                    radius,
                    color,
                    alpha,
                } => self.push_sprite(center, radius, SpriteShape::Glow, color, alpha),
                DrawPrimitive::Streak {
                    head,
                    tail,
                    width,
                    color,
                    alpha,
                } => self.push_segment(
                    LineVertex::new(head, width, color, alpha),
                    LineVertex::new(tail, width, color, 0.0),
                ),
                DrawPrimitive::Curve {
                    start,
                    control,
                    end,
                    width,
                    color,
                    alpha,
                } => {
                    let mut prev = start;
                    for i in 1..=CURVE_SEGMENTS {
                        let t = i as f32 / CURVE_SEGMENTS as f32;
                        let next = quadratic_point(start, control, end, t);
                        self.push_segment(
                            LineVertex::new(prev, width, color, alpha),
                            LineVertex::new(next, width, color, alpha),
                        );
                        prev = next;
                    }
                }
            }
        }
        self.frames += 1;
    }

    fn release(&mut self) {
        self.background = None;
        self.instances = Vec::new();
        self.lines = Vec::new();
    }
}
