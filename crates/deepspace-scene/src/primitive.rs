//! Backend-neutral draw primitives emitted by the engine each frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::color::Color;

/// One positioned, sized and colored shape in screen space (logical pixels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawPrimitive {
    /// Full-canvas vertical gradient.
    Background { size: Vec2, top: Color, bottom: Color },
    /// Soft radial falloff from `alpha` at the center to 0 at `radius`.
    Glow {
        center: Vec2,
        radius: f32,
        color: Color,
        alpha: f32,
    },
    /// Solid disc.
    Dot {
        center: Vec2,
        radius: f32,
        color: Color,
        alpha: f32,
    },
    /// Line fading from `alpha` at the head to 0 at the tail.
    Streak {
        head: Vec2,
        tail: Vec2,
        width: f32,
        color: Color,
        alpha: f32,
    },
    /// Quadratic Bézier stroke.
    Curve {
        start: Vec2,
        control: Vec2,
        end: Vec2,
        width: f32,
        color: Color,
        alpha: f32,
    },
}

impl DrawPrimitive {
    /// Opacity of the primitive; backgrounds are opaque.
    pub fn alpha(&self) -> f32 {
        match *self {
            DrawPrimitive::Background { .. } => 1.0,
            DrawPrimitive::Glow { alpha, .. }
            | DrawPrimitive::Dot { alpha, .. }
            | DrawPrimitive::Streak { alpha, .. }
            | DrawPrimitive::Curve { alpha, .. } => alpha,
        }
    }
}

/// Point on a quadratic Bézier at `t`.
pub fn quadratic_point(start: Vec2, control: Vec2, end: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}

/// Per-frame values shared by every primitive, laid out for a uniform buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// Logical viewport size in pixels.
    pub viewport: [f32; 2],
    pub device_pixel_ratio: f32,
    /// Seconds since the engine started.
    pub time: f32,
    pub drift_amount: f32,
    pub quality: f32,
    /// Smoothed pointer in `[-1, 1]²`.
    pub pointer: [f32; 2],
}

/// Everything a render adapter needs for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub primitives: Vec<DrawPrimitive>,
    pub uniforms: FrameUniforms,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 32);
        let uniforms = FrameUniforms {
            viewport: [800.0, 600.0],
            device_pixel_ratio: 2.0,
            ..FrameUniforms::default()
        };
        let bytes = bytemuck::bytes_of(&uniforms);
        assert_eq!(&bytes[0..4], &800.0f32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &2.0f32.to_ne_bytes());
    }

    #[test]
    fn test_quadratic_point_endpoints() {
        let (a, c, b) = (Vec2::ZERO, Vec2::new(5.0, 10.0), Vec2::new(10.0, 0.0));
        assert_eq!(quadratic_point(a, c, b, 0.0), a);
        assert_eq!(quadratic_point(a, c, b, 1.0), b);
        assert_eq!(quadratic_point(a, c, b, 0.5), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_background_alpha_is_opaque() {
        let bg = DrawPrimitive::Background {
            size: Vec2::new(1.0, 1.0),
            top: Color::BLACK,
            bottom: Color::BLACK,
        };
        assert_eq!(bg.alpha(), 1.0);
    }
}
