//! Render adapters: consumers of the engine's primitive stream.
//!
//! The engine never draws. It emits a [`Frame`](crate::primitive::Frame) and a
//! host hands it to whichever [`RenderAdapter`] suits the platform. Two
//! implementations ship here: [`SpriteBatchAdapter`] packs primitives into
//! `Pod` instance buffers for a GPU point-sprite pipeline, and
//! [`RasterAdapter`] rasterizes them into an RGBA framebuffer in software.

mod raster;
mod sprite;

pub use raster::RasterAdapter;
pub use sprite::{CURVE_SEGMENTS, LineVertex, SpriteBatchAdapter, SpriteInstance, SpriteShape};

use deepspace_config::RenderBackend;

use crate::primitive::{DrawPrimitive, FrameUniforms};

/// Errors from adapter output surfaces.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Failed to create or write the output file.
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Png(#[from] png::EncodingError),
}

/// A consumer of per-frame primitives.
pub trait RenderAdapter {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Replace the adapter's contents with this frame.
    fn consume(&mut self, primitives: &[DrawPrimitive], uniforms: &FrameUniforms);

    /// Free every buffer. The adapter may be reused afterwards.
    fn release(&mut self);
}

/// What the host can offer a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostCapabilities {
    /// A GPU context is available.
    pub gpu: bool,
    /// The GPU supports instanced point sprites.
    pub instancing: bool,
    /// Configured backend preference.
    pub preferred: RenderBackend,
    /// Physical framebuffer size for software rasterization.
    pub surface_size: (u32, u32),
}

/// The adapter chosen by [`select_adapter`].
#[derive(Debug)]
pub enum SelectedAdapter {
    Sprites(SpriteBatchAdapter),
    Raster(RasterAdapter),
}

impl SelectedAdapter {
    pub fn as_raster(&self) -> Option<&RasterAdapter> {
        match self {
            SelectedAdapter::Raster(raster) => Some(raster),
            SelectedAdapter::Sprites(_) => None,
        }
    }
}

impl RenderAdapter for SelectedAdapter {
    fn name(&self) -> &'static str {
        match self {
            SelectedAdapter::Sprites(a) => a.name(),
            SelectedAdapter::Raster(a) => a.name(),
        }
    }

    fn consume(&mut self, primitives: &[DrawPrimitive], uniforms: &FrameUniforms) {
        match self {
            SelectedAdapter::Sprites(a) => a.consume(primitives, uniforms),
            SelectedAdapter::Raster(a) => a.consume(primitives, uniforms),
        }
    }

    fn release(&mut self) {
        match self {
            SelectedAdapter::Sprites(a) => a.release(),
            SelectedAdapter::Raster(a) => a.release(),
        }
    }
}

/// Pick an adapter for the host. Sprites need GPU instancing; anything else
/// falls back to the software rasterizer.
pub fn select_adapter(caps: HostCapabilities) -> SelectedAdapter {
    let sprites_supported = caps.gpu && caps.instancing;
    let (width, height) = caps.surface_size;
    match caps.preferred {
        RenderBackend::Raster => SelectedAdapter::Raster(RasterAdapter::new(width, height)),
        RenderBackend::Sprites | RenderBackend::Auto if sprites_supported => {
            SelectedAdapter::Sprites(SpriteBatchAdapter::new())
        }
        RenderBackend::Sprites => {
            log::warn!("Sprite backend requested without GPU instancing, using raster");
            SelectedAdapter::Raster(RasterAdapter::new(width, height))
        }
        RenderBackend::Auto => SelectedAdapter::Raster(RasterAdapter::new(width, height)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(gpu: bool, preferred: RenderBackend) -> HostCapabilities {
        HostCapabilities {
            gpu,
            instancing: gpu,
            preferred,
            surface_size: (64, 48),
        }
    }

    #[test]
    fn test_auto_prefers_sprites_with_gpu() {
        let adapter = select_adapter(caps(true, RenderBackend::Auto));
        assert_eq!(adapter.name(), "sprites");
        assert!(adapter.as_raster().is_none());
    }

    #[test]
    fn test_auto_falls_back_to_raster() {
        let adapter = select_adapter(caps(false, RenderBackend::Auto));
        assert_eq!(adapter.name(), "raster");
        let raster = adapter.as_raster().expect("raster adapter");
        assert_eq!((raster.width(), raster.height()), (64, 48));
    }

    #[test]
    fn test_forced_sprites_without_gpu_uses_raster() {
        let adapter = select_adapter(caps(false, RenderBackend::Sprites));
        assert_eq!(adapter.name(), "raster");
    }

    #[test]
    fn test_forced_raster_ignores_gpu() {
        let adapter = select_adapter(caps(true, RenderBackend::Raster));
        assert_eq!(adapter.name(), "raster");
    }
}
