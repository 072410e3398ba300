//! Procedural deep-space background engine.
//!
//! Generates stars, galaxies, nebulas and star clusters for a canvas, animates
//! them with a drift/warp illusion and twinkle, throttles detail with an
//! adaptive quality loop, and emits backend-neutral draw primitives each frame.
//!
//! ```no_run
//! use deepspace_scene::{EngineSettings, SceneEngine, Viewport};
//!
//! let mut engine = SceneEngine::new(EngineSettings::default(), Viewport::new(1280.0, 720.0, 1.0));
//! engine.update(1.0 / 60.0, None);
//! let frame = engine.frame();
//! assert!(!frame.primitives.is_empty());
//! ```

pub mod color;
pub mod engine;
pub mod entity;
pub mod motion;
pub mod primitive;
pub mod quality;
pub mod random;
pub mod render;
pub mod shooting_star;
pub mod tier;

pub use color::{Color, GalaxyPalette, NebulaPalette, SpectralClass};
pub use engine::{EngineSettings, MAX_FRAME_TIME, SceneEngine, sanitize_dt};
pub use entity::{
    ClusterKind, Galaxy, GalaxyKind, GalaxyStructure, Nebula, NebulaKind, Star, StarCluster,
};
pub use motion::{
    DRIFT_OFFSET_WRAP, DriftBody, DriftController, DriftState, Projection, Viewport, smooth_step,
};
pub use primitive::{DrawPrimitive, Frame, FrameUniforms};
pub use quality::{QUALITY_FLOOR, QualityController, QualityGates, QualityStep};
pub use render::{
    HostCapabilities, RasterAdapter, RenderAdapter, RenderError, SelectedAdapter,
    SpriteBatchAdapter, SpriteInstance, select_adapter,
};
pub use shooting_star::{ShootingStar, ShootingStarPool};
pub use tier::{HardwareProfile, detect_tier};
