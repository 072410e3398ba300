//! One-shot hardware tier classification.
//!
//! The tier decides how much content is generated; it never changes at
//! runtime. The quality controller decides how much of it is drawn.

use deepspace_config::PerformanceTier;

/// Renderer names that indicate software rasterization.
const SOFTWARE_GPU_HINTS: [&str; 4] = ["swiftshader", "llvmpipe", "software", "softpipe"];

/// Renderer names that indicate a dedicated or high-end GPU.
const DISCRETE_GPU_HINTS: [&str; 5] = ["nvidia", "geforce", "radeon rx", "radeon pro", "apple m"];

/// Renderer names that indicate a shared-memory mobile or integrated GPU.
const INTEGRATED_GPU_HINTS: [&str; 5] = ["intel", "mali", "adreno", "powervr", "videocore"];

/// Physical pixel count above which a non-discrete GPU is capped at medium.
const LARGE_SURFACE_PIXELS: f32 = 3840.0 * 2160.0;

/// Whatever the host could learn about the machine. Every field is optional;
/// missing data never fails classification.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HardwareProfile {
    pub cpu_cores: Option<usize>,
    pub memory_gb: Option<f32>,
    /// Logical screen size in pixels.
    pub screen: Option<(u32, u32)>,
    pub device_pixel_ratio: f32,
    /// Renderer string as reported by the graphics API.
    pub gpu_renderer: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GpuClass {
    Software,
    Integrated,
    Discrete,
    Unknown,
}

impl HardwareProfile {
    /// Probe what the process can see without a graphics context.
    pub fn detect() -> Self {
        let cores = num_cpus::get();
        Self {
            cpu_cores: (cores > 0).then_some(cores),
            memory_gb: None,
            screen: None,
            device_pixel_ratio: 1.0,
            gpu_renderer: None,
        }
    }

    fn gpu_class(&self) -> GpuClass {
        let Some(renderer) = self.gpu_renderer.as_deref() else {
            return GpuClass::Unknown;
        };
        let renderer = renderer.to_ascii_lowercase();
        let matches = |hints: &[&str]| hints.iter().any(|h| renderer.contains(h));
        if matches(&SOFTWARE_GPU_HINTS) {
            GpuClass::Software
        } else if matches(&DISCRETE_GPU_HINTS) {
            GpuClass::Discrete
        } else if matches(&INTEGRATED_GPU_HINTS) {
            GpuClass::Integrated
        } else {
            GpuClass::Unknown
        }
    }

    fn physical_pixels(&self) -> Option<f32> {
        let (w, h) = self.screen?;
        let dpr = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        Some(w as f32 * h as f32 * dpr * dpr)
    }

    /// Map the profile onto a tier. Missing data falls back to medium.
    pub fn classify(&self) -> PerformanceTier {
        let gpu = self.gpu_class();
        if gpu == GpuClass::Software {
            return PerformanceTier::Low;
        }

        let weak_cpu = self.cpu_cores.is_some_and(|c| c <= 2);
        let weak_memory = self.memory_gb.is_some_and(|m| m <= 2.0);
        if weak_cpu || weak_memory {
            return PerformanceTier::Low;
        }

        let Some(cores) = self.cpu_cores else {
            return PerformanceTier::Medium;
        };
        let strong_memory = self.memory_gb.is_none_or(|m| m >= 8.0);
        if cores < 8 || !strong_memory || gpu == GpuClass::Integrated {
            return PerformanceTier::Medium;
        }

        let large_surface = self
            .physical_pixels()
            .is_some_and(|p| p > LARGE_SURFACE_PIXELS);
        if large_surface && gpu != GpuClass::Discrete {
            return PerformanceTier::Medium;
        }
        PerformanceTier::High
    }
}

/// Detect and classify in one step, logging the outcome.
pub fn detect_tier() -> PerformanceTier {
    let profile = HardwareProfile::detect();
    let tier = profile.classify();
    log::info!(
        "Hardware tier {tier:?} (cores: {:?}, memory: {:?} GB)",
        profile.cpu_cores,
        profile.memory_gb
    );
    tier
}
