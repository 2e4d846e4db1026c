//! Startup constants for a rain run.
//!
//! There is no config file; hosts adjust these through the
//! [`RainSimulation`](crate::RainSimulation) builder. `Default` is the
//! reference configuration.

use glam::Vec3;

use crate::error::SimulationError;
use crate::interpolator::DEFAULT_LERP_FACTOR;
use crate::particles::Bounds;
use crate::shading::DEFAULT_STRETCH;

/// Glow post-process settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Multiplier on the blurred highlights added back to the scene.
    pub strength: f32,
    /// Blur reach in `[0, 1]`; widens the tap spacing.
    pub radius: f32,
    /// Luminance above which a pixel contributes to the glow.
    pub threshold: f32,
}

impl BloomSettings {
    /// Blur tap spacing in texels for this radius.
    pub fn spread(&self) -> f32 {
        1.0 + self.radius * 4.0
    }
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 1.5,
            radius: 0.4,
            threshold: 0.15,
        }
    }
}

/// Fixed perspective camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 50.0),
            target: Vec3::ZERO,
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Everything fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RainConfig {
    pub particle_count: usize,
    pub bounds: Bounds,
    /// Per-frame regime blend factor.
    pub lerp_factor: f32,
    /// Tail length in units of per-frame movement.
    pub stretch: f32,
    pub bloom: BloomSettings,
    pub camera: CameraSettings,
    /// Fixed RNG seed for a reproducible particle layout.
    pub seed: Option<u64>,
    pub title: String,
    pub fullscreen: bool,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            particle_count: 20_000,
            bounds: Bounds::default(),
            lerp_factor: DEFAULT_LERP_FACTOR,
            stretch: DEFAULT_STRETCH,
            bloom: BloomSettings::default(),
            camera: CameraSettings::default(),
            seed: None,
            title: "Amber Rain".to_string(),
            fullscreen: false,
        }
    }
}

impl RainConfig {
    /// Check every value the simulation relies on.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |msg: String| Err(SimulationError::InvalidConfig(msg));

        if self.particle_count == 0 {
            return invalid("particle count must be positive".into());
        }
        let vertex_count = self.particle_count.checked_mul(2);
        if vertex_count.and_then(|n| u32::try_from(n).ok()).is_none() {
            return invalid(format!("particle count {} is too large", self.particle_count));
        }
        let Bounds { width, height, depth } = self.bounds;
        if ![width, height, depth].iter().all(|v| v.is_finite() && *v > 0.0) {
            return invalid(format!(
                "bounds must be positive, got {}x{}x{}",
                width, height, depth
            ));
        }
        if !(self.lerp_factor > 0.0 && self.lerp_factor <= 1.0) {
            return invalid(format!("lerp factor {} not in (0, 1]", self.lerp_factor));
        }
        if !(self.stretch >= 0.0) {
            return invalid(format!("stretch {} must be non-negative", self.stretch));
        }
        if !(self.bloom.strength >= 0.0 && self.bloom.radius >= 0.0) {
            return invalid("bloom strength and radius must be non-negative".into());
        }
        let cam = &self.camera;
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return invalid(format!("camera clip range {}..{} is empty", cam.near, cam.far));
        }
        if !(cam.fov_y_degrees > 0.0 && cam.fov_y_degrees < 180.0) {
            return invalid(format!("field of view {} out of range", cam.fov_y_degrees));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let config = RainConfig::default();
        assert_eq!(config.particle_count, 20_000);
        assert_eq!(config.bounds, Bounds::new(40.0, 60.0, 40.0));
        assert_eq!(config.lerp_factor, 0.08);
        assert_eq!(config.stretch, 2.0);
        assert_eq!(config.bloom, BloomSettings { strength: 1.5, radius: 0.4, threshold: 0.15 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases: Vec<Box<dyn Fn(&mut RainConfig)>> = vec![
            Box::new(|c| c.particle_count = 0),
            Box::new(|c| c.bounds.height = 0.0),
            Box::new(|c| c.bounds.width = f32::NAN),
            Box::new(|c| c.lerp_factor = 0.0),
            Box::new(|c| c.lerp_factor = 1.5),
            Box::new(|c| c.stretch = -1.0),
            Box::new(|c| c.bloom.strength = -0.1),
            Box::new(|c| c.camera.far = 0.05),
            Box::new(|c| c.camera.fov_y_degrees = 180.0),
        ];

        for mutate in cases {
            let mut config = RainConfig::default();
            mutate(&mut config);
            assert!(matches!(
                config.validate(),
                Err(SimulationError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_bloom_spread() {
        assert!((BloomSettings::default().spread() - 2.6).abs() < 1e-6);
    }
}
