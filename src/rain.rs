//! One frame of rain, without a GPU.
//!
//! [`RainState`] ties the pieces together in frame order: read the active
//! regime, blend toward it, move the particles. What comes out is a
//! [`FrameParams`] for the renderer plus the particle buffer it should
//! upload.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::RainConfig;
use crate::interpolator::{InterpolatedState, RegimeInterpolator};
use crate::particles::ParticleBuffer;
use crate::physics;
use crate::regime::Regime;
use crate::shading::ShadingInputs;
use crate::signal::ControlSignal;

/// Values the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub time: f32,
    pub speed: f32,
    pub drift: f32,
    pub color: Vec3,
    pub stretch: f32,
}

impl FrameParams {
    /// The subset the vertex shader uses.
    pub fn shading(&self) -> ShadingInputs {
        ShadingInputs {
            time: self.time,
            speed: self.speed,
            drift: self.drift,
            stretch: self.stretch,
        }
    }
}

/// CPU-side simulation state.
#[derive(Debug)]
pub struct RainState {
    particles: ParticleBuffer,
    interpolator: RegimeInterpolator,
    signal: ControlSignal,
    stretch: f32,
    active: Regime,
}

impl RainState {
    /// Seed the particle buffer and start blending from [`Regime::Normal`].
    pub fn new(config: &RainConfig, signal: ControlSignal) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let particles = ParticleBuffer::new(config.particle_count, config.bounds, &mut rng);
        Self::with_particles(particles, config, signal)
    }

    /// Start from an existing particle buffer.
    pub fn with_particles(particles: ParticleBuffer, config: &RainConfig, signal: ControlSignal) -> Self {
        Self {
            particles,
            interpolator: RegimeInterpolator::new(config.lerp_factor),
            signal,
            stretch: config.stretch,
            active: Regime::Normal,
        }
    }

    /// Run one frame at wall-clock `time` seconds.
    pub fn advance(&mut self, time: f32) -> FrameParams {
        let regime = self.signal.load();
        if regime != self.active {
            log::info!("Regime {} -> {}", self.active, regime);
            self.active = regime;
        }

        let state = *self.interpolator.step(regime);
        physics::integrate(&mut self.particles, state.speed);

        FrameParams {
            time,
            speed: state.speed,
            drift: state.drift,
            color: state.color,
            stretch: self.stretch,
        }
    }

    #[inline]
    pub fn particles(&self) -> &ParticleBuffer {
        &self.particles
    }

    /// Blended values after the most recent frame.
    #[inline]
    pub fn interpolated(&self) -> &InterpolatedState {
        self.interpolator.state()
    }

    /// Regime read on the most recent frame.
    #[inline]
    pub fn active_regime(&self) -> Regime {
        self.active
    }

    #[inline]
    pub fn signal(&self) -> &ControlSignal {
        &self.signal
    }
}
