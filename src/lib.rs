//! # Amber Rain
//!
//! A few tens of thousands of glowing streaks falling through a box, whose
//! collective motion is steered by how many input sources (typically hands)
//! a tracker currently sees.
//!
//! ## Quick Start
//!
//! ```ignore
//! use amber_rain::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     let sim = RainSimulation::new()
//!         .with_particle_count(20_000)
//!         .with_seed(7);
//!
//!     // Hand this to whatever counts sources
//!     let signal = sim.control_signal();
//!     std::thread::spawn(move || signal.report_source_count(1));
//!
//!     sim.run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Regimes
//!
//! The source count selects one of three [`Regime`]s:
//!
//! | Sources | Regime | Motion |
//! |---------|--------|--------|
//! | 0 | [`Regime::Normal`] | amber rain falling |
//! | 1 | [`Regime::Suspended`] | pale drops hanging in place |
//! | 2+ | [`Regime::Reverse`] | red drops rising |
//!
//! ### Blending
//!
//! Switching regimes never snaps. A [`RegimeInterpolator`] moves speed,
//! drift and color a fixed fraction toward the target each frame.
//!
//! ### Frame order
//!
//! Each frame reads the [`ControlSignal`], blends, moves the particles with
//! periodic wraparound ([`physics::integrate`]), then draws. Drift and tail
//! stretch are applied per vertex at draw time ([`shading`]) and never
//! change stored positions.
//!
//! Without a tracker, the digit keys stand in: press `0`, `1` or `2`.

mod gpu;

pub mod config;
pub mod error;
pub mod input;
pub mod interpolator;
pub mod particles;
pub mod physics;
pub mod rain;
pub mod regime;
pub mod shader;
pub mod shading;
pub mod signal;
mod simulation;
pub mod time;

pub use bytemuck;
pub use glam::Vec3;

pub use config::{BloomSettings, CameraSettings, RainConfig};
pub use error::{GpuError, SimulationError};
pub use gpu::{Camera, Viewport};
pub use interpolator::{InterpolatedState, RegimeInterpolator};
pub use particles::{Bounds, ParticleBuffer, RainVertex};
pub use rain::{FrameParams, RainState};
pub use regime::{Regime, RegimeParams};
pub use signal::ControlSignal;
pub use simulation::RainSimulation;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use amber_rain::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{BloomSettings, CameraSettings, RainConfig};
    pub use crate::error::SimulationError;
    pub use crate::interpolator::InterpolatedState;
    pub use crate::particles::Bounds;
    pub use crate::regime::Regime;
    pub use crate::signal::ControlSignal;
    pub use crate::simulation::RainSimulation;
    pub use crate::time::Time;
    pub use crate::Vec3;
}
