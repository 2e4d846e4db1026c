//! Per-vertex render offsets, computed fresh each frame and never stored.
//!
//! These are the CPU twins of `vs_main`/`fs_main` in `rain.wgsl`. The GPU
//! evaluates them for every vertex; the CPU versions exist so the math has
//! one readable definition and can be tested without a device. Keep the
//! two in sync.

use glam::Vec3;

use crate::particles::RainVertex;

/// Default tail stretch, in units of per-frame movement.
pub const DEFAULT_STRETCH: f32 = 2.0;

/// Opacity at full speed.
pub const MIN_OPACITY: f32 = 0.4;
/// Opacity when hovering.
pub const MAX_OPACITY: f32 = 0.9;
/// Fraction of head opacity removed from tails.
pub const TAIL_FADE: f32 = 0.7;

const DRIFT_X_RATE: f32 = 2.0;
const DRIFT_X_SEED_SCALE: f32 = 10.0;
const DRIFT_Z_RATE: f32 = 1.5;
const DRIFT_Z_SEED_SCALE: f32 = 12.0;

/// Uniform inputs shared by every vertex in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingInputs {
    /// Wall-clock seconds since start.
    pub time: f32,
    pub speed: f32,
    pub drift: f32,
    pub stretch: f32,
}

/// Lateral (x, z) drift for a particle with `seed`.
pub fn drift_offset(seed: f32, time: f32, drift: f32) -> (f32, f32) {
    let x = (time * DRIFT_X_RATE + seed * DRIFT_X_SEED_SCALE).sin() * drift;
    let z = (time * DRIFT_Z_RATE + seed * DRIFT_Z_SEED_SCALE).cos() * drift;
    (x, z)
}

/// Vertical offset pulling a tail back against its direction of travel.
/// Heads get zero.
pub fn stretch_offset(vertex: &RainVertex, speed: f32, stretch: f32) -> f32 {
    if vertex.is_tail() {
        -(speed * vertex.speed_factor * stretch)
    } else {
        0.0
    }
}

/// Vertex opacity: more solid when slow, tails dimmer than heads.
pub fn opacity(speed: f32, is_tail: bool) -> f32 {
    let t = 1.0 - (speed * 0.5).abs();
    let base = MIN_OPACITY + (MAX_OPACITY - MIN_OPACITY) * t;
    if is_tail {
        base * (1.0 - TAIL_FADE)
    } else {
        base
    }
}

/// Total displacement added to a stored vertex position before projection.
pub fn render_offset(vertex: &RainVertex, inputs: &ShadingInputs) -> Vec3 {
    let (dx, dz) = drift_offset(vertex.seed, inputs.time, inputs.drift);
    let dy = stretch_offset(vertex, inputs.speed, inputs.stretch);
    Vec3::new(dx, dy, dz)
}

/// World-space position the vertex shader draws for `vertex`.
pub fn rendered_position(vertex: &RainVertex, inputs: &ShadingInputs) -> Vec3 {
    Vec3::from_array(vertex.position) + render_offset(vertex, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(speed_factor: f32) -> (RainVertex, RainVertex) {
        let head = RainVertex {
            position: [0.0, 0.0, 0.0],
            seed: 0.3,
            speed_factor,
            is_tail: 0.0,
        };
        (head, RainVertex { is_tail: 1.0, ..head })
    }

    #[test]
    fn test_tail_stretches_against_motion() {
        let (head, tail) = pair(1.0);

        // Falling: tail sits above the head
        assert_eq!(stretch_offset(&head, -1.0, 2.0), 0.0);
        assert_eq!(stretch_offset(&tail, -1.0, 2.0), 2.0);

        // Rising: tail sits below
        assert!((stretch_offset(&tail, 0.8, 2.0) - -1.6).abs() < 1e-6);

        // Suspended: no streak
        assert_eq!(stretch_offset(&tail, 0.0, 2.0), 0.0);
    }

    #[test]
    fn test_stretch_scales_with_individual_speed() {
        let (_, tail) = pair(1.2);
        assert!((stretch_offset(&tail, -1.0, 2.0) - 2.4).abs() < 1e-6);
    }

    #[test]
    fn test_head_and_tail_drift_identically() {
        let (head, tail) = pair(1.0);
        let inputs = ShadingInputs {
            time: 3.7,
            speed: 0.0,
            drift: 0.2,
            stretch: DEFAULT_STRETCH,
        };
        let a = render_offset(&head, &inputs);
        let b = render_offset(&tail, &inputs);
        assert_eq!(a.x, b.x);
        assert_eq!(a.z, b.z);
    }

    #[test]
    fn test_drift_bounded_by_amplitude() {
        for i in 0..100 {
            let t = i as f32 * 0.37;
            let (x, z) = drift_offset(i as f32 / 100.0, t, 0.2);
            assert!(x.abs() <= 0.2 + 1e-6);
            assert!(z.abs() <= 0.2 + 1e-6);
        }
    }

    #[test]
    fn test_zero_drift_is_still() {
        assert_eq!(drift_offset(0.9, 12.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_opacity() {
        assert!((opacity(0.0, false) - 0.9).abs() < 1e-6);
        assert!((opacity(-1.0, false) - 0.65).abs() < 1e-6);
        assert!((opacity(-1.0, true) - 0.65 * 0.3).abs() < 1e-6);
        assert!(opacity(0.8, false) > opacity(-1.0, false));
    }

    #[test]
    fn test_rendered_position_adds_offset_to_stored() {
        let (_, tail) = pair(1.0);
        let inputs = ShadingInputs {
            time: 0.0,
            speed: -1.0,
            drift: 0.0,
            stretch: 2.0,
        };
        assert_eq!(rendered_position(&tail, &inputs), Vec3::new(0.0, 2.0, 0.0));
        // The stored vertex is untouched
        assert_eq!(tail.position, [0.0, 0.0, 0.0]);
    }
}
