//! Frame-by-frame blending toward the active regime.
//!
//! Each frame moves the current speed, drift and color a fixed fraction of
//! the remaining distance toward the target:
//!
//! ```text
//! current = current + (target - current) * factor
//! ```
//!
//! The residual after `k` frames is `|initial - target| * (1 - factor)^k`,
//! so values approach the target monotonically and never overshoot. The
//! blend is per frame, not per second: a slower display takes longer to
//! settle.

use glam::Vec3;

use crate::regime::Regime;

/// Default per-frame blend factor.
pub const DEFAULT_LERP_FACTOR: f32 = 0.08;

/// The continuously blended values read by physics and shading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolatedState {
    /// Collective per-frame fall speed.
    pub speed: f32,
    /// Lateral drift amplitude.
    pub drift: f32,
    /// Linear RGB tint.
    pub color: Vec3,
}

impl InterpolatedState {
    /// The exact target values of `regime`.
    pub fn of(regime: Regime) -> Self {
        let params = regime.params();
        Self {
            speed: params.speed,
            drift: params.drift,
            color: params.linear_color(),
        }
    }
}

/// Owns the interpolated state and advances it once per frame.
#[derive(Debug, Clone)]
pub struct RegimeInterpolator {
    state: InterpolatedState,
    factor: f32,
}

impl RegimeInterpolator {
    /// Start at [`Regime::Normal`]'s targets with the given blend factor.
    pub fn new(factor: f32) -> Self {
        Self {
            state: InterpolatedState::of(Regime::Normal),
            factor,
        }
    }

    /// Blend one frame toward `target`.
    pub fn step(&mut self, target: Regime) -> &InterpolatedState {
        let goal = InterpolatedState::of(target);
        let t = self.factor;
        self.state.speed = lerp(self.state.speed, goal.speed, t);
        self.state.drift = lerp(self.state.drift, goal.drift, t);
        self.state.color += (goal.color - self.state.color) * t;
        &self.state
    }

    /// Current blended values.
    #[inline]
    pub fn state(&self) -> &InterpolatedState {
        &self.state
    }

    /// Per-frame blend factor.
    #[inline]
    pub fn factor(&self) -> f32 {
        self.factor
    }
}

impl Default for RegimeInterpolator {
    fn default() -> Self {
        Self::new(DEFAULT_LERP_FACTOR)
    }
}

#[inline]
fn lerp(current: f32, target: f32, t: f32) -> f32 {
    current + (target - current) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_normal() {
        let interp = RegimeInterpolator::default();
        assert_eq!(*interp.state(), InterpolatedState::of(Regime::Normal));
        assert_eq!(interp.factor(), 0.08);
    }

    #[test]
    fn test_holding_target_is_fixed_point() {
        let mut interp = RegimeInterpolator::default();
        for _ in 0..10 {
            interp.step(Regime::Normal);
        }
        assert_eq!(*interp.state(), InterpolatedState::of(Regime::Normal));
    }

    #[test]
    fn test_residual_matches_closed_form() {
        let mut interp = RegimeInterpolator::default();
        let start = *interp.state();
        let goal = InterpolatedState::of(Regime::Reverse);

        for _ in 0..100 {
            interp.step(Regime::Reverse);
        }

        let decay = (1.0f64 - 0.08).powi(100);
        let expected_speed = (start.speed - goal.speed).abs() as f64 * decay;
        let expected_drift = (start.drift - goal.drift).abs() as f64 * decay;
        let expected_green = (start.color.y - goal.color.y).abs() as f64 * decay;

        let state = interp.state();
        assert!(((state.speed - goal.speed).abs() as f64 - expected_speed).abs() < 1e-5);
        assert!(((state.drift - goal.drift).abs() as f64 - expected_drift).abs() < 1e-6);
        assert!(((state.color.y - goal.color.y).abs() as f64 - expected_green).abs() < 2e-6);
    }

    #[test]
    fn test_converges_within_epsilon() {
        let mut interp = RegimeInterpolator::default();
        for _ in 0..200 {
            interp.step(Regime::Suspended);
        }
        let goal = InterpolatedState::of(Regime::Suspended);
        let state = interp.state();
        assert!((state.speed - goal.speed).abs() < 1e-3);
        assert!((state.drift - goal.drift).abs() < 1e-3);
        assert!((state.color - goal.color).abs().max_element() < 1e-3);
    }

    #[test]
    fn test_no_overshoot_when_approaching_from_below() {
        let mut interp = RegimeInterpolator::default();
        let goal = Regime::Reverse.params().speed;
        let mut previous = interp.state().speed;
        for _ in 0..500 {
            let speed = interp.step(Regime::Reverse).speed;
            assert!(speed <= goal, "overshot: {} > {}", speed, goal);
            assert!(speed >= previous);
            previous = speed;
        }
    }

    #[test]
    fn test_switching_target_mid_blend_is_continuous() {
        let mut interp = RegimeInterpolator::default();
        for _ in 0..5 {
            interp.step(Regime::Reverse);
        }
        let before = interp.state().speed;
        let after = interp.step(Regime::Normal).speed;
        // One frame can move at most factor * |gap|
        assert!((after - before).abs() <= 0.08 * (before - -1.0).abs() + 1e-6);
    }
}
