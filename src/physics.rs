//! Vertical fall with periodic wraparound.
//!
//! This is the stored half of the particle motion. Each frame moves both
//! vertices of a particle by `speed * speed_factor` in Y, then wraps a
//! particle that left the volume through one face back in through the
//! opposite face, keeping its overshoot. Drift and stretch are not applied
//! here; see [`crate::shading`].

use crate::particles::ParticleBuffer;

/// Advance every particle by one frame at collective `speed`.
pub fn integrate(buffer: &mut ParticleBuffer, speed: f32) {
    let height = buffer.bounds().height;

    for pair in buffer.pairs_mut() {
        let step = speed * pair[0].speed_factor;
        let y = wrap(pair[0].position[1] + step, height);
        pair[0].position[1] = y;
        pair[1].position[1] = y;
    }
}

/// Wrap `y` into `[-height/2, height/2]`.
///
/// Positions already inside are returned unchanged. A position that crossed
/// a face re-enters through the other face by the same distance; crossings
/// longer than a full height are reduced modulo `height`.
#[inline]
pub fn wrap(y: f32, height: f32) -> f32 {
    let half = height * 0.5;
    if (-half..=half).contains(&y) {
        return y;
    }
    let wrapped = if y > half { y - height } else { y + height };
    if (-half..=half).contains(&wrapped) {
        wrapped
    } else {
        (y + half).rem_euclid(height) - half
    }
}
