//! Named physical regimes and the source-count thresholds that select them.
//!
//! A regime is a fixed parameter set: collective fall speed, lateral drift
//! amplitude and tint. The table is closed; every lookup is a `match`, so
//! adding a variant without a row fails to compile.
//!
//! | Regime | Sources | speed | drift | color |
//! |--------|---------|-------|-------|-------|
//! | [`Regime::Normal`] | 0 | -1.0 | 0.05 | `#ffaa00` |
//! | [`Regime::Suspended`] | 1 | 0.0 | 0.20 | `#fff4d1` |
//! | [`Regime::Reverse`] | 2+ | 0.8 | 0.10 | `#ff4500` |
//!
//! Negative speed falls toward -Y, positive rises, zero hangs in place.

use glam::Vec3;

/// One of the three motion regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Regime {
    /// No sources detected: amber rain falling down.
    #[default]
    Normal,
    /// One source: rain hangs in the air and jitters.
    Suspended,
    /// Two or more sources: rain rises.
    Reverse,
}

/// Target values for a regime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeParams {
    /// Per-frame vertical displacement before the per-particle multiplier.
    pub speed: f32,
    /// Amplitude of the lateral sin/cos drift.
    pub drift: f32,
    /// Authored tint as 8-bit sRGB.
    pub color: [u8; 3],
}

impl RegimeParams {
    /// The tint converted to linear RGB in `[0, 1]`.
    pub fn linear_color(&self) -> Vec3 {
        Vec3::new(
            srgb_to_linear(self.color[0]),
            srgb_to_linear(self.color[1]),
            srgb_to_linear(self.color[2]),
        )
    }
}

const NORMAL: RegimeParams = RegimeParams {
    speed: -1.0,
    drift: 0.05,
    color: rgb(0xffaa00),
};

const SUSPENDED: RegimeParams = RegimeParams {
    speed: 0.0,
    drift: 0.2,
    color: rgb(0xfff4d1),
};

const REVERSE: RegimeParams = RegimeParams {
    speed: 0.8,
    drift: 0.1,
    color: rgb(0xff4500),
};

impl Regime {
    /// All regimes in table order.
    pub const ALL: [Regime; 3] = [Regime::Normal, Regime::Suspended, Regime::Reverse];

    /// Select a regime from a count of detected input sources.
    ///
    /// Total over all counts: 0 is [`Regime::Normal`], 1 is
    /// [`Regime::Suspended`], and anything from 2 upward collapses to
    /// [`Regime::Reverse`].
    pub fn from_source_count(count: u32) -> Regime {
        match count {
            0 => Regime::Normal,
            1 => Regime::Suspended,
            _ => Regime::Reverse,
        }
    }

    /// Target parameters for this regime.
    pub fn params(self) -> RegimeParams {
        match self {
            Regime::Normal => NORMAL,
            Regime::Suspended => SUSPENDED,
            Regime::Reverse => REVERSE,
        }
    }

    /// Display name used in logs and the window title.
    pub fn name(self) -> &'static str {
        match self {
            Regime::Normal => "NORMAL",
            Regime::Suspended => "SUSPENDED",
            Regime::Reverse => "REVERSE",
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Regime::Normal => 0,
            Regime::Suspended => 1,
            Regime::Reverse => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Regime {
        debug_assert!(value <= 2, "invalid regime tag {}", value);
        match value {
            0 => Regime::Normal,
            1 => Regime::Suspended,
            _ => Regime::Reverse,
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const fn rgb(hex: u32) -> [u8; 3] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_mapping() {
        assert_eq!(Regime::from_source_count(0), Regime::Normal);
        assert_eq!(Regime::from_source_count(1), Regime::Suspended);
        assert_eq!(Regime::from_source_count(2), Regime::Reverse);
        assert_eq!(Regime::from_source_count(57), Regime::Reverse);
        assert_eq!(Regime::from_source_count(u32::MAX), Regime::Reverse);
    }

    #[test]
    fn test_reference_table() {
        let normal = Regime::Normal.params();
        assert_eq!(normal.speed, -1.0);
        assert_eq!(normal.drift, 0.05);
        assert_eq!(normal.color, [255, 170, 0]);

        let suspended = Regime::Suspended.params();
        assert_eq!(suspended.speed, 0.0);
        assert_eq!(suspended.drift, 0.2);
        assert_eq!(suspended.color, [255, 244, 209]);

        let reverse = Regime::Reverse.params();
        assert_eq!(reverse.speed, 0.8);
        assert_eq!(reverse.drift, 0.1);
        assert_eq!(reverse.color, [255, 69, 0]);
    }

    #[test]
    fn test_speeds_stay_within_single_wrap() {
        for regime in Regime::ALL {
            assert!(regime.params().speed.abs() <= 1.0, "{} too fast", regime);
        }
    }

    #[test]
    fn test_linear_color_endpoints() {
        let c = Regime::Normal.params().linear_color();
        assert!((c.x - 1.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
        // 0xaa is mid-range sRGB, noticeably darker in linear space
        assert!(c.y > 0.38 && c.y < 0.41);
    }

    #[test]
    fn test_tag_round_trip() {
        for regime in Regime::ALL {
            assert_eq!(Regime::from_u8(regime.to_u8()), regime);
        }
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(Regime::default(), Regime::Normal);
        assert_eq!(Regime::Suspended.to_string(), "SUSPENDED");
    }
}
