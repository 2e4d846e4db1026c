//! The active-regime publish point shared between a signal source and the
//! frame loop.
//!
//! Whatever detects input sources (a hand tracker, the keyboard stand-in in
//! [`crate::input`], a test) holds a [`ControlSignal`] clone and calls
//! [`ControlSignal::report_source_count`] from any thread. The frame loop
//! calls [`ControlSignal::load`] once per frame. Only the latest value
//! matters, so intermediate reports may be overwritten before anyone reads
//! them. Nothing here blocks.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::regime::Regime;

/// Single-slot, lock-free handle to the active regime.
///
/// Cloning is cheap and every clone observes the same slot.
#[derive(Debug, Clone)]
pub struct ControlSignal {
    slot: Arc<AtomicU8>,
}

impl ControlSignal {
    /// Create a signal initialised to [`Regime::Normal`].
    pub fn new() -> Self {
        Self {
            slot: Arc::new(AtomicU8::new(Regime::Normal.to_u8())),
        }
    }

    /// Publish the regime selected by `count` detected sources.
    ///
    /// Every call is authoritative and immediate; smoothing is the
    /// interpolator's job.
    pub fn report_source_count(&self, count: u32) {
        self.publish(Regime::from_source_count(count));
    }

    /// Publish a regime directly.
    pub fn publish(&self, regime: Regime) {
        self.slot.store(regime.to_u8(), Ordering::Release);
    }

    /// Latest published regime.
    pub fn load(&self) -> Regime {
        Regime::from_u8(self.slot.load(Ordering::Acquire))
    }
}

impl Default for ControlSignal {
    fn default() -> Self {
        Self::new()
    }
}
