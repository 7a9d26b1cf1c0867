// Shared target activity
// Written by the sensor side, read once per frame by the frame loop

use std::sync::atomic::{AtomicU64, Ordering};

/// A single-writer/single-reader f64 cell.
///
/// The sensor path stores the latest activity level, the frame loop loads it.
/// Only the most recent value matters so a lost intermediate write is fine.
#[derive(Debug, Default)]
pub struct ActivityCell {
    bits: AtomicU64,
}

impl ActivityCell {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    pub fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}
