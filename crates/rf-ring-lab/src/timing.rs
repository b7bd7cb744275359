//! Reel animation timing for simulated spins

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest simulated spin accepted (one hour)
pub const MAX_SPIN_DURATION_MS: f64 = 3_600_000.0;

/// Timing profile for the reel animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingProfile {
    /// Normal gameplay timing
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Studio mode (instant, for testing and batch runs)
    Studio,
    /// Hand-tuned or scaled values
    Custom,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Normal
    }
}

/// Reel animation timing
///
/// Every reel eases to a stop; reel `i` stops `i * reel_stop_interval_ms`
/// after the first one, so a spin lasts
/// `reel_spin_duration_ms + (reel_count - 1) * reel_stop_interval_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Number of animated reels
    pub reel_count: u8,

    /// Time for the first reel to stop (ms)
    pub reel_spin_duration_ms: f64,

    /// Delay between reel stops (ms)
    pub reel_stop_interval_ms: f64,
}

impl SpinTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            reel_count: 3,
            reel_spin_duration_ms: 1600.0,
            reel_stop_interval_ms: 800.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            reel_count: 3,
            reel_spin_duration_ms: 800.0,
            reel_stop_interval_ms: 400.0,
        }
    }

    /// Studio mode: no animation delay
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            reel_count: 3,
            reel_spin_duration_ms: 0.0,
            reel_stop_interval_ms: 0.0,
        }
    }

    /// Get timing for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            reel_count: self.reel_count,
            reel_spin_duration_ms: self.reel_spin_duration_ms * factor,
            reel_stop_interval_ms: self.reel_stop_interval_ms * factor,
        }
    }

    /// Offset of each reel stop from spin start (ms)
    pub fn reel_stop_offsets(&self) -> Vec<f64> {
        (0..self.reel_count)
            .map(|i| self.reel_spin_duration_ms + i as f64 * self.reel_stop_interval_ms)
            .collect()
    }

    /// Total spin duration, until the last reel stops (ms)
    pub fn total_spin_duration_ms(&self) -> f64 {
        if self.reel_count == 0 {
            return 0.0;
        }
        self.reel_spin_duration_ms + (self.reel_count as f64 - 1.0) * self.reel_stop_interval_ms
    }

    /// Check that every value is finite, non-negative and the spin fits
    /// within [`MAX_SPIN_DURATION_MS`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("reel_spin_duration_ms", self.reel_spin_duration_ms),
            ("reel_stop_interval_ms", self.reel_stop_interval_ms),
            ("total_spin_duration_ms", self.total_spin_duration_ms()),
        ];
        for (field, value) in fields {
            if !value.is_finite() || !(0.0..=MAX_SPIN_DURATION_MS).contains(&value) {
                return Err(ConfigError::InvalidTiming { field, value });
            }
        }
        Ok(())
    }

    /// Total spin duration as a sleepable [`Duration`]
    pub fn total_spin_duration(&self) -> Result<Duration, ConfigError> {
        self.validate()?;
        let total_ms = self.total_spin_duration_ms();
        Duration::try_from_secs_f64(total_ms / 1000.0).map_err(|_| ConfigError::InvalidTiming {
            field: "total_spin_duration_ms",
            value: total_ms,
        })
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}
