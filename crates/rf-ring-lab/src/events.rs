//! Game events published to the UI / rendering layer

use serde::{Deserialize, Serialize};

use crate::error::SpinError;
use crate::resolver::Resolution;
use crate::state::SpinId;

/// Everything observable that happens to a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Stake debited, spin handed to the reel
    BetPlaced {
        spin_id: SpinId,
        stake: f64,
        balance: f64,
    },

    /// Reel landed and progress was updated
    SpinResolved {
        spin_id: SpinId,
        resolution: Resolution,
        multiplier: f64,
        can_cash_out: bool,
    },

    /// Reel never landed (timeout, source error, cancellation)
    SpinFailed {
        spin_id: SpinId,
        error: SpinError,
        refunded: Option<f64>,
        balance: f64,
    },

    /// Progress paid out
    CashedOut {
        amount: f64,
        multiplier: f64,
        balance: f64,
    },

    /// Cash-out with nothing to pay; progress wiped
    ProgressCleared,
}

impl GameEvent {
    /// Stable event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::BetPlaced { .. } => "BET_PLACED",
            Self::SpinResolved { .. } => "SPIN_RESOLVED",
            Self::SpinFailed { .. } => "SPIN_FAILED",
            Self::CashedOut { .. } => "CASHED_OUT",
            Self::ProgressCleared => "PROGRESS_CLEARED",
        }
    }

    /// Spin this event belongs to, if any
    pub fn spin_id(&self) -> Option<SpinId> {
        match self {
            Self::BetPlaced { spin_id, .. }
            | Self::SpinResolved { spin_id, .. }
            | Self::SpinFailed { spin_id, .. } => Some(*spin_id),
            Self::CashedOut { .. } | Self::ProgressCleared => None,
        }
    }

    /// Does this event end a spin?
    pub fn settles_spin(&self) -> bool {
        matches!(self, Self::SpinResolved { .. } | Self::SpinFailed { .. })
    }
}
