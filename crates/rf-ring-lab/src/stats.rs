//! Session statistics

use serde::{Deserialize, Serialize};

/// Running totals for one game session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_won: f64,
    pub total_refunded: f64,
    pub cashouts: u64,
    pub empty_cashouts: u64,
    pub void_hits: u64,
    pub failed_spins: u64,
    pub max_multiplier: f64,
}

impl SessionStats {
    /// Return to player, in percent of stakes that were actually played
    pub fn rtp(&self) -> f64 {
        let played = self.total_bet - self.total_refunded;
        if played > 0.0 {
            (self.total_won / played) * 100.0
        } else {
            0.0
        }
    }

    /// Net result for the player
    pub fn net(&self) -> f64 {
        self.total_won + self.total_refunded - self.total_bet
    }
}
