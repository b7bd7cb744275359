//! Multiplier and cash-out calculation

use serde::{Deserialize, Serialize};

use crate::progress::RingProgressTable;
use crate::symbols::SymbolId;

/// One ring's share of the total multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingContribution {
    pub symbol: SymbolId,
    pub current: u32,
    pub multiplier: f64,
}

/// Reads a [`RingProgressTable`] and prices it
///
/// Multipliers are additive: each ring contributes the sum of its first
/// `current` ladder entries, and the rings are summed together. Bounds are
/// the table's job; the calculator trusts `current <= max`.
#[derive(Debug, Clone, Copy)]
pub struct PayoutCalculator<'a> {
    table: &'a RingProgressTable,
}

impl<'a> PayoutCalculator<'a> {
    pub fn new(table: &'a RingProgressTable) -> Self {
        Self { table }
    }

    /// Total multiplier across all rings (0 with no progress)
    pub fn current_multiplier(&self) -> f64 {
        self.table
            .iter()
            .map(|(definition, progress)| unlocked(&definition.multipliers, progress.current))
            .sum()
    }

    /// Per-ring contributions, in configuration order
    pub fn breakdown(&self) -> Vec<RingContribution> {
        self.table
            .iter()
            .map(|(definition, progress)| RingContribution {
                symbol: definition.symbol.clone(),
                current: progress.current,
                multiplier: unlocked(&definition.multipliers, progress.current),
            })
            .collect()
    }

    /// Amount paid for cashing out against `last_bet`
    pub fn cashout_amount(&self, last_bet: f64) -> f64 {
        (last_bet * self.current_multiplier()).max(0.0)
    }

    /// Profit over the stake if cashed out now (the bet panel's "potential" figure)
    pub fn potential_profit(&self, stake: f64) -> f64 {
        (stake * (self.current_multiplier() - 1.0)).max(0.0)
    }
}

/// Sum of the first `current` ladder entries
fn unlocked(ladder: &[f64], current: u32) -> f64 {
    ladder.iter().take(current as usize).sum()
}
