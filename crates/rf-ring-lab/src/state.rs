//! Game state: balance, in-flight spin, history and ring progress
//!
//! Every operation here is synchronous and all-or-nothing: it either
//! applies completely or returns an error with nothing touched.
//! [`crate::GameStateMachine`] wraps this type behind a lock and drives
//! the asynchronous spin.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{BetRejected, CashoutRejected, ConfigError, ResolveError, SpinError};
use crate::history::{BetHistory, BetRecord, RecordKind};
use crate::payout::PayoutCalculator;
use crate::progress::{ProgressState, RingProgressTable};
use crate::resolver::{Resolution, SpinResolver};
use crate::stats::SessionStats;
use crate::symbols::SymbolId;

/// Identifier of one spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpinId(u64);

impl SpinId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SpinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spin-{:06}", self.0)
    }
}

/// Handed out by an accepted bet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinTicket {
    pub spin_id: SpinId,
    pub stake: f64,
    pub balance: f64,
}

/// Outcome of a cash-out request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Settlement {
    Paid {
        amount: f64,
        multiplier: f64,
        balance: f64,
    },
    /// No accumulated multiplier (or no previous bet); progress was cleared
    NothingToPay,
}

impl Settlement {
    /// Amount credited (0 when nothing was paid)
    pub fn amount(&self) -> f64 {
        match self {
            Self::Paid { amount, .. } => *amount,
            Self::NothingToPay => 0.0,
        }
    }
}

/// Outcome of settling a spin that never landed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinFailure {
    pub refunded: Option<f64>,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy)]
struct InFlightSpin {
    id: SpinId,
    stake: f64,
}

/// Read-only view of one ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingView {
    pub symbol: SymbolId,
    pub current: u32,
    pub max: u32,
    pub multipliers: Vec<f64>,
}

/// Serializable view of the whole game, for the UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub balance: f64,
    pub spinning: bool,
    pub spin_id: Option<SpinId>,
    pub can_cash_out: bool,
    pub multiplier: f64,
    pub rings: Vec<RingView>,
    pub history: Vec<BetRecord>,
}

/// The game model
#[derive(Debug, Clone)]
pub struct GameState {
    balance: f64,
    in_flight: Option<InFlightSpin>,
    can_cash_out: bool,
    history: BetHistory,
    progress: RingProgressTable,
    resolver: SpinResolver,
    stats: SessionStats,
    spin_count: u64,
    last_stake: f64,
    refund_on_failure: bool,
}

impl GameState {
    /// Build a fresh game from a validated config
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            balance: config.starting_balance,
            in_flight: None,
            can_cash_out: false,
            history: BetHistory::new(config.history_limit),
            progress: RingProgressTable::new(&config.rings),
            resolver: SpinResolver::new(config.void_symbol.symbol.clone()),
            stats: SessionStats::default(),
            spin_count: 0,
            last_stake: 0.0,
            refund_on_failure: config.refund_on_spin_failure,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMMANDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Debit the stake and open a spin
    pub fn place_bet(&mut self, amount: f64) -> Result<SpinTicket, BetRejected> {
        if let Some(spin) = self.in_flight {
            return Err(BetRejected::SpinInFlight(spin.id));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(BetRejected::InvalidAmount(amount));
        }
        if amount > self.balance {
            return Err(BetRejected::InsufficientBalance {
                amount,
                balance: self.balance,
            });
        }

        self.spin_count += 1;
        let spin_id = SpinId(self.spin_count);

        self.balance -= amount;
        self.last_stake = amount;
        self.history.push(RecordKind::Bet, amount, 0.0);
        self.can_cash_out = false;
        self.in_flight = Some(InFlightSpin {
            id: spin_id,
            stake: amount,
        });
        self.stats.total_bet += amount;

        log::debug!(
            "[Game] {} placed: stake {:.2}, balance {:.2}",
            spin_id,
            amount,
            self.balance
        );

        Ok(SpinTicket {
            spin_id,
            stake: amount,
            balance: self.balance,
        })
    }

    /// Apply the landed symbol of the in-flight spin and return to idle
    pub fn resolve_spin(
        &mut self,
        spin_id: SpinId,
        landed: &SymbolId,
    ) -> Result<Resolution, ResolveError> {
        self.take_in_flight(spin_id)?;

        let resolution = self.resolver.resolve(&mut self.progress, landed);
        self.stats.total_spins += 1;
        if resolution.is_reset() {
            self.stats.void_hits += 1;
            self.can_cash_out = false;
        } else {
            let multiplier = self.current_multiplier();
            self.can_cash_out = multiplier > 0.0;
            if multiplier > self.stats.max_multiplier {
                self.stats.max_multiplier = multiplier;
            }
        }

        log::debug!("[Game] {} resolved: {:?}", spin_id, resolution);
        Ok(resolution)
    }

    /// Close the in-flight spin without a landed symbol
    pub fn fail_spin(
        &mut self,
        spin_id: SpinId,
        error: &SpinError,
    ) -> Result<SpinFailure, ResolveError> {
        let spin = self.take_in_flight(spin_id)?;
        self.stats.failed_spins += 1;
        self.can_cash_out = self.current_multiplier() > 0.0;

        let refunded = if self.refund_on_failure {
            self.balance += spin.stake;
            self.history.push(RecordKind::Refund, spin.stake, spin.stake);
            self.stats.total_refunded += spin.stake;
            Some(spin.stake)
        } else {
            None
        };

        log::warn!(
            "[Game] {} failed ({}), refunded {:?}",
            spin_id,
            error,
            refunded
        );

        Ok(SpinFailure {
            refunded,
            balance: self.balance,
        })
    }

    /// Convert accumulated progress into a payout on the last bet
    pub fn cashout(&mut self) -> Result<Settlement, CashoutRejected> {
        if let Some(spin) = self.in_flight {
            return Err(CashoutRejected::SpinInFlight(spin.id));
        }

        let last_bet = self.last_stake;
        let calc = PayoutCalculator::new(&self.progress);
        let multiplier = calc.current_multiplier();
        let win = calc.cashout_amount(last_bet);

        let settlement = if win > 0.0 {
            self.balance += win;
            self.history.push(RecordKind::Cashout, last_bet, win);
            self.stats.total_won += win;
            self.stats.cashouts += 1;
            log::info!(
                "[Game] Cashout {:.2} ({:.2} x {:.2}), balance {:.2}",
                win,
                last_bet,
                multiplier,
                self.balance
            );
            Settlement::Paid {
                amount: win,
                multiplier,
                balance: self.balance,
            }
        } else {
            self.stats.empty_cashouts += 1;
            log::debug!("[Game] Cashout with nothing to pay, clearing progress");
            Settlement::NothingToPay
        };

        self.progress.reset_all();
        self.can_cash_out = false;
        Ok(settlement)
    }

    fn take_in_flight(&mut self, spin_id: SpinId) -> Result<InFlightSpin, ResolveError> {
        match self.in_flight {
            None => Err(ResolveError::NoSpinInFlight(spin_id)),
            Some(spin) if spin.id != spin_id => Err(ResolveError::StaleSpin {
                expected: spin.id,
                got: spin_id,
            }),
            Some(spin) => {
                self.in_flight = None;
                Ok(spin)
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn is_spinning(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn spin_in_flight(&self) -> Option<SpinId> {
        self.in_flight.map(|s| s.id)
    }

    pub fn can_cash_out(&self) -> bool {
        self.can_cash_out
    }

    pub fn history(&self) -> &BetHistory {
        &self.history
    }

    pub fn progress(&self, symbol: &SymbolId) -> Option<ProgressState> {
        self.progress.get(symbol)
    }

    pub fn progress_table(&self) -> &RingProgressTable {
        &self.progress
    }

    pub fn current_multiplier(&self) -> f64 {
        PayoutCalculator::new(&self.progress).current_multiplier()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            balance: self.balance,
            spinning: self.is_spinning(),
            spin_id: self.spin_in_flight(),
            can_cash_out: self.can_cash_out,
            multiplier: self.current_multiplier(),
            rings: self
                .progress
                .iter()
                .map(|(definition, progress)| RingView {
                    symbol: definition.symbol.clone(),
                    current: progress.current,
                    max: progress.max,
                    multipliers: definition.multipliers.clone(),
                })
                .collect(),
            history: self.history.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RingDefinition;
    use approx::assert_relative_eq;

    fn config() -> GameConfig {
        GameConfig::studio().with_rings(vec![
            RingDefinition::new("lion", &[1.0, 1.2, 1.5]),
            RingDefinition::new("crown", &[1.0, 1.1]),
        ])
    }

    fn game() -> GameState {
        GameState::new(&config()).unwrap()
    }

    fn land(game: &mut GameState, stake: f64, symbol: &str) -> Resolution {
        let ticket = game.place_bet(stake).unwrap();
        game.resolve_spin(ticket.spin_id, &symbol.into()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let game = game();
        assert_eq!(game.balance(), 200.0);
        assert!(!game.is_spinning());
        assert!(!game.can_cash_out());
        assert!(game.history().is_empty());
        assert_eq!(game.current_multiplier(), 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = config().with_starting_balance(f64::NAN);
        assert!(GameState::new(&config).is_err());
    }

    #[test]
    fn test_place_bet_debits_and_records() {
        let mut game = game();
        let ticket = game.place_bet(10.0).unwrap();

        assert_eq!(ticket.stake, 10.0);
        assert_eq!(game.balance(), 190.0);
        assert!(game.is_spinning());
        assert_eq!(game.spin_in_flight(), Some(ticket.spin_id));

        let record = game.history().latest().unwrap();
        assert_eq!(record.bet, 10.0);
        assert_eq!(record.win, 0.0);
        assert_eq!(record.kind, RecordKind::Bet);
    }

    #[test]
    fn test_rejected_bets_change_nothing() {
        let mut game = game();
        let before = game.snapshot();

        assert_eq!(
            game.place_bet(0.0),
            Err(BetRejected::InvalidAmount(0.0))
        );
        assert!(matches!(
            game.place_bet(-5.0),
            Err(BetRejected::InvalidAmount(_))
        ));
        assert!(matches!(
            game.place_bet(f64::INFINITY),
            Err(BetRejected::InvalidAmount(_))
        ));
        assert!(matches!(
            game.place_bet(200.01),
            Err(BetRejected::InsufficientBalance { .. })
        ));

        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_full_balance_bet_allowed() {
        let mut game = game();
        assert!(game.place_bet(200.0).is_ok());
        assert_eq!(game.balance(), 0.0);
    }

    #[test]
    fn test_second_bet_rejected_while_spinning() {
        let mut game = game();
        let ticket = game.place_bet(10.0).unwrap();
        let before = game.snapshot();

        assert_eq!(
            game.place_bet(10.0),
            Err(BetRejected::SpinInFlight(ticket.spin_id))
        );
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_resolution_returns_to_idle() {
        let mut game = game();
        let resolution = land(&mut game, 10.0, "lion");

        assert!(matches!(resolution, Resolution::Advanced { .. }));
        assert!(!game.is_spinning());
        assert!(game.can_cash_out());
        assert_eq!(game.progress(&"lion".into()).unwrap().current, 1);
    }

    #[test]
    fn test_void_clears_progress_and_eligibility() {
        let mut game = game();
        land(&mut game, 10.0, "lion");
        land(&mut game, 10.0, "crown");
        land(&mut game, 10.0, "forbidden");

        assert!(!game.can_cash_out());
        assert_eq!(game.current_multiplier(), 0.0);
        assert_eq!(game.stats().void_hits, 1);
    }

    #[test]
    fn test_saturated_landing_still_finishes_spin() {
        let mut game = game();
        for _ in 0..5 {
            land(&mut game, 1.0, "crown");
        }
        assert_eq!(
            game.progress(&"crown".into()),
            Some(ProgressState { current: 2, max: 2 })
        );
        assert!(!game.is_spinning());
        assert!(game.can_cash_out());
    }

    #[test]
    fn test_stale_and_duplicate_resolutions_ignored() {
        let mut game = game();
        let ticket = game.place_bet(10.0).unwrap();

        let stale = SpinId::new(ticket.spin_id.get() + 7);
        assert!(matches!(
            game.resolve_spin(stale, &"lion".into()),
            Err(ResolveError::StaleSpin { .. })
        ));
        assert!(game.is_spinning());

        game.resolve_spin(ticket.spin_id, &"lion".into()).unwrap();
        assert_eq!(
            game.resolve_spin(ticket.spin_id, &"lion".into()),
            Err(ResolveError::NoSpinInFlight(ticket.spin_id))
        );
        assert_eq!(game.progress(&"lion".into()).unwrap().current, 1);
    }

    #[test]
    fn test_cashout_settlement() {
        let mut game = game();
        land(&mut game, 10.0, "lion");
        land(&mut game, 10.0, "lion");
        let balance = game.balance();

        let settlement = game.cashout().unwrap();
        assert_relative_eq!(settlement.amount(), 22.0);
        assert_relative_eq!(game.balance(), balance + 22.0);

        let record = game.history().latest().unwrap();
        assert_eq!(record.kind, RecordKind::Cashout);
        assert_eq!(record.bet, 10.0);
        assert_relative_eq!(record.win, 22.0);

        assert!(!game.progress_table().has_progress());
        assert!(!game.can_cash_out());
    }

    #[test]
    fn test_cashout_with_nothing_to_pay() {
        let mut game = game();
        land(&mut game, 10.0, "forbidden");
        let balance = game.balance();
        let history_len = game.history().len();

        assert_eq!(game.cashout(), Ok(Settlement::NothingToPay));
        assert_eq!(game.balance(), balance);
        assert_eq!(game.history().len(), history_len);
    }

    #[test]
    fn test_cashout_without_any_bet() {
        let mut game = game();
        assert_eq!(game.cashout(), Ok(Settlement::NothingToPay));
        assert_eq!(game.balance(), 200.0);
    }

    #[test]
    fn test_cashout_rejected_while_spinning() {
        let mut game = game();
        land(&mut game, 10.0, "lion");
        let ticket = game.place_bet(10.0).unwrap();
        let before = game.snapshot();

        assert_eq!(
            game.cashout(),
            Err(CashoutRejected::SpinInFlight(ticket.spin_id))
        );
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_failed_spin_refunds_stake() {
        let mut game = game();
        let ticket = game.place_bet(10.0).unwrap();

        let failure = game
            .fail_spin(ticket.spin_id, &SpinError::TimedOut { after_ms: 10 })
            .unwrap();
        assert_eq!(failure.refunded, Some(10.0));
        assert_eq!(game.balance(), 200.0);
        assert!(!game.is_spinning());

        let record = game.history().latest().unwrap();
        assert_eq!(record.kind, RecordKind::Refund);
        assert_eq!(record.win, 10.0);
    }

    #[test]
    fn test_failed_spin_without_refund() {
        let mut config = config();
        config.refund_on_spin_failure = false;
        let mut game = GameState::new(&config).unwrap();
        let ticket = game.place_bet(10.0).unwrap();

        let failure = game.fail_spin(ticket.spin_id, &SpinError::Cancelled).unwrap();
        assert_eq!(failure.refunded, None);
        assert_eq!(game.balance(), 190.0);
        assert!(!game.is_spinning());
    }

    #[test]
    fn test_failed_spin_keeps_progress() {
        let mut game = game();
        land(&mut game, 10.0, "lion");
        let ticket = game.place_bet(10.0).unwrap();
        assert!(!game.can_cash_out());

        game.fail_spin(ticket.spin_id, &SpinError::Cancelled).unwrap();
        assert_eq!(game.progress(&"lion".into()).unwrap().current, 1);
        assert!(game.can_cash_out());
    }

    #[test]
    fn test_cashout_after_refund_uses_last_stake() {
        let mut game = game();
        land(&mut game, 10.0, "lion");
        let ticket = game.place_bet(4.0).unwrap();
        game.fail_spin(ticket.spin_id, &SpinError::Cancelled).unwrap();

        assert_relative_eq!(game.cashout().unwrap().amount(), 4.0);
        assert_eq!(game.history().latest().unwrap().bet, 4.0);
    }

    #[test]
    fn test_cashout_stake_survives_history_cap() {
        let mut config = config();
        config.history_limit = 1;
        let mut game = GameState::new(&config).unwrap();
        land(&mut game, 10.0, "lion");
        land(&mut game, 10.0, "lion");
        let ticket = game.place_bet(5.0).unwrap();
        game.fail_spin(ticket.spin_id, &SpinError::Cancelled).unwrap();

        // Only the refund is left in history
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.history().latest().unwrap().kind, RecordKind::Refund);
        assert_relative_eq!(game.cashout().unwrap().amount(), 11.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut game = game();
        land(&mut game, 10.0, "lion");
        let json = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(json["rings"][0]["symbol"], "lion");
        assert_eq!(json["rings"][0]["current"], 1);
        assert_eq!(json["history"][0]["kind"], "Bet");
    }
}
