//! Game State Machine: sequences bet → spin → resolve → cash-out

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::GameConfig;
use crate::error::{BetRejected, RingError, RingResult, SpinError};
use crate::events::GameEvent;
use crate::history::BetRecord;
use crate::payout::PayoutCalculator;
use crate::progress::ProgressState;
use crate::source::{SpinOutcomeSource, SpinRequest};
use crate::state::{GameSnapshot, GameState, Settlement, SpinId, SpinTicket};
use crate::stats::SessionStats;
use crate::symbols::{ReelSymbols, SymbolId};

/// Drives one [`GameState`] against a spin source
///
/// Commands never fail across this boundary: `place_bet` answers with a
/// flag and `cashout` with the amount credited. Spins run as tokio tasks;
/// `place_bet` returns as soon as the stake is debited. A second bet is
/// refused until the running spin lands, fails, times out or is cancelled.
///
/// Clones share the same game.
pub struct GameStateMachine<S: SpinOutcomeSource> {
    state: Arc<Mutex<GameState>>,
    source: Arc<S>,
    symbols: ReelSymbols,
    spin_timeout: Duration,
    events: broadcast::Sender<GameEvent>,
    in_flight: Arc<Mutex<Option<JoinHandle<()>>>>,
    runtime: Handle,
}

impl<S: SpinOutcomeSource> GameStateMachine<S> {
    /// Create a game on the current tokio runtime
    pub fn new(config: GameConfig, source: S) -> RingResult<Self> {
        let runtime = Handle::try_current().map_err(|_| RingError::NoRuntime)?;
        Self::with_runtime(config, source, runtime)
    }

    /// Create a game whose spins run on `runtime`
    pub fn with_runtime(config: GameConfig, source: S, runtime: Handle) -> RingResult<Self> {
        let state = GameState::new(&config)?;
        let (events, _) = broadcast::channel(256);

        log::info!(
            "[Machine] Game ready: {} rings, balance {:.2}, spin timeout {} ms",
            config.rings.len(),
            config.starting_balance,
            config.spin_timeout_ms
        );

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            source: Arc::new(source),
            symbols: config.reel_symbols(),
            spin_timeout: Duration::from_millis(config.spin_timeout_ms),
            events,
            in_flight: Arc::new(Mutex::new(None)),
            runtime,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMMANDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Place a bet and start a spin; `false` if the bet was refused
    pub fn place_bet(&self, amount: f64) -> bool {
        self.try_place_bet(amount).is_ok()
    }

    /// Place a bet and start a spin, reporting why a bet was refused
    pub fn try_place_bet(&self, amount: f64) -> Result<SpinTicket, BetRejected> {
        // Held until the spin handle is stored so `settle` always sees the latest spin
        let mut in_flight = self.in_flight.lock();
        let ticket = self.state.lock().place_bet(amount).inspect_err(|e| {
            log::warn!("[Machine] Bet rejected: {}", e);
        })?;

        let _ = self.events.send(GameEvent::BetPlaced {
            spin_id: ticket.spin_id,
            stake: ticket.stake,
            balance: ticket.balance,
        });
        *in_flight = Some(self.spawn_spin(ticket));
        Ok(ticket)
    }

    /// Cash out accumulated progress; returns the amount credited
    ///
    /// Refused (returns 0, nothing changes) while a spin is in flight.
    pub fn cashout(&self) -> f64 {
        let settlement = match self.state.lock().cashout() {
            Ok(settlement) => settlement,
            Err(e) => {
                log::warn!("[Machine] Cashout rejected: {}", e);
                return 0.0;
            }
        };

        let event = match settlement {
            Settlement::Paid {
                amount,
                multiplier,
                balance,
            } => GameEvent::CashedOut {
                amount,
                multiplier,
                balance,
            },
            Settlement::NothingToPay => GameEvent::ProgressCleared,
        };
        let _ = self.events.send(event);
        settlement.amount()
    }

    /// Abort the in-flight spin and settle it as cancelled
    ///
    /// Returns `false` when there was nothing to cancel (or the spin
    /// landed first).
    pub fn cancel_spin(&self) -> bool {
        // Same lock order as `try_place_bet`: the stored handle belongs to
        // `spin_id` and no new spin can start until this one is settled
        let mut in_flight = self.in_flight.lock();
        let spin_id = self.state.lock().spin_in_flight();
        let Some(spin_id) = spin_id else {
            return false;
        };
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
        settle_spin(&self.state, &self.events, spin_id, Err(SpinError::Cancelled))
    }

    /// Wait for the in-flight spin (if any) to settle
    pub async fn settle(&self) {
        let handle = self.in_flight.lock().take();
        if let Some(handle) = handle {
            // Aborted spins were already settled by `cancel_spin`
            let _ = handle.await;
        }
    }

    fn spawn_spin(&self, ticket: SpinTicket) -> JoinHandle<()> {
        let request = SpinRequest {
            spin_id: ticket.spin_id,
            stake: ticket.stake,
            symbols: self.symbols.clone(),
        };
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let timeout = self.spin_timeout;

        self.runtime.spawn(async move {
            // A panicking source still settles its spin
            let spin = AssertUnwindSafe(async move { source.spin(request).await }).catch_unwind();
            let outcome = match tokio::time::timeout(timeout, spin).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(panic)) => {
                    let reason = panic_message(&*panic);
                    log::error!("[Machine] Spin source panicked: {}", reason);
                    Err(SpinError::SourceFailed(format!("source panicked: {}", reason)))
                }
                Err(_) => Err(SpinError::TimedOut {
                    after_ms: timeout.as_millis() as u64,
                }),
            };
            settle_spin(&state, &events, ticket.spin_id, outcome);
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn balance(&self) -> f64 {
        self.state.lock().balance()
    }

    pub fn is_spinning(&self) -> bool {
        self.state.lock().is_spinning()
    }

    pub fn can_cash_out(&self) -> bool {
        self.state.lock().can_cash_out()
    }

    /// History, most recent first
    pub fn history(&self) -> Vec<BetRecord> {
        self.state.lock().history().to_vec()
    }

    /// `{current, max}` for a ring symbol
    pub fn progress(&self, symbol: &SymbolId) -> Option<ProgressState> {
        self.state.lock().progress(symbol)
    }

    pub fn current_multiplier(&self) -> f64 {
        self.state.lock().current_multiplier()
    }

    /// What cashing out `stake` now would earn over the stake
    pub fn potential_profit(&self, stake: f64) -> f64 {
        let state = self.state.lock();
        PayoutCalculator::new(state.progress_table()).potential_profit(stake)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.lock().snapshot()
    }

    pub fn stats(&self) -> SessionStats {
        self.state.lock().stats().clone()
    }

    /// Symbols the reel may show, for the animation layer
    pub fn reel_symbols(&self) -> &ReelSymbols {
        &self.symbols
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Subscribe to game events
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }
}

impl<S: SpinOutcomeSource> Clone for GameStateMachine<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            source: Arc::clone(&self.source),
            symbols: self.symbols.clone(),
            spin_timeout: self.spin_timeout,
            events: self.events.clone(),
            in_flight: Arc::clone(&self.in_flight),
            runtime: self.runtime.clone(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Apply a spin outcome under the lock and publish it; `false` if the spin
/// was no longer in flight
fn settle_spin(
    state: &Mutex<GameState>,
    events: &broadcast::Sender<GameEvent>,
    spin_id: SpinId,
    outcome: Result<SymbolId, SpinError>,
) -> bool {
    let event = {
        let mut game = state.lock();
        match outcome {
            Ok(symbol) => game.resolve_spin(spin_id, &symbol).map(|resolution| {
                GameEvent::SpinResolved {
                    spin_id,
                    resolution,
                    multiplier: game.current_multiplier(),
                    can_cash_out: game.can_cash_out(),
                }
            }),
            Err(error) => game.fail_spin(spin_id, &error).map(|failure| GameEvent::SpinFailed {
                spin_id,
                error,
                refunded: failure.refunded,
                balance: failure.balance,
            }),
        }
    };

    match event {
        Ok(event) => {
            let _ = events.send(event);
            true
        }
        Err(e) => {
            log::warn!("[Machine] Ignored spin outcome: {}", e);
            false
        }
    }
}
