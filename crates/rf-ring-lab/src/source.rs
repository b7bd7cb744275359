//! Spin outcome sources: the reel side of the spin contract

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::error::{ConfigError, SpinError};
use crate::state::SpinId;
use crate::symbols::{ReelSymbols, SymbolId};
use crate::timing::SpinTiming;

/// What the reel gets for each spin
#[derive(Debug, Clone)]
pub struct SpinRequest {
    pub spin_id: SpinId,
    pub stake: f64,
    /// Every symbol the reel may show, in reel order
    pub symbols: ReelSymbols,
}

/// Produces exactly one landed symbol per spin, or fails
///
/// The returned future may take as long as the animation needs; the game
/// bounds it with its own timeout. Returning a symbol that is not in
/// `request.symbols` is allowed and resets progress.
pub trait SpinOutcomeSource: Send + Sync + 'static {
    fn spin(
        &self,
        request: SpinRequest,
    ) -> impl Future<Output = Result<SymbolId, SpinError>> + Send;
}

// ═══════════════════════════════════════════════════════════════════════════════
// RANDOM
// ═══════════════════════════════════════════════════════════════════════════════

/// Weighted random reel with a simulated animation delay
pub struct RandomSpinSource {
    symbols: ReelSymbols,
    distribution: WeightedIndex<u32>,
    rng: Mutex<StdRng>,
    timing: SpinTiming,
    delay: Duration,
}

impl RandomSpinSource {
    pub fn new(symbols: ReelSymbols, timing: SpinTiming) -> Result<Self, ConfigError> {
        let distribution =
            WeightedIndex::new(symbols.weights()).map_err(|_| ConfigError::EmptyReel)?;
        let delay = timing.total_spin_duration()?;
        Ok(Self {
            symbols,
            distribution,
            rng: Mutex::new(StdRng::from_os_rng()),
            timing,
            delay,
        })
    }

    /// Reel built from a game config (its symbols, weights and timing)
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::new(config.reel_symbols(), config.timing.clone())
    }

    /// Seed RNG for reproducible results
    pub fn seeded(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn timing(&self) -> &SpinTiming {
        &self.timing
    }

    /// Draw a symbol without animating
    pub fn pick(&self) -> SymbolId {
        let index = self.distribution.sample(&mut *self.rng.lock());
        self.symbols
            .get(index)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| SymbolId::from(""))
    }
}

impl SpinOutcomeSource for RandomSpinSource {
    fn spin(
        &self,
        request: SpinRequest,
    ) -> impl Future<Output = Result<SymbolId, SpinError>> + Send {
        let landed = self.pick();
        let delay = self.delay;
        log::trace!("[Reel] {} will land on {} in {:?}", request.spin_id, landed, delay);
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(landed)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCRIPTED
// ═══════════════════════════════════════════════════════════════════════════════

/// One scripted spin
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedOutcome {
    /// Land on this symbol
    Land(SymbolId),
    /// Report a source failure
    Fail(String),
    /// Never settle
    Hang,
}

impl ScriptedOutcome {
    pub fn land(symbol: impl Into<SymbolId>) -> Self {
        Self::Land(symbol.into())
    }
}

/// Plays back a fixed queue of outcomes; an empty queue fails the spin
pub struct ScriptedSpinSource {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    delay: Duration,
    requests: AtomicU64,
}

impl ScriptedSpinSource {
    pub fn new(script: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            delay: Duration::ZERO,
            requests: AtomicU64::new(0),
        }
    }

    /// Land on each symbol in turn
    pub fn landing<I, T>(symbols: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SymbolId>,
    {
        Self::new(symbols.into_iter().map(|s| ScriptedOutcome::Land(s.into())))
    }

    /// Delay before each landing
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Append more outcomes
    pub fn push(&self, outcome: ScriptedOutcome) {
        self.script.lock().push_back(outcome);
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }

    /// Number of spins requested so far
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

impl SpinOutcomeSource for ScriptedSpinSource {
    fn spin(
        &self,
        _request: SpinRequest,
    ) -> impl Future<Output = Result<SymbolId, SpinError>> + Send {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let next = self.script.lock().pop_front();
        let delay = self.delay;
        async move {
            match next {
                Some(ScriptedOutcome::Land(symbol)) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    Ok(symbol)
                }
                Some(ScriptedOutcome::Fail(reason)) => Err(SpinError::SourceFailed(reason)),
                Some(ScriptedOutcome::Hang) => std::future::pending().await,
                None => Err(SpinError::SourceFailed("script exhausted".into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(symbols: ReelSymbols) -> SpinRequest {
        SpinRequest {
            spin_id: SpinId::new(1),
            stake: 1.0,
            symbols,
        }
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let config = GameConfig::studio();
        let a = RandomSpinSource::from_config(&config).unwrap().seeded(42);
        let b = RandomSpinSource::from_config(&config).unwrap().seeded(42);

        let run_a: Vec<SymbolId> = (0..50).map(|_| a.pick()).collect();
        let run_b: Vec<SymbolId> = (0..50).map(|_| b.pick()).collect();
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_random_only_picks_configured_symbols() {
        let config = GameConfig::studio();
        let reel = config.reel_symbols();
        let source = RandomSpinSource::from_config(&config).unwrap().seeded(7);
        for _ in 0..200 {
            assert!(reel.contains(&source.pick()));
        }
    }

    #[test]
    fn test_zero_weight_symbol_never_lands() {
        let mut config = GameConfig::studio();
        config.void_symbol.weight = 0;
        let source = RandomSpinSource::from_config(&config).unwrap().seeded(9);
        for _ in 0..200 {
            assert_ne!(source.pick().as_str(), "forbidden");
        }
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let mut config = GameConfig::studio();
        for ring in &mut config.rings {
            ring.weight = 0;
        }
        config.void_symbol.weight = 0;
        assert!(matches!(
            RandomSpinSource::from_config(&config),
            Err(ConfigError::EmptyReel)
        ));
    }

    #[test]
    fn test_unrepresentable_timing_rejected() {
        let mut timing = SpinTiming::normal();
        timing.reel_stop_interval_ms = 1e300;
        assert!(matches!(
            RandomSpinSource::new(GameConfig::studio().reel_symbols(), timing),
            Err(ConfigError::InvalidTiming { .. })
        ));
    }

    #[tokio::test]
    async fn test_scripted_plays_in_order() {
        let reel = GameConfig::studio().reel_symbols();
        let source = ScriptedSpinSource::new([
            ScriptedOutcome::land("lion"),
            ScriptedOutcome::Fail("reel jammed".into()),
        ]);

        assert_eq!(
            source.spin(request(reel.clone())).await,
            Ok(SymbolId::from("lion"))
        );
        assert_eq!(
            source.spin(request(reel.clone())).await,
            Err(SpinError::SourceFailed("reel jammed".into()))
        );
        assert!(matches!(
            source.spin(request(reel)).await,
            Err(SpinError::SourceFailed(_))
        ));
        assert_eq!(source.requests(), 3);
    }
}
