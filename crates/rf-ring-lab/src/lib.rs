//! # rf-ring-lab: Ring Multiplier Game Core
//!
//! Bet/spin state machine and payout engine for the ring multiplier slot.
//! A reel lands on a symbol, the symbol advances its ring, and the unlocked
//! ring segments add up to the multiplier paid out on cash-out.
//!
//! ## Architecture
//!
//! ```text
//! GameStateMachine<S: SpinOutcomeSource>
//!     │
//!     ├── GameState (balance, in-flight spin, history)
//!     │       ├── RingProgressTable (per-symbol counters + ladders)
//!     │       ├── SpinResolver (landed symbol → advance / reset)
//!     │       └── PayoutCalculator (total multiplier, cash-out amount)
//!     │
//!     └── S::spin() ──(tokio task, timeout)──> resolve / fail
//!           │
//!           v
//!     GameEvent broadcast
//! ```
//!
//! Rendering and reel animation live outside this crate; they talk to the
//! core through [`SpinOutcomeSource`], the read accessors on
//! [`GameStateMachine`] and the [`GameEvent`] stream.

pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod machine;
pub mod payout;
pub mod progress;
pub mod resolver;
pub mod source;
pub mod state;
pub mod stats;
pub mod symbols;
pub mod timing;

pub use config::*;
pub use error::*;
pub use events::*;
pub use history::*;
pub use machine::*;
pub use payout::*;
pub use progress::*;
pub use resolver::*;
pub use source::*;
pub use state::*;
pub use stats::*;
pub use symbols::*;
pub use timing::*;
