//! Landed symbol → progress update

use serde::{Deserialize, Serialize};

use crate::progress::{Advance, ProgressState, RingProgressTable};
use crate::symbols::SymbolId;

/// Why progress was wiped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetCause {
    /// The void symbol landed
    Void,
    /// The spin source produced a symbol nobody configured
    UnknownSymbol,
}

/// What a landed symbol did to the rings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    Advanced {
        symbol: SymbolId,
        progress: ProgressState,
    },
    /// Ring was already full; landing still counts as a spin
    Saturated {
        symbol: SymbolId,
        progress: ProgressState,
    },
    Reset {
        symbol: SymbolId,
        cause: ResetCause,
    },
}

impl Resolution {
    pub fn symbol(&self) -> &SymbolId {
        match self {
            Self::Advanced { symbol, .. }
            | Self::Saturated { symbol, .. }
            | Self::Reset { symbol, .. } => symbol,
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset { .. })
    }
}

/// Applies spin outcomes to a [`RingProgressTable`]
///
/// Unknown symbols are handled exactly like the void symbol: a malformed
/// outcome wipes progress instead of surfacing a fault.
#[derive(Debug, Clone)]
pub struct SpinResolver {
    void_symbol: SymbolId,
}

impl SpinResolver {
    pub fn new(void_symbol: SymbolId) -> Self {
        Self { void_symbol }
    }

    pub fn resolve(&self, table: &mut RingProgressTable, landed: &SymbolId) -> Resolution {
        if landed == &self.void_symbol {
            table.reset_all();
            return Resolution::Reset {
                symbol: landed.clone(),
                cause: ResetCause::Void,
            };
        }

        match table.advance(landed) {
            Some(Advance::Advanced(progress)) => Resolution::Advanced {
                symbol: landed.clone(),
                progress,
            },
            Some(Advance::Saturated(progress)) => Resolution::Saturated {
                symbol: landed.clone(),
                progress,
            },
            None => {
                log::warn!(
                    "[Resolver] Unknown symbol {} landed, treating as void",
                    landed
                );
                table.reset_all();
                Resolution::Reset {
                    symbol: landed.clone(),
                    cause: ResetCause::UnknownSymbol,
                }
            }
        }
    }
}
