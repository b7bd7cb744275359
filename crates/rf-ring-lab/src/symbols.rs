//! Symbol identifiers and the reel symbol set

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque symbol identifier (e.g., "lion", "crown", "forbidden")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SymbolId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Symbol classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Advances its own ring
    Ring,
    /// Resets every ring
    Void,
}

/// One entry of the reel symbol set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelSymbol {
    pub id: SymbolId,
    pub kind: SymbolKind,
    /// Relative share of the reel strip
    pub weight: u32,
}

/// Ordered multiset of every symbol the reel can show
///
/// Handed to the spin collaborator so the animation can cycle through the
/// same symbols the core knows about. Order follows configuration order,
/// with the void symbol last.
#[derive(Debug, Clone, PartialEq)]
pub struct ReelSymbols {
    symbols: Arc<[ReelSymbol]>,
}

impl ReelSymbols {
    pub fn new(symbols: Vec<ReelSymbol>) -> Self {
        Self {
            symbols: symbols.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReelSymbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReelSymbol> {
        self.symbols.get(index)
    }

    /// Symbol ids in reel order
    pub fn ids(&self) -> Vec<SymbolId> {
        self.symbols.iter().map(|s| s.id.clone()).collect()
    }

    /// Weights in reel order
    pub fn weights(&self) -> Vec<u32> {
        self.symbols.iter().map(|s| s.weight).collect()
    }

    /// Id of the void symbol, if the set has one
    pub fn void_id(&self) -> Option<&SymbolId> {
        self.symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Void)
            .map(|s| &s.id)
    }

    /// Is the id part of this set?
    pub fn contains(&self, id: &SymbolId) -> bool {
        self.symbols.iter().any(|s| &s.id == id)
    }

    /// Expand to a flat strip where each symbol appears `weight` times
    pub fn to_strip(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .flat_map(|s| std::iter::repeat_n(s.id.clone(), s.weight as usize))
            .collect()
    }
}
