//! Per-symbol ring progress

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::RingDefinition;
use crate::symbols::SymbolId;

/// Progress of one ring: `0 <= current <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub current: u32,
    pub max: u32,
}

impl ProgressState {
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}

/// Result of advancing a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advance {
    /// Progress moved up by one
    Advanced(ProgressState),
    /// Already at max; nothing changed
    Saturated(ProgressState),
}

#[derive(Debug, Clone)]
struct RingSlot {
    definition: RingDefinition,
    current: u32,
}

/// Progress counters and multiplier ladders for every ring
///
/// The only place that enforces `current <= max`. Rings keep their
/// configuration order so iteration (and multiplier summation) is stable.
#[derive(Debug, Clone)]
pub struct RingProgressTable {
    slots: Vec<RingSlot>,
    index: HashMap<SymbolId, usize>,
}

impl RingProgressTable {
    /// Build a table with every ring at zero
    pub fn new(definitions: &[RingDefinition]) -> Self {
        let slots: Vec<RingSlot> = definitions
            .iter()
            .map(|definition| RingSlot {
                definition: definition.clone(),
                current: 0,
            })
            .collect();
        let index = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.definition.symbol.clone(), i))
            .collect();
        Self { slots, index }
    }

    /// Current progress of a ring
    pub fn get(&self, symbol: &SymbolId) -> Option<ProgressState> {
        self.index.get(symbol).map(|&i| self.state_at(i))
    }

    /// Advance a ring by one segment, saturating at its max
    ///
    /// Returns `None` for symbols no ring tracks.
    pub fn advance(&mut self, symbol: &SymbolId) -> Option<Advance> {
        let &i = self.index.get(symbol)?;
        if self.state_at(i).is_full() {
            return Some(Advance::Saturated(self.state_at(i)));
        }
        self.slots[i].current += 1;
        Some(Advance::Advanced(self.state_at(i)))
    }

    /// Set every ring back to zero
    pub fn reset_all(&mut self) {
        for slot in &mut self.slots {
            slot.current = 0;
        }
    }

    /// Any ring above zero?
    pub fn has_progress(&self) -> bool {
        self.slots.iter().any(|slot| slot.current > 0)
    }

    /// Iterate rings in configuration order: (definition, progress)
    pub fn iter(&self) -> impl Iterator<Item = (&RingDefinition, ProgressState)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (&slot.definition, self.state_at(i)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn state_at(&self, i: usize) -> ProgressState {
        let slot = &self.slots[i];
        ProgressState {
            current: slot.current,
            max: slot.definition.segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RingProgressTable {
        RingProgressTable::new(&[
            RingDefinition::new("lion", &[1.0, 1.2, 1.5]),
            RingDefinition::new("crown", &[1.0]),
        ])
    }

    #[test]
    fn test_starts_at_zero() {
        let table = table();
        assert_eq!(
            table.get(&"lion".into()),
            Some(ProgressState { current: 0, max: 3 })
        );
        assert!(!table.has_progress());
        assert_eq!(table.get(&"dragon".into()), None);
    }

    #[test]
    fn test_advance_increments_by_one() {
        let mut table = table();
        let lion = SymbolId::from("lion");
        assert_eq!(
            table.advance(&lion),
            Some(Advance::Advanced(ProgressState { current: 1, max: 3 }))
        );
        assert_eq!(table.get(&lion).unwrap().current, 1);
        assert_eq!(table.get(&"crown".into()).unwrap().current, 0);
    }

    #[test]
    fn test_advance_saturates() {
        let mut table = table();
        let crown = SymbolId::from("crown");
        table.advance(&crown);
        assert_eq!(
            table.advance(&crown),
            Some(Advance::Saturated(ProgressState { current: 1, max: 1 }))
        );
        assert!(table.get(&crown).unwrap().is_full());
        assert!(!table.get(&"lion".into()).unwrap().is_full());
    }

    #[test]
    fn test_advance_unknown_symbol() {
        let mut table = table();
        assert_eq!(table.advance(&"dragon".into()), None);
        assert!(!table.has_progress());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut table = table();
        table.advance(&"lion".into());
        table.advance(&"crown".into());

        table.reset_all();
        let once: Vec<_> = table.iter().map(|(_, p)| p).collect();
        table.reset_all();
        let twice: Vec<_> = table.iter().map(|(_, p)| p).collect();

        assert_eq!(once, twice);
        assert!(once.iter().all(|p| p.current == 0));
    }
}
