//! Bet history

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// What produced a history record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Stake placed (win is always 0)
    Bet,
    /// Progress converted into a payout
    Cashout,
    /// Stake returned after a failed spin
    Refund,
}

/// One immutable history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecord {
    /// Unique, strictly increasing
    pub id: u64,
    pub bet: f64,
    pub win: f64,
    pub kind: RecordKind,
}

/// Most-recent-first history with a retention cap
#[derive(Debug, Clone)]
pub struct BetHistory {
    records: VecDeque<BetRecord>,
    limit: usize,
    next_id: u64,
}

impl BetHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit),
            limit: limit.max(1),
            next_id: 1,
        }
    }

    /// Prepend a record, dropping the oldest past the cap
    pub fn push(&mut self, kind: RecordKind, bet: f64, win: f64) -> &BetRecord {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push_front(BetRecord { id, bet, win, kind });
        self.records.truncate(self.limit);
        &self.records[0]
    }

    /// Most recent record
    pub fn latest(&self) -> Option<&BetRecord> {
        self.records.front()
    }

    /// Records, most recent first
    pub fn iter(&self) -> impl Iterator<Item = &BetRecord> {
        self.records.iter()
    }

    pub fn to_vec(&self) -> Vec<BetRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
