//! Per-drop record of status changes awaiting backend confirmation.

use std::collections::HashMap;

use shared::domain::{ArtworkId, PipelineStatus};

use crate::board::{Board, LocalItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusIntent {
    pub seq: u64,
    pub item: LocalItemId,
    pub remote_id: ArtworkId,
    pub from: PipelineStatus,
    pub to: PipelineStatus,
    pub from_index: usize,
}

#[derive(Debug, Default)]
pub struct IntentLog {
    next_seq: u64,
    pending: Vec<StatusIntent>,
    latest_by_item: HashMap<LocalItemId, u64>,
}

impl IntentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        item: LocalItemId,
        remote_id: ArtworkId,
        from: PipelineStatus,
        to: PipelineStatus,
        from_index: usize,
    ) -> StatusIntent {
        self.next_seq += 1;
        let intent = StatusIntent {
            seq: self.next_seq,
            item,
            remote_id,
            from,
            to,
            from_index,
        };
        self.latest_by_item.insert(item, intent.seq);
        self.pending.push(intent.clone());
        intent
    }

    /// Drops a confirmed intent.
    pub fn resolve(&mut self, seq: u64) -> Option<StatusIntent> {
        self.take(seq)
    }

    /// Drops a rejected intent. The caller decides whether to revert it.
    pub fn discard(&mut self, seq: u64) -> Option<StatusIntent> {
        self.take(seq)
    }

    /// True if no drop of the same item was recorded after this one.
    pub fn is_latest(&self, intent: &StatusIntent) -> bool {
        self.latest_by_item.get(&intent.item) == Some(&intent.seq)
    }

    pub fn pending(&self) -> &[StatusIntent] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.latest_by_item.clear();
    }

    fn take(&mut self, seq: u64) -> Option<StatusIntent> {
        let index = self.pending.iter().position(|intent| intent.seq == seq)?;
        Some(self.pending.remove(index))
    }
}

/// Puts the item back where the intent found it. Only applies while the
/// intent is the item's most recent one and the item still sits in `to`.
pub fn revert(board: &mut Board, log: &IntentLog, intent: &StatusIntent) -> bool {
    if !log.is_latest(intent) || board.find_column(intent.item) != Some(intent.to) {
        return false;
    }
    board
        .move_to(intent.item, intent.from, intent.from_index)
        .is_some()
}

#[cfg(test)]
#[path = "tests/intents_tests.rs"]
mod tests;
