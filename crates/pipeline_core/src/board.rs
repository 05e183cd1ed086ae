//! Client-side view of the four-column pipeline.
//!
//! The board is a derived cache of the remote artwork records. Drags mutate
//! it speculatively; a fetch replaces it wholesale.

use std::{collections::HashSet, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::domain::{ArtworkId, ArtworkRecord, PipelineStatus};
use uuid::Uuid;

/// Drag-tracking id. Stable across refetches for the same remote artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalItemId(pub Uuid);

impl LocalItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LocalItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineItem {
    pub local_id: LocalItemId,
    pub remote_id: Option<ArtworkId>,
    pub title: String,
    pub medium: String,
    pub price: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Set while a remote call for this item is in flight.
    pub submitting: bool,
}

impl PipelineItem {
    pub fn from_record(local_id: LocalItemId, record: &ArtworkRecord) -> Self {
        let mut item = Self {
            local_id,
            remote_id: Some(record.id),
            title: String::new(),
            medium: String::new(),
            price: None,
            due_date: None,
            description: None,
            image_url: None,
            submitting: false,
        };
        item.apply_record(record);
        item
    }

    /// Copies the editable fields. Column placement is the board's concern.
    pub fn apply_record(&mut self, record: &ArtworkRecord) {
        self.remote_id = Some(record.id);
        self.title = record.title.clone();
        self.medium = record.medium.clone();
        self.price = record.price;
        self.due_date = record.due_date;
        self.description = record.description.clone();
        self.image_url = record.image_url.clone();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub status: PipelineStatus,
    pub items: Vec<PipelineItem>,
}

impl Column {
    fn empty(status: PipelineStatus) -> Self {
        Self {
            status,
            items: Vec::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.status.title()
    }

    pub fn color(&self) -> &'static str {
        self.status.color()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, local_id: LocalItemId) -> Option<usize> {
        self.items.iter().position(|item| item.local_id == local_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    columns: [Column; 4],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            columns: PipelineStatus::ALL.map(Column::empty),
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups remote records into columns, keeping backend order within each.
    /// Local ids already assigned on `previous` are reused by remote id.
    pub fn from_records(records: &[ArtworkRecord], previous: Option<&Board>) -> Self {
        let mut board = Board::default();
        for record in records {
            let local_id = previous
                .and_then(|prev| prev.find_by_remote(record.id))
                .unwrap_or_default();
            board.columns[record.status.index()]
                .items
                .push(PipelineItem::from_record(local_id, record));
        }
        board
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, status: PipelineStatus) -> &Column {
        &self.columns[status.index()]
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Column::is_empty)
    }

    pub fn find_column(&self, local_id: LocalItemId) -> Option<PipelineStatus> {
        self.position(local_id).map(|(status, _)| status)
    }

    pub fn position(&self, local_id: LocalItemId) -> Option<(PipelineStatus, usize)> {
        self.columns.iter().find_map(|column| {
            column
                .position(local_id)
                .map(|index| (column.status, index))
        })
    }

    pub fn item(&self, local_id: LocalItemId) -> Option<&PipelineItem> {
        let (status, index) = self.position(local_id)?;
        self.columns[status.index()].items.get(index)
    }

    pub fn item_mut(&mut self, local_id: LocalItemId) -> Option<&mut PipelineItem> {
        let (status, index) = self.position(local_id)?;
        self.columns[status.index()].items.get_mut(index)
    }

    pub fn find_by_remote(&self, remote_id: ArtworkId) -> Option<LocalItemId> {
        self.columns
            .iter()
            .flat_map(|column| column.items.iter())
            .find(|item| item.remote_id == Some(remote_id))
            .map(|item| item.local_id)
    }

    /// Inserts at `index`, clamped to the column length.
    pub fn insert(&mut self, status: PipelineStatus, index: usize, item: PipelineItem) {
        let items = &mut self.columns[status.index()].items;
        let index = index.min(items.len());
        items.insert(index, item);
    }

    pub fn push(&mut self, status: PipelineStatus, item: PipelineItem) {
        self.columns[status.index()].items.push(item);
    }

    pub fn remove(&mut self, local_id: LocalItemId) -> Option<(PipelineStatus, usize, PipelineItem)> {
        let (status, index) = self.position(local_id)?;
        let item = self.columns[status.index()].items.remove(index);
        Some((status, index, item))
    }

    /// Splices the item out of its column and into `status` at `index`.
    /// Returns the index it landed at.
    pub fn move_to(
        &mut self,
        local_id: LocalItemId,
        status: PipelineStatus,
        index: usize,
    ) -> Option<usize> {
        let (_, _, item) = self.remove(local_id)?;
        let items = &mut self.columns[status.index()].items;
        let index = index.min(items.len());
        items.insert(index, item);
        Some(index)
    }

    /// Array move within one column.
    pub fn reorder(&mut self, status: PipelineStatus, from: usize, to: usize) -> bool {
        let items = &mut self.columns[status.index()].items;
        if from >= items.len() || to >= items.len() {
            return false;
        }
        if from != to {
            let item = items.remove(from);
            items.insert(to, item);
        }
        true
    }

    pub fn set_submitting(&mut self, local_id: LocalItemId, submitting: bool) -> bool {
        match self.item_mut(local_id) {
            Some(item) => {
                item.submitting = submitting;
                true
            }
            None => false,
        }
    }

    /// Every item sits in exactly one column and no remote id is shared.
    pub fn is_consistent(&self) -> bool {
        let mut local_ids = HashSet::new();
        let mut remote_ids = HashSet::new();
        for item in self.columns.iter().flat_map(|column| column.items.iter()) {
            if !local_ids.insert(item.local_id) {
                return false;
            }
            if let Some(remote_id) = item.remote_id {
                if !remote_ids.insert(remote_id) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
