//! Drag lifecycle handling for the pipeline board.
//!
//! The coordinator consumes start/over/end events from a pointer-tracking
//! layer and applies the provisional placement to the board immediately.
//! It never talks to the backend; `drag_end` classifies the drop and the
//! caller decides what has to be persisted.

use shared::domain::{ArtworkId, PipelineStatus};

use crate::board::{Board, LocalItemId};

/// What the pointer is currently over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Column(PipelineStatus),
    Item(LocalItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging {
        active: LocalItemId,
        source: PipelineStatus,
        source_index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No gesture in progress for this item.
    Ignored,
    /// Dropped outside any column; the last drag-over placement stands.
    NoTarget { item: LocalItemId },
    CrossColumn {
        item: LocalItemId,
        remote_id: Option<ArtworkId>,
        from: PipelineStatus,
        to: PipelineStatus,
        from_index: usize,
        to_index: usize,
    },
    /// Same column, different slot. Never persisted.
    Reordered {
        item: LocalItemId,
        status: PipelineStatus,
        from_index: usize,
        to_index: usize,
    },
    Unchanged {
        item: LocalItemId,
        status: PipelineStatus,
    },
}

#[derive(Debug, Default)]
pub struct DragCoordinator {
    phase: DragPhase,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Starts a gesture. A start for an item that is not on the board is ignored.
    pub fn drag_start(&mut self, board: &Board, active: LocalItemId) -> bool {
        let Some((source, source_index)) = board.position(active) else {
            return false;
        };
        self.phase = DragPhase::Dragging {
            active,
            source,
            source_index,
        };
        true
    }

    /// Moves the active item into the hovered column when it differs from
    /// the item's current one. Returns true if the board changed.
    pub fn drag_over(&mut self, board: &mut Board, active: LocalItemId, over: DropTarget) -> bool {
        if !self.is_active(active) {
            return false;
        }
        move_across_columns(board, active, over).is_some()
    }

    pub fn drag_end(
        &mut self,
        board: &mut Board,
        active: LocalItemId,
        over: Option<DropTarget>,
    ) -> DropOutcome {
        let DragPhase::Dragging {
            active: dragged,
            source,
            source_index,
        } = self.phase
        else {
            return DropOutcome::Ignored;
        };
        if dragged != active {
            return DropOutcome::Ignored;
        }
        self.phase = DragPhase::Idle;

        let Some(over) = over else {
            return DropOutcome::NoTarget { item: active };
        };
        let Some(target) = resolve_target(board, over) else {
            return DropOutcome::NoTarget { item: active };
        };
        if board.position(active).is_none() {
            // A refetch dropped the item mid-gesture.
            return DropOutcome::Ignored;
        }

        move_across_columns(board, active, over);

        if target != source {
            let to_index = board
                .column(target)
                .position(active)
                .unwrap_or_default();
            return DropOutcome::CrossColumn {
                item: active,
                remote_id: board.item(active).and_then(|item| item.remote_id),
                from: source,
                to: target,
                from_index: source_index,
                to_index,
            };
        }

        if let DropTarget::Item(over_id) = over {
            let column = board.column(target);
            if let (Some(from), Some(to)) = (column.position(active), column.position(over_id)) {
                board.reorder(target, from, to);
            }
        }

        let final_index = board
            .column(target)
            .position(active)
            .unwrap_or(source_index);
        if final_index != source_index {
            DropOutcome::Reordered {
                item: active,
                status: target,
                from_index: source_index,
                to_index: final_index,
            }
        } else {
            DropOutcome::Unchanged {
                item: active,
                status: target,
            }
        }
    }

    /// Abandons the gesture without touching the board.
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }

    fn is_active(&self, item: LocalItemId) -> bool {
        matches!(self.phase, DragPhase::Dragging { active, .. } if active == item)
    }
}

/// Column a drop target belongs to, if it is on the board.
pub fn resolve_target(board: &Board, over: DropTarget) -> Option<PipelineStatus> {
    match over {
        DropTarget::Column(status) => Some(status),
        DropTarget::Item(item) => board.find_column(item),
    }
}

fn move_across_columns(
    board: &mut Board,
    active: LocalItemId,
    over: DropTarget,
) -> Option<usize> {
    let target = resolve_target(board, over)?;
    let current = board.find_column(active)?;
    if current == target {
        return None;
    }
    let index = match over {
        DropTarget::Item(over_id) => board
            .column(target)
            .position(over_id)
            .unwrap_or(usize::MAX),
        DropTarget::Column(_) => usize::MAX,
    };
    board.move_to(active, target, index)
}

#[cfg(test)]
#[path = "tests/drag_tests.rs"]
mod tests;
