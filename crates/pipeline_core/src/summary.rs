use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use shared::domain::PipelineStatus;

use crate::board::Board;

/// Dashboard figures derived from the current board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSummary {
    pub counts: BTreeMap<PipelineStatus, usize>,
    pub total_items: usize,
    /// Asking prices of everything not yet sold.
    pub pipeline_value: f64,
    pub sold_value: f64,
    /// Due before `today` and still in concept or wip.
    pub overdue: usize,
}

impl BoardSummary {
    pub fn from_board(board: &Board, today: NaiveDate) -> Self {
        let mut summary = Self {
            counts: PipelineStatus::ALL.iter().map(|status| (*status, 0)).collect(),
            total_items: 0,
            pipeline_value: 0.0,
            sold_value: 0.0,
            overdue: 0,
        };

        for column in board.columns() {
            summary.counts.insert(column.status, column.len());
            summary.total_items += column.len();
            for item in &column.items {
                let price = item.price.unwrap_or_default();
                if column.status == PipelineStatus::Sold {
                    summary.sold_value += price;
                } else {
                    summary.pipeline_value += price;
                }
                let open = matches!(column.status, PipelineStatus::Concept | PipelineStatus::Wip);
                if open && item.due_date.is_some_and(|due| due < today) {
                    summary.overdue += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
#[path = "tests/summary_tests.rs"]
mod tests;
