use std::fmt::Write as _;

use pipeline_core::{Board, DropOutcome, DropReport, PipelineItem, SyncResult};
use serde_json::{json, Value};
use shared::domain::PipelineStatus;

pub fn board_text(board: &Board) -> String {
    let mut out = String::new();
    for column in board.columns() {
        let _ = writeln!(out, "{} ({})", column.title(), column.len());
        if column.is_empty() {
            let _ = writeln!(out, "  -");
        }
        for item in &column.items {
            let _ = writeln!(out, "  {}", item_line(column.status, item));
        }
    }
    out
}

pub fn item_line(status: PipelineStatus, item: &PipelineItem) -> String {
    let mut line = match item.remote_id {
        Some(id) => format!("#{id} [{status}] {} ({})", item.title, item.medium),
        None => format!("#? [{status}] {} ({})", item.title, item.medium),
    };
    if let Some(price) = item.price {
        let _ = write!(line, " ${price:.2}");
    }
    if let Some(due) = item.due_date {
        let _ = write!(line, " due {due}");
    }
    line
}

pub fn board_json(board: &Board) -> Value {
    let columns: Vec<Value> = board
        .columns()
        .iter()
        .map(|column| {
            json!({
                "status": column.status,
                "title": column.title(),
                "color": column.color(),
                "items": column.items.iter().map(|item| json!({
                    "id": item.remote_id,
                    "title": item.title,
                    "medium": item.medium,
                    "price": item.price,
                    "due_date": item.due_date,
                    "description": item.description,
                    "image_url": item.image_url,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "columns": columns })
}

pub fn drop_report(report: &DropReport) -> String {
    let moved = match &report.outcome {
        DropOutcome::Ignored => "drag ignored".to_string(),
        DropOutcome::NoTarget { .. } => "dropped outside the board; placement kept".to_string(),
        DropOutcome::CrossColumn { from, to, to_index, .. } => {
            format!("moved {from} -> {to} at position {to_index}")
        }
        DropOutcome::Reordered {
            status,
            from_index,
            to_index,
            ..
        } => format!("reordered within {status}: {from_index} -> {to_index} (not stored)"),
        DropOutcome::Unchanged { status, .. } => format!("unchanged in {status}"),
    };
    let sync = match &report.sync {
        SyncResult::NotRequired => "no remote update".to_string(),
        SyncResult::SkippedMissingRemoteId => "skipped remote update (no artwork id)".to_string(),
        SyncResult::Persisted => "status saved".to_string(),
        SyncResult::Reconciled { error } => format!("status update failed, board restored: {error}"),
    };
    format!("{moved}; {sync}")
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
