use super::*;
use chrono::Utc;
use shared::domain::{ArtworkRecord, UserId};

fn record(id: i64, status: PipelineStatus) -> ArtworkRecord {
    let now = Utc::now();
    ArtworkRecord {
        id: ArtworkId(id),
        user_id: UserId(1),
        title: format!("piece {id}"),
        medium: "charcoal".into(),
        price: None,
        due_date: None,
        description: None,
        image_url: None,
        status,
        created_at: now,
        updated_at: now,
    }
}

fn sample_board() -> Board {
    Board::from_records(
        &[
            record(1, PipelineStatus::Concept),
            record(2, PipelineStatus::Concept),
            record(3, PipelineStatus::Wip),
            record(4, PipelineStatus::Wip),
        ],
        None,
    )
}

fn local(board: &Board, remote: i64) -> LocalItemId {
    board.find_by_remote(ArtworkId(remote)).expect("item on board")
}

fn order(board: &Board, status: PipelineStatus) -> Vec<i64> {
    board
        .column(status)
        .items
        .iter()
        .filter_map(|item| item.remote_id.map(|id| id.0))
        .collect()
}

#[test]
fn drag_start_ignores_unknown_items() {
    let board = sample_board();
    let mut drag = DragCoordinator::new();
    assert!(!drag.drag_start(&board, LocalItemId::new()));
    assert_eq!(drag.phase(), DragPhase::Idle);
}

#[test]
fn drag_over_moves_item_to_hovered_slot() {
    let mut board = sample_board();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 1);
    let over = local(&board, 4);

    assert!(drag.drag_start(&board, active));
    assert!(drag.drag_over(&mut board, active, DropTarget::Item(over)));
    assert_eq!(order(&board, PipelineStatus::Wip), vec![3, 1, 4]);
    assert_eq!(order(&board, PipelineStatus::Concept), vec![2]);

    // Hovering inside the column it already sits in changes nothing.
    assert!(!drag.drag_over(&mut board, active, DropTarget::Column(PipelineStatus::Wip)));
    assert!(board.is_consistent());
}

#[test]
fn drag_over_empty_column_appends() {
    let mut board = sample_board();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 2);

    drag.drag_start(&board, active);
    assert!(drag.drag_over(&mut board, active, DropTarget::Column(PipelineStatus::Sold)));
    assert_eq!(order(&board, PipelineStatus::Sold), vec![2]);
}

#[test]
fn drag_over_for_other_item_is_ignored() {
    let mut board = sample_board();
    let before = board.clone();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 1);
    let stray = local(&board, 2);

    drag.drag_start(&board, active);
    assert!(!drag.drag_over(&mut board, stray, DropTarget::Column(PipelineStatus::Sold)));
    assert_eq!(board, before);
}

#[test]
fn cross_column_drop_reports_source_and_target() {
    let mut board = sample_board();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 1);

    drag.drag_start(&board, active);
    drag.drag_over(&mut board, active, DropTarget::Column(PipelineStatus::Wip));
    let outcome = drag.drag_end(
        &mut board,
        active,
        Some(DropTarget::Column(PipelineStatus::Wip)),
    );

    assert_eq!(
        outcome,
        DropOutcome::CrossColumn {
            item: active,
            remote_id: Some(ArtworkId(1)),
            from: PipelineStatus::Concept,
            to: PipelineStatus::Wip,
            from_index: 0,
            to_index: 2,
        }
    );
    assert!(!drag.is_dragging());
}

#[test]
fn drop_without_prior_drag_over_still_moves() {
    let mut board = sample_board();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 2);
    let over = local(&board, 3);

    drag.drag_start(&board, active);
    let outcome = drag.drag_end(&mut board, active, Some(DropTarget::Item(over)));

    assert!(matches!(
        outcome,
        DropOutcome::CrossColumn {
            to: PipelineStatus::Wip,
            to_index: 0,
            ..
        }
    ));
    assert_eq!(order(&board, PipelineStatus::Wip), vec![2, 3, 4]);
}

#[test]
fn same_column_drop_on_item_reorders() {
    let mut board = sample_board();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 1);
    let over = local(&board, 2);

    drag.drag_start(&board, active);
    let outcome = drag.drag_end(&mut board, active, Some(DropTarget::Item(over)));

    assert_eq!(
        outcome,
        DropOutcome::Reordered {
            item: active,
            status: PipelineStatus::Concept,
            from_index: 0,
            to_index: 1,
        }
    );
    assert_eq!(order(&board, PipelineStatus::Concept), vec![2, 1]);
}

#[test]
fn drop_on_own_column_is_unchanged() {
    let mut board = sample_board();
    let before = board.clone();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 3);

    drag.drag_start(&board, active);
    let outcome = drag.drag_end(
        &mut board,
        active,
        Some(DropTarget::Column(PipelineStatus::Wip)),
    );
    assert_eq!(
        outcome,
        DropOutcome::Unchanged {
            item: active,
            status: PipelineStatus::Wip,
        }
    );
    assert_eq!(board, before);
}

#[test]
fn drop_outside_keeps_last_drag_over_placement() {
    let mut board = sample_board();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 1);

    drag.drag_start(&board, active);
    drag.drag_over(&mut board, active, DropTarget::Column(PipelineStatus::Finished));
    let placed = board.clone();

    let outcome = drag.drag_end(&mut board, active, None);
    assert_eq!(outcome, DropOutcome::NoTarget { item: active });
    assert_eq!(board, placed);
    assert_eq!(board.find_column(active), Some(PipelineStatus::Finished));
}

#[test]
fn drop_on_vanished_item_counts_as_no_target() {
    let mut board = sample_board();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 1);

    drag.drag_start(&board, active);
    let outcome = drag.drag_end(&mut board, active, Some(DropTarget::Item(LocalItemId::new())));
    assert_eq!(outcome, DropOutcome::NoTarget { item: active });
}

#[test]
fn end_without_start_is_ignored() {
    let mut board = sample_board();
    let mut drag = DragCoordinator::new();
    let active = local(&board, 1);
    assert_eq!(
        drag.drag_end(&mut board, active, Some(DropTarget::Column(PipelineStatus::Sold))),
        DropOutcome::Ignored
    );

    drag.drag_start(&board, active);
    drag.cancel();
    assert_eq!(
        drag.drag_end(&mut board, active, Some(DropTarget::Column(PipelineStatus::Sold))),
        DropOutcome::Ignored
    );
    assert_eq!(board.find_column(active), Some(PipelineStatus::Concept));
}

#[test]
fn arbitrary_drag_over_sequences_keep_board_consistent() {
    let mut board = sample_board();
    let ids: Vec<_> = (1..=4).map(|remote| local(&board, remote)).collect();
    let mut drag = DragCoordinator::new();

    // Deterministic pseudo-random walk over targets.
    let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed
    };

    for _ in 0..200 {
        let active = ids[(next() % ids.len() as u64) as usize];
        drag.drag_start(&board, active);
        for _ in 0..(next() % 6) {
            let over = if next() % 2 == 0 {
                DropTarget::Column(PipelineStatus::ALL[(next() % 4) as usize])
            } else {
                DropTarget::Item(ids[(next() % ids.len() as u64) as usize])
            };
            drag.drag_over(&mut board, active, over);
            assert!(board.is_consistent());
            assert_eq!(board.len(), 4);
        }
        let over = match next() % 3 {
            0 => None,
            1 => Some(DropTarget::Column(PipelineStatus::ALL[(next() % 4) as usize])),
            _ => Some(DropTarget::Item(ids[(next() % ids.len() as u64) as usize])),
        };
        drag.drag_end(&mut board, active, over);
        assert!(board.is_consistent());
        assert_eq!(board.len(), 4);
    }
}
