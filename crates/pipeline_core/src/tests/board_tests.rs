use super::*;
use chrono::Utc;
use shared::domain::UserId;

fn record(id: i64, status: PipelineStatus) -> ArtworkRecord {
    let now = Utc::now();
    ArtworkRecord {
        id: ArtworkId(id),
        user_id: UserId(7),
        title: format!("piece {id}"),
        medium: "ink".into(),
        price: None,
        due_date: None,
        description: None,
        image_url: None,
        status,
        created_at: now,
        updated_at: now,
    }
}

fn remote_ids(board: &Board, status: PipelineStatus) -> Vec<i64> {
    board
        .column(status)
        .items
        .iter()
        .filter_map(|item| item.remote_id.map(|id| id.0))
        .collect()
}

#[test]
fn from_records_groups_by_status_and_keeps_order() {
    let board = Board::from_records(
        &[
            record(3, PipelineStatus::Wip),
            record(1, PipelineStatus::Concept),
            record(2, PipelineStatus::Wip),
            record(4, PipelineStatus::Sold),
        ],
        None,
    );

    assert_eq!(board.len(), 4);
    assert_eq!(remote_ids(&board, PipelineStatus::Concept), vec![1]);
    assert_eq!(remote_ids(&board, PipelineStatus::Wip), vec![3, 2]);
    assert!(board.column(PipelineStatus::Finished).is_empty());
    assert_eq!(remote_ids(&board, PipelineStatus::Sold), vec![4]);
    assert!(board.is_consistent());
}

#[test]
fn columns_are_in_fixed_board_order() {
    let board = Board::new();
    let titles: Vec<_> = board.columns().iter().map(Column::title).collect();
    assert_eq!(titles, vec!["Concept", "In Progress", "Finished", "Sold"]);
}

#[test]
fn refetch_reuses_local_ids_by_remote_id() {
    let first = Board::from_records(&[record(1, PipelineStatus::Concept)], None);
    let local = first.find_by_remote(ArtworkId(1)).expect("local id");

    let second = Board::from_records(
        &[record(1, PipelineStatus::Finished), record(2, PipelineStatus::Concept)],
        Some(&first),
    );
    assert_eq!(second.find_by_remote(ArtworkId(1)), Some(local));
    assert_eq!(second.find_column(local), Some(PipelineStatus::Finished));
    assert_ne!(second.find_by_remote(ArtworkId(2)), Some(local));
}

#[test]
fn move_to_clamps_index_and_reports_landing_slot() {
    let mut board = Board::from_records(
        &[
            record(1, PipelineStatus::Concept),
            record(2, PipelineStatus::Wip),
            record(3, PipelineStatus::Wip),
        ],
        None,
    );
    let first = board.find_by_remote(ArtworkId(1)).expect("item");

    assert_eq!(board.move_to(first, PipelineStatus::Wip, 1), Some(1));
    assert_eq!(remote_ids(&board, PipelineStatus::Wip), vec![2, 1, 3]);

    assert_eq!(board.move_to(first, PipelineStatus::Sold, 99), Some(0));
    assert!(board.column(PipelineStatus::Wip).position(first).is_none());
    assert!(board.is_consistent());

    assert_eq!(board.move_to(LocalItemId::new(), PipelineStatus::Sold, 0), None);
}

#[test]
fn reorder_rejects_out_of_range_indices() {
    let mut board = Board::from_records(
        &[
            record(1, PipelineStatus::Concept),
            record(2, PipelineStatus::Concept),
            record(3, PipelineStatus::Concept),
        ],
        None,
    );

    assert!(board.reorder(PipelineStatus::Concept, 0, 2));
    assert_eq!(remote_ids(&board, PipelineStatus::Concept), vec![2, 3, 1]);
    assert!(!board.reorder(PipelineStatus::Concept, 0, 3));
    assert!(!board.reorder(PipelineStatus::Sold, 0, 0));
}

#[test]
fn duplicated_item_breaks_consistency() {
    let mut board = Board::from_records(&[record(1, PipelineStatus::Concept)], None);
    let item = board
        .column(PipelineStatus::Concept)
        .items
        .first()
        .cloned()
        .expect("item");
    board.push(PipelineStatus::Sold, item);
    assert!(!board.is_consistent());
}

#[test]
fn remove_and_submitting_flag() {
    let mut board = Board::from_records(&[record(5, PipelineStatus::Finished)], None);
    let item = board.find_by_remote(ArtworkId(5)).expect("item");

    assert!(board.set_submitting(item, true));
    assert!(board.item(item).is_some_and(|entry| entry.submitting));

    let (status, index, removed) = board.remove(item).expect("removed");
    assert_eq!((status, index), (PipelineStatus::Finished, 0));
    assert_eq!(removed.remote_id, Some(ArtworkId(5)));
    assert!(board.is_empty());
    assert!(!board.set_submitting(item, false));
}
