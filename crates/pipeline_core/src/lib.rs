use std::sync::Arc;

use chrono::NaiveDate;
use shared::{
    domain::{ArtworkId, PipelineStatus, UserId},
    protocol::{ArtworkFields, ArtworkFilter, ArtworkPatch},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod backend;
pub mod board;
pub mod drag;
pub mod error;
pub mod intents;
pub mod session;
pub mod summary;

pub use backend::{ArtworkBackend, HttpArtworkBackend, MissingArtworkBackend};
pub use board::{Board, Column, LocalItemId, PipelineItem};
pub use drag::{DragCoordinator, DragPhase, DropOutcome, DropTarget};
pub use error::{PipelineError, PipelineResult};
pub use intents::{IntentLog, StatusIntent};
pub use session::SessionState;
pub use summary::BoardSummary;

pub const DEFAULT_LIST_LIMIT: u32 = 500;

/// How a rejected status update is repaired locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Refetch the whole board, discarding every speculative change.
    #[default]
    FullResync,
    /// Move back only the item whose update failed.
    RevertIntent,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub list_limit: u32,
    pub reconcile_mode: ReconcileMode,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            list_limit: DEFAULT_LIST_LIMIT,
            reconcile_mode: ReconcileMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    SessionChanged(SessionState),
    BoardReplaced(Board),
    ItemPlaced {
        item: LocalItemId,
        status: PipelineStatus,
    },
    ItemRemoved {
        item: LocalItemId,
    },
    SubmittingChanged {
        item: LocalItemId,
        submitting: bool,
    },
    Notification(Notification),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    NotRequired,
    SkippedMissingRemoteId,
    Persisted,
    /// The update was rejected and local state was repaired.
    Reconciled { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropReport {
    pub outcome: DropOutcome,
    pub sync: SyncResult,
}

pub struct PipelineClient {
    backend: Arc<dyn ArtworkBackend>,
    options: PipelineOptions,
    session: Mutex<SessionState>,
    board: Mutex<Board>,
    drag: Mutex<DragCoordinator>,
    intents: Mutex<IntentLog>,
    events: broadcast::Sender<PipelineEvent>,
}

impl PipelineClient {
    pub fn new(backend: Arc<dyn ArtworkBackend>) -> Arc<Self> {
        Self::new_with_options(backend, PipelineOptions::default())
    }

    pub fn new_with_options(
        backend: Arc<dyn ArtworkBackend>,
        options: PipelineOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            backend,
            options,
            session: Mutex::new(SessionState::default()),
            board: Mutex::new(Board::default()),
            drag: Mutex::new(DragCoordinator::new()),
            intents: Mutex::new(IntentLog::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.lock().await.clone()
    }

    pub async fn board(&self) -> Board {
        self.board.lock().await.clone()
    }

    pub async fn summary(&self, today: NaiveDate) -> BoardSummary {
        BoardSummary::from_board(&*self.board.lock().await, today)
    }

    pub async fn pending_intents(&self) -> Vec<StatusIntent> {
        self.intents.lock().await.pending().to_vec()
    }

    /// Loads the user's profile and, once it exists, the board.
    pub async fn begin_session(&self, user_id: UserId) -> PipelineResult<SessionState> {
        {
            let mut session = self.session.lock().await;
            session.begin(user_id);
            self.emit(PipelineEvent::SessionChanged(session.clone()));
        }
        info!(user_id = user_id.0, "loading profile");

        let lookup = self.backend.load_profile(user_id).await;
        let state = {
            let mut session = self.session.lock().await;
            let applied = match &lookup {
                Ok(profile) => session.complete(user_id, profile.clone()),
                Err(_) => session.fail(user_id),
            };
            if applied {
                self.emit(PipelineEvent::SessionChanged(session.clone()));
            } else {
                debug!(user_id = user_id.0, "discarding stale profile lookup");
            }
            session.clone()
        };

        if let Err(err) = lookup {
            warn!(user_id = user_id.0, error = %err, "profile lookup failed");
            return Err(PipelineError::Backend(err));
        }

        match &state {
            SessionState::Ready { .. } => {
                info!(user_id = user_id.0, "session ready");
                self.fetch_board().await?;
            }
            SessionState::NoProfile { .. } => {
                info!(user_id = user_id.0, "user has no profile yet");
            }
            _ => {}
        }
        Ok(state)
    }

    pub async fn end_session(&self) {
        self.session.lock().await.reset();
        *self.board.lock().await = Board::default();
        self.drag.lock().await.cancel();
        self.intents.lock().await.clear();
        self.emit(PipelineEvent::SessionChanged(SessionState::Uninitialized));
    }

    /// Replaces the local board with the remote state.
    pub async fn fetch_board(&self) -> PipelineResult<Board> {
        let user_id = self.ready_user().await?;
        let list = self
            .backend
            .list(user_id, &ArtworkFilter::default(), self.options.list_limit)
            .await?;

        let board = {
            let mut board = self.board.lock().await;
            *board = Board::from_records(&list.data, Some(&board));
            board.clone()
        };
        info!(user_id = user_id.0, items = board.len(), "board fetched");
        self.emit(PipelineEvent::BoardReplaced(board.clone()));
        Ok(board)
    }

    pub async fn create_item(&self, fields: ArtworkFields) -> PipelineResult<LocalItemId> {
        let user_id = self.ready_user().await?;
        let record = self.backend.create(user_id, &fields).await?;
        let local_id = LocalItemId::new();
        self.board
            .lock()
            .await
            .push(record.status, PipelineItem::from_record(local_id, &record));
        info!(artwork_id = record.id.0, status = %record.status, "artwork created");
        self.emit(PipelineEvent::ItemPlaced {
            item: local_id,
            status: record.status,
        });
        Ok(local_id)
    }

    pub async fn update_item(&self, item: LocalItemId, patch: ArtworkPatch) -> PipelineResult<()> {
        let remote_id = self.begin_submit(item).await?;
        let result = self.backend.update(remote_id, &patch).await;

        let placed = {
            let mut board = self.board.lock().await;
            board.set_submitting(item, false);
            match &result {
                Ok(record) => {
                    let current = board.find_column(item);
                    if let Some(entry) = board.item_mut(item) {
                        entry.apply_record(record);
                    }
                    if current.is_some_and(|status| status != record.status) {
                        board.move_to(item, record.status, usize::MAX);
                    }
                    current.map(|_| record.status)
                }
                Err(_) => None,
            }
        };
        self.emit(PipelineEvent::SubmittingChanged {
            item,
            submitting: false,
        });

        let record = result?;
        debug!(artwork_id = record.id.0, "artwork updated");
        if let Some(status) = placed {
            self.emit(PipelineEvent::ItemPlaced { item, status });
        }
        Ok(())
    }

    pub async fn delete_item(&self, item: LocalItemId) -> PipelineResult<()> {
        let remote_id = self.begin_submit(item).await?;
        if let Err(err) = self.backend.delete(remote_id).await {
            self.board.lock().await.set_submitting(item, false);
            self.emit(PipelineEvent::SubmittingChanged {
                item,
                submitting: false,
            });
            return Err(err.into());
        }

        self.board.lock().await.remove(item);
        info!(artwork_id = remote_id.0, "artwork deleted");
        self.emit(PipelineEvent::ItemRemoved { item });
        Ok(())
    }

    pub async fn drag_start(&self, active: LocalItemId) -> bool {
        let board = self.board.lock().await;
        self.drag.lock().await.drag_start(&board, active)
    }

    pub async fn drag_over(&self, active: LocalItemId, over: DropTarget) -> bool {
        let mut board = self.board.lock().await;
        let moved = self.drag.lock().await.drag_over(&mut board, active, over);
        if moved {
            if let Some(status) = board.find_column(active) {
                self.emit(PipelineEvent::ItemPlaced {
                    item: active,
                    status,
                });
            }
        }
        moved
    }

    pub async fn drag_cancel(&self) {
        self.drag.lock().await.cancel();
    }

    /// Finishes the gesture and persists a column change, if any.
    pub async fn drag_end(
        &self,
        active: LocalItemId,
        over: Option<DropTarget>,
    ) -> PipelineResult<DropReport> {
        let outcome = {
            let mut board = self.board.lock().await;
            let outcome = self.drag.lock().await.drag_end(&mut board, active, over);
            if let DropOutcome::CrossColumn {
                item,
                remote_id: Some(_),
                ..
            } = &outcome
            {
                board.set_submitting(*item, true);
            }
            outcome
        };

        let sync = match &outcome {
            DropOutcome::CrossColumn {
                item,
                remote_id: Some(remote_id),
                from,
                to,
                from_index,
                ..
            } => {
                self.emit(PipelineEvent::ItemPlaced {
                    item: *item,
                    status: *to,
                });
                self.persist_status(*item, *remote_id, *from, *to, *from_index)
                    .await?
            }
            DropOutcome::CrossColumn {
                item,
                remote_id: None,
                to,
                ..
            } => {
                debug!(%item, %to, "dropped item has no remote id; keeping local move only");
                SyncResult::SkippedMissingRemoteId
            }
            DropOutcome::Reordered {
                item,
                status,
                from_index,
                to_index,
            } => {
                debug!(%item, %status, from_index, to_index, "reordered within column");
                SyncResult::NotRequired
            }
            _ => SyncResult::NotRequired,
        };

        Ok(DropReport { outcome, sync })
    }

    async fn persist_status(
        &self,
        item: LocalItemId,
        remote_id: ArtworkId,
        from: PipelineStatus,
        to: PipelineStatus,
        from_index: usize,
    ) -> PipelineResult<SyncResult> {
        let intent = self
            .intents
            .lock()
            .await
            .record(item, remote_id, from, to, from_index);
        self.emit(PipelineEvent::SubmittingChanged {
            item,
            submitting: true,
        });
        info!(artwork_id = remote_id.0, %from, %to, seq = intent.seq, "updating artwork status");

        let result = self.backend.update_status(remote_id, to).await;
        self.board.lock().await.set_submitting(item, false);
        self.emit(PipelineEvent::SubmittingChanged {
            item,
            submitting: false,
        });

        let err = match result {
            Ok(()) => {
                self.intents.lock().await.resolve(intent.seq);
                return Ok(SyncResult::Persisted);
            }
            Err(err) => err,
        };

        let error = format!("{err:#}");
        warn!(artwork_id = remote_id.0, %to, %error, "artwork status update failed");
        self.emit(PipelineEvent::Notification(Notification {
            level: NotificationLevel::Error,
            message: format!("Could not move artwork to {}: {error}", to.title()),
        }));

        match self.options.reconcile_mode {
            ReconcileMode::FullResync => {
                self.intents.lock().await.discard(intent.seq);
                if let Err(fetch_err) = self.fetch_board().await {
                    warn!(error = %fetch_err, "board refetch after sync failure failed");
                    return Err(PipelineError::Reconcile {
                        sync_error: error,
                        source: anyhow::Error::new(fetch_err),
                    });
                }
                info!(artwork_id = remote_id.0, "board resynced after failed status update");
            }
            ReconcileMode::RevertIntent => {
                let reverted = {
                    let mut intents = self.intents.lock().await;
                    intents.discard(intent.seq);
                    let mut board = self.board.lock().await;
                    intents::revert(&mut board, &intents, &intent)
                };
                if reverted {
                    info!(artwork_id = remote_id.0, status = %from, "reverted failed status change");
                    self.emit(PipelineEvent::ItemPlaced { item, status: from });
                }
            }
        }

        Ok(SyncResult::Reconciled { error })
    }

    async fn ready_user(&self) -> PipelineResult<UserId> {
        let session = self.session.lock().await;
        session
            .ready_user()
            .ok_or(PipelineError::SessionNotReady(session.label()))
    }

    async fn begin_submit(&self, item: LocalItemId) -> PipelineResult<ArtworkId> {
        let remote_id = {
            let mut board = self.board.lock().await;
            let entry = board
                .item_mut(item)
                .ok_or(PipelineError::UnknownItem(item))?;
            let remote_id = entry.remote_id.ok_or(PipelineError::MissingRemoteId(item))?;
            entry.submitting = true;
            remote_id
        };
        self.emit(PipelineEvent::SubmittingChanged {
            item,
            submitting: true,
        });
        Ok(remote_id)
    }

    fn emit(&self, event: PipelineEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
