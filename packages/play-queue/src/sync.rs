//! Queue synchronizer task
//!
//! One task owns the held snapshot and every piece of sync state. Host
//! requests, player notifications and completions of the remote calls the
//! task spawned all arrive on channels and are handled one at a time, so no
//! state is shared or locked.
//!
//! Remote calls never block the loop: each is spawned and reports back on an
//! internal channel tagged with the epoch it was issued under. Results from a
//! previous player (older epoch) are dropped on arrival.

use std::sync::Arc;

use lms_remote_shared_config::QueueConfig;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::debounce::Debouncer;
use crate::error::{QueueError, QueueResult};
use crate::events::{PlayerEvent, QUEUE_ROUTE};
use crate::item::{ItemAction, QueueItem};
use crate::remote::{PlayerCommand, QueueRemote};
use crate::scroll::{ScrollMetrics, ScrollState};
use crate::snapshot::{ChangeTimestamp, QueuePage, QueueSnapshot};
use crate::view::{QueueSignal, QueueView, SyncPhase};

/// Capacity of the host request channel
const INPUT_CHANNEL_CAPACITY: usize = 64;

pub const SAVE_FAILED_NOTICE: &str = "Failed to save play queue";
pub const CLEAR_FAILED_NOTICE: &str = "Failed to clear play queue";

type Reply<T> = oneshot::Sender<QueueResult<T>>;

/// Requests from the host
enum Input {
    Scrolled(ScrollMetrics),
    Reload,
    ScrollToCurrent,
    Reorder {
        from: usize,
        to: usize,
        reply: Reply<()>,
    },
    ItemAction {
        action: ItemAction,
        index: usize,
        reply: Reply<()>,
    },
    OpenSaveDialog {
        reply: Reply<bool>,
    },
    SaveDialogResponse {
        name: Option<String>,
        reply: Reply<()>,
    },
    Clear {
        reply: Reply<()>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    /// Next page at the held offset
    Append,
    /// Offset 0, replacing everything held
    Reload,
}

/// Completions reported back to the task
enum Internal {
    PageLoaded {
        epoch: u64,
        kind: FetchKind,
        known_at_issue: ChangeTimestamp,
        scroll_at_issue: f64,
        result: QueueResult<QueuePage>,
    },
    DebounceElapsed(u64),
    DurationLoaded {
        epoch: u64,
        result: QueueResult<f64>,
    },
    CommandDone {
        command: PlayerCommand,
        result: QueueResult<()>,
    },
}

/// Cloneable front end for sending host requests to the synchronizer
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<Input>,
}

impl QueueHandle {
    /// Report the current scroll geometry; may trigger the next page fetch
    pub async fn report_scroll(&self, metrics: ScrollMetrics) -> QueueResult<()> {
        self.send(Input::Scrolled(metrics)).await
    }

    /// Force a full reload of the held prefix
    pub async fn reload(&self) -> QueueResult<()> {
        self.send(Input::Reload).await
    }

    pub async fn scroll_to_current(&self) -> QueueResult<()> {
        self.send(Input::ScrollToCurrent).await
    }

    /// Move the entry at `from` to `to` after a drag gesture
    pub async fn reorder(&self, from: usize, to: usize) -> QueueResult<()> {
        self.request(|reply| Input::Reorder { from, to, reply })
            .await
    }

    pub async fn item_action(&self, action: ItemAction, index: usize) -> QueueResult<()> {
        self.request(|reply| Input::ItemAction {
            action,
            index,
            reply,
        })
        .await
    }

    /// Returns whether the dialog opened; it stays closed for an empty queue
    pub async fn open_save_dialog(&self) -> QueueResult<bool> {
        self.request(|reply| Input::OpenSaveDialog { reply }).await
    }

    /// Answer the save dialog; `None` cancels it
    pub async fn respond_save_dialog(&self, name: Option<String>) -> QueueResult<()> {
        self.request(|reply| Input::SaveDialogResponse { name, reply })
            .await
    }

    /// Remove every entry from the queue
    pub async fn clear(&self) -> QueueResult<()> {
        self.request(|reply| Input::Clear { reply }).await
    }

    async fn send(&self, input: Input) -> QueueResult<()> {
        self.tx.send(input).await.map_err(|_| QueueError::Closed)
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Input) -> QueueResult<T> {
        let (reply, rx) = oneshot::channel();
        self.send(make(reply)).await?;
        rx.await.map_err(|_| QueueError::Closed)?
    }
}

/// Everything the host keeps after spawning a synchronizer
pub struct QueueSync {
    pub handle: QueueHandle,
    pub view: watch::Receiver<QueueView>,
    pub signals: mpsc::UnboundedReceiver<QueueSignal>,
    pub cancellation_token: CancellationToken,
    pub join_handle: JoinHandle<()>,
}

/// Spawn a synchronizer for `player_id`, driven by `events`
///
/// The task ends when `cancellation_token` is cancelled or every
/// [`QueueHandle`] is dropped; the pending refresh timer is cancelled and the
/// final view is published with [`SyncPhase::Terminated`].
pub fn spawn_queue_sync<R: QueueRemote>(
    remote: Arc<R>,
    player_id: Option<String>,
    config: QueueConfig,
    events: broadcast::Receiver<PlayerEvent>,
) -> QueueSync {
    let (tx, inputs) = mpsc::channel::<Input>(INPUT_CHANNEL_CAPACITY);
    let (internal_tx, internal_rx) = mpsc::unbounded_channel::<Internal>();
    let (signal_tx, signals) = mpsc::unbounded_channel();
    let (view_tx, view) = watch::channel(QueueView::default());
    let cancellation_token = CancellationToken::new();

    let synchronizer = QueueSynchronizer {
        debouncer: Debouncer::new(
            config.debounce(),
            internal_tx.clone(),
            Internal::DebounceElapsed,
        ),
        remote,
        player_id,
        config,
        snapshot: QueueSnapshot::default(),
        shown: Arc::new(Vec::new()),
        known_timestamp: ChangeTimestamp::default(),
        current_index: None,
        duration_secs: 0.0,
        fetching: false,
        reload_deferred: false,
        discarded_len: 0,
        discarded_total: 0,
        epoch: 0,
        save_dialog_open: false,
        terminated: false,
        scroll: ScrollState::default(),
        internal_tx,
        view_tx,
        signal_tx,
    };

    let task_token = cancellation_token.clone();
    let join_handle = tokio::spawn(synchronizer.run(inputs, internal_rx, events, task_token));

    QueueSync {
        handle: QueueHandle { tx },
        view,
        signals,
        cancellation_token,
        join_handle,
    }
}

struct QueueSynchronizer<R: QueueRemote> {
    remote: Arc<R>,
    player_id: Option<String>,
    config: QueueConfig,

    snapshot: QueueSnapshot,
    /// Published list; kept after a stale discard until the reload lands
    shown: Arc<Vec<QueueItem>>,
    known_timestamp: ChangeTimestamp,
    current_index: Option<usize>,
    duration_secs: f64,

    fetching: bool,
    reload_deferred: bool,
    /// Items dropped by the last stale page, used to size the reload
    discarded_len: usize,
    /// Server total seen before the last stale page, published until a reload lands
    discarded_total: usize,
    epoch: u64,
    save_dialog_open: bool,
    terminated: bool,

    scroll: ScrollState,
    debouncer: Debouncer<Internal>,

    internal_tx: mpsc::UnboundedSender<Internal>,
    view_tx: watch::Sender<QueueView>,
    signal_tx: mpsc::UnboundedSender<QueueSignal>,
}

impl<R: QueueRemote> QueueSynchronizer<R> {
    async fn run(
        mut self,
        mut inputs: mpsc::Receiver<Input>,
        mut internal_rx: mpsc::UnboundedReceiver<Internal>,
        mut events: broadcast::Receiver<PlayerEvent>,
        token: CancellationToken,
    ) {
        let mut events_open = true;
        info!(player_id = ?self.player_id, "Queue synchronizer started");

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("Queue synchronizer cancelled");
                    break;
                }
                input = inputs.recv() => {
                    match input {
                        Some(input) => self.handle_input(input),
                        None => {
                            info!("Queue handles dropped");
                            break;
                        }
                    }
                }
                Some(message) = internal_rx.recv() => self.handle_internal(message),
                event = events.recv(), if events_open => {
                    match event {
                        Ok(event) => self.handle_event(event),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Player events lagged, refreshing queue");
                            self.schedule_refresh();
                        }
                        Err(RecvError::Closed) => {
                            debug!("Player event bus closed");
                            events_open = false;
                        }
                    }
                }
            }
            self.publish();
        }

        self.debouncer.cancel();
        self.terminated = true;
        self.publish();
        info!("Queue synchronizer ended");
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Scrolled(metrics) => {
                self.scroll.last_top = metrics.scroll_top;
                if self.fetching
                    || self.debouncer.is_pending()
                    || !metrics.is_near_bottom(self.config.near_bottom_px)
                {
                    return;
                }
                if self.snapshot.is_empty() && self.discarded_len > 0 {
                    // A stale page was dropped and its reload failed
                    self.reload_all();
                } else if self.snapshot.has_more() {
                    self.fetch_page();
                }
            }
            Input::Reload => self.reload_all(),
            Input::ScrollToCurrent => self.scroll_to_current(),
            Input::Reorder { from, to, reply } => {
                let _ = reply.send(self.apply_reorder(from, to));
            }
            Input::ItemAction {
                action,
                index,
                reply,
            } => {
                let _ = reply.send(self.apply_item_action(action, index));
            }
            Input::OpenSaveDialog { reply } => {
                self.save_dialog_open = !self.shown.is_empty();
                let _ = reply.send(Ok(self.save_dialog_open));
            }
            Input::SaveDialogResponse { name, reply } => {
                let _ = reply.send(self.respond_save_dialog(name));
            }
            Input::Clear { reply } => {
                let _ = reply.send(self.clear());
            }
        }
    }

    fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::PlayerChanged(player_id) => self.reset_for_player(player_id),
            PlayerEvent::PlaylistDetails {
                current_index,
                timestamp,
            } => {
                let index_changed = current_index != self.current_index;
                self.current_index = current_index;

                if timestamp != self.known_timestamp {
                    debug!(timestamp = %timestamp, "Queue timestamp changed");
                    self.known_timestamp = timestamp;
                    self.schedule_refresh();
                } else if index_changed && self.config.auto_scroll {
                    self.scroll_to_current();
                }
            }
            PlayerEvent::RouteChanged {
                from,
                to,
                scroll_pos,
            } => {
                self.scroll.is_visible = to == QUEUE_ROUTE;
                if self.scroll.is_visible {
                    if self.config.auto_scroll && self.scroll.auto_scroll_required {
                        self.scroll_to_current();
                    } else if let Some(pos) = self.scroll.previous_pos {
                        self.signal(QueueSignal::RestoreScroll(pos.max(0.0)));
                    }
                } else if from == QUEUE_ROUTE {
                    self.scroll.previous_pos = Some(scroll_pos);
                }
            }
            PlayerEvent::VisibilityChanged(visible) => {
                self.scroll.is_visible = visible;
                if visible && self.config.auto_scroll && self.scroll.auto_scroll_required {
                    self.scroll_to_current();
                }
            }
        }
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::PageLoaded {
                epoch,
                kind,
                known_at_issue,
                scroll_at_issue,
                result,
            } => {
                if epoch != self.epoch {
                    debug!(epoch, "Ignoring page for previous player");
                    return;
                }
                self.fetching = false;
                match result {
                    Ok(page) => self.ingest_page(kind, known_at_issue, scroll_at_issue, page),
                    Err(e) => warn!(error = %e, kind = ?kind, "Queue fetch failed"),
                }
                if std::mem::take(&mut self.reload_deferred) {
                    self.reload_all();
                }
            }
            Internal::DebounceElapsed(generation) => {
                if self.debouncer.take_fired(generation) {
                    self.reload_all();
                }
            }
            Internal::DurationLoaded { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                match result {
                    Ok(duration) => self.duration_secs = duration,
                    Err(e) => warn!(error = %e, "Failed to read queue duration"),
                }
            }
            Internal::CommandDone { command, result } => {
                if let Err(e) = result {
                    match command {
                        PlayerCommand::Save(_) => {
                            warn!(error = %e, "Failed to save play queue");
                            self.signal(QueueSignal::Notice(SAVE_FAILED_NOTICE.to_string()));
                        }
                        PlayerCommand::Clear => {
                            warn!(error = %e, "Failed to clear play queue");
                            self.signal(QueueSignal::Notice(CLEAR_FAILED_NOTICE.to_string()));
                        }
                        other => warn!(error = %e, command = ?other, "Queue command failed"),
                    }
                }
            }
        }
    }

    fn ingest_page(
        &mut self,
        kind: FetchKind,
        known_at_issue: ChangeTimestamp,
        scroll_at_issue: f64,
        page: QueuePage,
    ) {
        let notified_meanwhile =
            self.known_timestamp != known_at_issue && self.known_timestamp != page.timestamp;
        let mismatched_append = kind == FetchKind::Append
            && !self.snapshot.is_empty()
            && page.timestamp != *self.snapshot.timestamp();

        if notified_meanwhile || mismatched_append {
            self.discarded_total = self.discarded_total.max(self.snapshot.total_count());
            let discarded = self.snapshot.discard();
            self.discarded_len = self.discarded_len.max(discarded);
            self.reload_deferred = false;
            debug!(
                discarded,
                page_timestamp = %page.timestamp,
                "Queue changed while paging, discarding held items"
            );
            self.schedule_refresh();
            return;
        }

        let was_empty = self.shown.is_empty();
        match kind {
            FetchKind::Append => self.snapshot.append(page),
            FetchKind::Reload => self.snapshot.replace(page),
        }
        self.discarded_len = 0;
        self.discarded_total = 0;
        self.known_timestamp = self.snapshot.timestamp().clone();
        self.shown = Arc::new(self.snapshot.items().to_vec());

        debug!(
            held = self.snapshot.len(),
            total = self.snapshot.total_count(),
            kind = ?kind,
            "Queue updated"
        );

        if kind == FetchKind::Reload || was_empty != self.snapshot.is_empty() {
            self.compute_total_duration();
        }
        match kind {
            FetchKind::Reload => {
                self.signal(QueueSignal::RestoreScroll(scroll_at_issue.max(0.0)));
            }
            FetchKind::Append if was_empty && self.config.auto_scroll => {
                self.scroll_to_current();
            }
            FetchKind::Append => {}
        }
    }

    fn fetch_page(&mut self) {
        if self.fetching {
            return;
        }
        let offset = self.snapshot.len();
        let limit = self.config.page_size;
        self.spawn_fetch(FetchKind::Append, offset, limit);
    }

    fn schedule_refresh(&mut self) {
        self.debouncer.schedule();
    }

    fn reload_all(&mut self) {
        if self.fetching {
            self.reload_deferred = true;
            return;
        }
        let held = self.snapshot.len().max(self.discarded_len);
        if held == 0 {
            self.fetch_page();
            return;
        }
        let limit = held.max(self.config.reload_min);
        self.spawn_fetch(FetchKind::Reload, 0, limit);
    }

    fn spawn_fetch(&mut self, kind: FetchKind, offset: usize, limit: usize) {
        let Some(player_id) = self.player_id.clone() else {
            debug!("No player selected, skipping queue fetch");
            return;
        };
        self.fetching = true;

        let remote = Arc::clone(&self.remote);
        let tx = self.internal_tx.clone();
        let epoch = self.epoch;
        let known_at_issue = self.known_timestamp.clone();
        let scroll_at_issue = self.scroll.last_top;
        debug!(offset, limit, kind = ?kind, "Fetching queue");

        tokio::spawn(async move {
            let result = remote.query_page(&player_id, offset, limit).await;
            let _ = tx.send(Internal::PageLoaded {
                epoch,
                kind,
                known_at_issue,
                scroll_at_issue,
                result,
            });
        });
    }

    fn compute_total_duration(&mut self) {
        if self.snapshot.is_empty() {
            self.duration_secs = 0.0;
            return;
        }
        let Some(player_id) = self.player_id.clone() else {
            return;
        };
        let remote = Arc::clone(&self.remote);
        let tx = self.internal_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = remote.playlist_duration(&player_id).await;
            let _ = tx.send(Internal::DurationLoaded { epoch, result });
        });
    }

    fn apply_reorder(&mut self, from: usize, to: usize) -> QueueResult<()> {
        let held = self.shown.len();
        if from == to || from >= held || to >= held {
            return Err(QueueError::InvalidInput(format!(
                "cannot move {} to {} in a list of {}",
                from, to, held
            )));
        }
        self.issue(PlayerCommand::Move { from, to })
    }

    fn apply_item_action(&mut self, action: ItemAction, index: usize) -> QueueResult<()> {
        if index >= self.shown.len() {
            return Err(QueueError::InvalidInput(format!(
                "index {} is outside the {} held items",
                index,
                self.shown.len()
            )));
        }
        let command = match action {
            ItemAction::PlayNow => PlayerCommand::Index(index),
            ItemAction::PlayNext => {
                if self.current_index == Some(index) {
                    return Ok(());
                }
                PlayerCommand::Move {
                    from: index,
                    to: self.current_index.map_or(0, |current| current + 1),
                }
            }
            ItemAction::Remove => PlayerCommand::Delete(index),
        };
        self.issue(command)
    }

    fn respond_save_dialog(&mut self, name: Option<String>) -> QueueResult<()> {
        let Some(name) = name else {
            self.save_dialog_open = false;
            return Ok(());
        };
        if !self.save_dialog_open {
            return Err(QueueError::InvalidInput("save dialog is not open".to_string()));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(QueueError::InvalidInput("playlist name is empty".to_string()));
        }
        self.save_dialog_open = false;
        self.issue(PlayerCommand::Save(name.to_string()))
    }

    fn clear(&mut self) -> QueueResult<()> {
        if self.shown.is_empty() {
            return Ok(());
        }
        self.issue(PlayerCommand::Clear)
    }

    fn issue(&mut self, command: PlayerCommand) -> QueueResult<()> {
        let player_id = self
            .player_id
            .clone()
            .ok_or_else(|| QueueError::InvalidInput("no player selected".to_string()))?;
        debug!(command = ?command, "Issuing queue command");

        let remote = Arc::clone(&self.remote);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = remote.issue_command(&player_id, &command).await;
            let _ = tx.send(Internal::CommandDone { command, result });
        });
        Ok(())
    }

    fn scroll_to_current(&mut self) {
        if let Some(row) = self
            .scroll
            .scroll_to_current(self.current_index, self.shown.len())
        {
            self.signal(QueueSignal::ScrollToItem(row));
        }
    }

    fn reset_for_player(&mut self, player_id: String) {
        info!(player_id = %player_id, "Player changed, resetting queue");
        self.epoch += 1;
        self.player_id = Some(player_id);
        self.snapshot.discard();
        self.shown = Arc::new(Vec::new());
        self.known_timestamp = ChangeTimestamp::default();
        self.current_index = None;
        self.duration_secs = 0.0;
        self.fetching = false;
        self.reload_deferred = false;
        self.discarded_len = 0;
        self.discarded_total = 0;
        self.save_dialog_open = false;
        self.debouncer.cancel();
    }

    fn signal(&self, signal: QueueSignal) {
        let _ = self.signal_tx.send(signal);
    }

    fn phase(&self) -> SyncPhase {
        if self.terminated {
            SyncPhase::Terminated
        } else if self.debouncer.is_pending() {
            SyncPhase::DebouncePending
        } else if self.fetching {
            SyncPhase::Fetching
        } else {
            SyncPhase::Idle
        }
    }

    fn publish(&self) {
        let view = QueueView {
            items: Arc::clone(&self.shown),
            total_count: if self.shown.is_empty() {
                0
            } else {
                self.snapshot
                    .total_count()
                    .max(self.discarded_total)
                    .max(self.shown.len())
            },
            current_index: self.current_index,
            duration_secs: self.duration_secs,
            phase: self.phase(),
            save_dialog_open: self.save_dialog_open,
        };
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}
