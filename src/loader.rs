//! Background loading of history and diffs with supersede and cancel semantics.
//!
//! Each kind of load has one slot. Issuing a request cancels whatever occupied the
//! slot, and deliveries are matched against the slot's current request id, so a
//! result that arrives after being superseded is dropped even if its task never
//! noticed the cancellation.

use log::debug;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::diff::{DiffView, SharedDiff};
use crate::git::{Commit, LoadError, RevisionProvider, Target};

pub type RequestId = u64;

/// Work the navigation state asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCommand {
    History {
        generation: u64,
        target: Target,
        limit: usize,
    },
    Diff {
        generation: u64,
        target: Target,
        index: usize,
        commit: Commit,
    },
    /// Drop everything in flight; issued when the target changes.
    CancelAll,
}

/// Completed work handed back to the navigation state.
#[derive(Debug, Clone)]
pub enum LoadEvent {
    History {
        generation: u64,
        limit: usize,
        result: Result<Vec<Commit>, LoadError>,
    },
    Diff {
        generation: u64,
        index: usize,
        commit_id: String,
        result: Result<SharedDiff, LoadError>,
    },
}

impl LoadEvent {
    pub fn generation(&self) -> u64 {
        match self {
            LoadEvent::History { generation, .. } | LoadEvent::Diff { generation, .. } => {
                *generation
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    History,
    Diff,
}

#[derive(Debug)]
struct InFlight {
    id: RequestId,
    cancel: CancellationToken,
}

#[derive(Debug)]
struct Delivery {
    slot: Slot,
    id: RequestId,
    event: LoadEvent,
}

pub struct LoadCoordinator {
    provider: Arc<dyn RevisionProvider>,
    tx: mpsc::UnboundedSender<Delivery>,
    rx: mpsc::UnboundedReceiver<Delivery>,
    next_id: RequestId,
    history: Option<InFlight>,
    diff: Option<InFlight>,
}

impl LoadCoordinator {
    pub fn new(provider: Arc<dyn RevisionProvider>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            provider,
            tx,
            rx,
            next_id: 1,
            history: None,
            diff: None,
        }
    }

    pub fn execute(&mut self, command: LoadCommand) -> Option<RequestId> {
        match command {
            LoadCommand::History {
                generation,
                target,
                limit,
            } => Some(self.request_history(generation, target, limit)),
            LoadCommand::Diff {
                generation,
                target,
                index,
                commit,
            } => Some(self.request_diff(generation, target, index, commit)),
            LoadCommand::CancelAll => {
                self.cancel_all();
                None
            }
        }
    }

    pub fn request_history(&mut self, generation: u64, target: Target, limit: usize) -> RequestId {
        debug!("Requesting history of {} (limit {}, generation {})", target, limit, generation);
        self.spawn(Slot::History, move |provider| LoadEvent::History {
            generation,
            limit,
            result: provider.list_commits(&target, limit),
        })
    }

    pub fn request_diff(
        &mut self,
        generation: u64,
        target: Target,
        index: usize,
        commit: Commit,
    ) -> RequestId {
        debug!("Requesting diff of {} (#{}, generation {})", commit.short_id, index, generation);
        self.spawn(Slot::Diff, move |provider| {
            let result = provider
                .snapshot_pair(&target, &commit)
                .map(|blobs| Arc::new(DiffView::from_blobs(&blobs)));
            LoadEvent::Diff {
                generation,
                index,
                commit_id: commit.id,
                result,
            }
        })
    }

    /// Cancel every in-flight load; anything they still deliver is discarded.
    pub fn cancel_all(&mut self) {
        for inflight in [self.history.take(), self.diff.take()].into_iter().flatten() {
            debug!("Cancelling request {}", inflight.id);
            inflight.cancel.cancel();
        }
    }

    pub fn is_loading_history(&self) -> bool {
        self.history.is_some()
    }

    pub fn is_loading_diff(&self) -> bool {
        self.diff.is_some()
    }

    /// Next current result, waiting for one to arrive.
    pub async fn next(&mut self) -> Option<LoadEvent> {
        loop {
            let delivery = self.rx.recv().await?;
            if let Some(event) = self.accept(delivery) {
                return Some(event);
            }
        }
    }

    /// Next current result if one is already waiting.
    pub fn try_next(&mut self) -> Option<LoadEvent> {
        loop {
            let delivery = self.rx.try_recv().ok()?;
            if let Some(event) = self.accept(delivery) {
                return Some(event);
            }
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<InFlight> {
        match slot {
            Slot::History => &mut self.history,
            Slot::Diff => &mut self.diff,
        }
    }

    fn accept(&mut self, delivery: Delivery) -> Option<LoadEvent> {
        let slot = self.slot_mut(delivery.slot);
        if slot.as_ref().is_some_and(|inflight| inflight.id == delivery.id) {
            *slot = None;
            Some(delivery.event)
        } else {
            debug!("Discarding stale {:?} result of request {}", delivery.slot, delivery.id);
            None
        }
    }

    fn spawn<F>(&mut self, slot: Slot, work: F) -> RequestId
    where
        F: FnOnce(&dyn RevisionProvider) -> LoadEvent + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        let cancel = CancellationToken::new();
        let previous = self.slot_mut(slot).replace(InFlight {
            id,
            cancel: cancel.clone(),
        });
        if let Some(previous) = previous {
            debug!("Request {} supersedes {}", id, previous.id);
            previous.cancel.cancel();
        }

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();

        tokio::task::spawn_blocking(move || {
            if cancel.is_cancelled() {
                debug!("Request {} cancelled before start", id);
                return;
            }

            let event = work(provider.as_ref());

            if cancel.is_cancelled() {
                debug!("Request {} cancelled, dropping result", id);
                return;
            }
            let _ = tx.send(Delivery { slot, id, event });
        });

        id
    }
}
