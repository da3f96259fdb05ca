// src/board.rs
//
// The Kanban board controller: three fixed lanes in bijection with task
// status, per-lane card ordering, and the optimistic drag-and-drop move
// with rollback on remote failure.

use log::{debug, error, info};

use crate::models::Status;
use crate::notify::Notification;
use crate::store::TaskStore;

/// One of the three fixed board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    ToDo,
    InProgress,
    Done,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::ToDo, Lane::InProgress, Lane::Done];

    /// Fixed bijection between lanes and statuses.
    pub fn status(&self) -> Status {
        match self {
            Lane::ToDo => Status::ToDo,
            Lane::InProgress => Status::InProgress,
            Lane::Done => Status::Done,
        }
    }

    pub fn for_status(status: Status) -> Lane {
        match status {
            Status::ToDo => Lane::ToDo,
            Status::InProgress => Lane::InProgress,
            Status::Done => Lane::Done,
        }
    }

    fn index(&self) -> usize {
        match self {
            Lane::ToDo => 0,
            Lane::InProgress => 1,
            Lane::Done => 2,
        }
    }
}

/// A card's position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPosition {
    pub lane: Lane,
    pub index: usize,
}

/// The result of a completed drag gesture, as reported by the view layer.
#[derive(Debug, Clone)]
pub struct DropEvent {
    pub task_id: String,
    pub source: CardPosition,
    /// `None` when the card was dropped outside any lane.
    pub destination: Option<CardPosition>,
}

/// What the controller did with a drop, including the toast to show.
#[derive(Debug, PartialEq)]
pub enum DropOutcome {
    /// No valid destination, identical position, or unknown card.
    Ignored,
    /// Optimistic move confirmed by the backend.
    Moved(Notification),
    /// Remote update failed; status and lane placement were restored.
    Reverted(Notification),
}

/// Per-lane ordering of task ids. Rebuilt from the cache on refresh and
/// adjusted in place while a drag is in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardColumns {
    lanes: [Vec<String>; 3],
}

impl BoardColumns {
    /// Buckets tasks into lanes by status, preserving cache order within
    /// each lane.
    pub fn from_store(store: &TaskStore) -> Self {
        let mut columns = BoardColumns::default();
        for task in store.tasks() {
            columns.lanes[Lane::for_status(task.status).index()].push(task.id.clone());
        }
        columns
    }

    pub fn lane(&self, lane: Lane) -> &[String] {
        &self.lanes[lane.index()]
    }

    fn remove(&mut self, position: CardPosition) -> Option<String> {
        let cards = &mut self.lanes[position.lane.index()];
        if position.index >= cards.len() {
            return None;
        }
        Some(cards.remove(position.index))
    }

    fn insert(&mut self, position: CardPosition, task_id: String) {
        let cards = &mut self.lanes[position.lane.index()];
        let index = position.index.min(cards.len());
        cards.insert(index, task_id);
    }
}

/// Applies a drop: optimistic local status change and card repositioning,
/// then the remote full-record update. On failure both the status and the
/// lane placement are restored together, so the board can never disagree
/// with the cache while waiting for the next refresh.
pub async fn handle_drop(
    store: &mut TaskStore,
    columns: &mut BoardColumns,
    event: DropEvent,
) -> DropOutcome {
    let destination = match event.destination {
        Some(destination) => destination,
        None => return DropOutcome::Ignored,
    };
    if destination == event.source {
        return DropOutcome::Ignored;
    }

    let task = match store.task_by_id(&event.task_id) {
        Some(task) => task.clone(),
        None => {
            debug!("drop for unknown task {}, ignoring", event.task_id);
            return DropOutcome::Ignored;
        }
    };
    let previous_status = task.status;
    let new_status = destination.lane.status();

    // Optimistic update: the UI reflects the drop instantly.
    store.set_task_status(&event.task_id, new_status);
    if columns.remove(event.source).is_some() {
        columns.insert(destination, event.task_id.clone());
    }

    let mut updated = task.clone();
    updated.status = new_status;
    match store.update_task(updated).await {
        Ok(()) => {
            info!("task {} moved to {}", event.task_id, new_status.as_str());
            DropOutcome::Moved(Notification::success(
                "Task Updated",
                format!("\"{}\" moved to {}.", task.title, new_status.as_str()),
            ))
        }
        Err(e) => {
            error!("failed to update task {}: {}", event.task_id, e);
            store.set_task_status(&event.task_id, previous_status);
            if columns.remove(destination).is_some() {
                columns.insert(event.source, event.task_id.clone());
            }
            DropOutcome::Reverted(Notification::failure(
                "Update Failed",
                "Could not update task status. Reverting changes.",
            ))
        }
    }
}
