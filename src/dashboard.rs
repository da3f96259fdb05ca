// src/dashboard.rs
//
// Pure derivations over the cached task list for the dashboard cards.

use crate::models::{Priority, Status, Task};

/// Task counts per status, for the three dashboard stat cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub to_do: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.to_do + self.in_progress + self.done
    }
}

pub fn status_counts<'a, I>(tasks: I) -> StatusCounts
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            Status::ToDo => counts.to_do += 1,
            Status::InProgress => counts.in_progress += 1,
            Status::Done => counts.done += 1,
        }
    }
    counts
}

/// Priority distribution of the tasks still open (everything not Done).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

pub fn open_priority_breakdown(tasks: &[Task]) -> PriorityBreakdown {
    let mut breakdown = PriorityBreakdown::default();
    for task in tasks.iter().filter(|t| t.status != Status::Done) {
        match task.priority {
            Priority::High => breakdown.high += 1,
            Priority::Medium => breakdown.medium += 1,
            Priority::Low => breakdown.low += 1,
        }
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: Status, priority: Priority) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {}", id),
            description: String::new(),
            status,
            priority,
            assignee_id: "1".to_string(),
            due_date: None,
        }
    }

    #[test]
    fn counts_by_status() {
        let tasks = vec![
            task("a", Status::ToDo, Priority::Low),
            task("b", Status::ToDo, Priority::High),
            task("c", Status::InProgress, Priority::Medium),
            task("d", Status::Done, Priority::High),
        ];
        let counts = status_counts(&tasks);
        assert_eq!(counts.to_do, 2);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.done, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn done_tasks_excluded_from_priority_breakdown() {
        let tasks = vec![
            task("a", Status::ToDo, Priority::High),
            task("b", Status::InProgress, Priority::High),
            task("c", Status::Done, Priority::High),
            task("d", Status::ToDo, Priority::Low),
        ];
        let breakdown = open_priority_breakdown(&tasks);
        assert_eq!(breakdown.high, 2);
        assert_eq!(breakdown.medium, 0);
        assert_eq!(breakdown.low, 1);
    }
}
