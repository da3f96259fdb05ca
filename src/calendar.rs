// src/calendar.rs
//
// Calendar-view derivations: tasks grouped by due-date calendar day.
// Comparisons are by calendar date, never by instant.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::Task;

/// Buckets tasks by the calendar day of their due date. Tasks without a
/// due date are skipped (they render as blank elsewhere, not here).
pub fn tasks_by_day(tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(due) = task.due_date {
            days.entry(due.date_naive()).or_default().push(task);
        }
    }
    days
}

/// Tasks due on one specific day, in cache order.
pub fn tasks_due_on(tasks: &[Task], day: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.due_date.map(|d| d.date_naive()) == Some(day))
        .collect()
}
