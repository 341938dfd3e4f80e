//! Temporal bucketing of tasks relative to "now".
//!
//! All comparisons are on local wall-clock values; nothing here reads the
//! system clock.

use chrono::{NaiveDateTime, NaiveTime};

use crate::model::task::Task;
use crate::model::view::ActiveView;
use crate::service::dto::TaskGroups;

fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(NaiveTime::MIN)
}

fn end_of_day(now: NaiveDateTime) -> NaiveDateTime {
    // 23:59:59.999 is always a valid time.
    now.date()
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| start_of_day(now))
}

pub fn is_today(due: NaiveDateTime, now: NaiveDateTime) -> bool {
    due.date() == now.date()
}

/// Due before today's midnight. A task due earlier today is not overdue.
pub fn is_overdue(due: NaiveDateTime, now: NaiveDateTime) -> bool {
    due < start_of_day(now)
}

pub fn is_upcoming(due: NaiveDateTime, now: NaiveDateTime) -> bool {
    due > end_of_day(now)
}

fn in_today_bucket(task: &Task, now: NaiveDateTime, view: ActiveView) -> bool {
    match task.due_date {
        Some(due) => is_today(due, now),
        None => view == ActiveView::Today,
    }
}

/// Splits `tasks` into overdue / today / upcoming (incomplete tasks only) and
/// completed.
///
/// Undated incomplete tasks land in `today` under the Today view and in no
/// bucket under the general view.
pub fn classify(tasks: &[Task], now: NaiveDateTime, view: ActiveView) -> TaskGroups {
    let mut groups = TaskGroups::default();

    for task in tasks {
        if task.completed {
            groups.completed.push(task.clone());
            continue;
        }
        if let Some(due) = task.due_date {
            if is_overdue(due, now) {
                groups.overdue.push(task.clone());
            } else if is_upcoming(due, now) {
                groups.upcoming.push(task.clone());
            }
        }
        if in_today_bucket(task, now, view) {
            groups.today.push(task.clone());
        }
    }

    groups
}

/// The tasks a view lists before grouping. The Today view keeps only
/// incomplete tasks that are undated or due today.
pub fn focus(tasks: &[Task], now: NaiveDateTime, view: ActiveView) -> Vec<Task> {
    match view {
        ActiveView::All => tasks.to_vec(),
        ActiveView::Today => tasks
            .iter()
            .filter(|t| !t.completed && in_today_bucket(t, now, view))
            .cloned()
            .collect(),
    }
}

pub fn build_board(tasks: &[Task], now: NaiveDateTime, view: ActiveView) -> TaskGroups {
    classify(&focus(tasks, now, view), now, view)
}
