use serde::{Serialize, Deserialize};
use crate::model::task::{Task, TaskStatus};

/// Display groups produced by the classifier. Each list keeps the order of
/// the input collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TaskGroups {
    pub overdue: Vec<Task>,
    pub today: Vec<Task>,
    pub upcoming: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskGroups {
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty()
            && self.today.is_empty()
            && self.upcoming.is_empty()
            && self.completed.is_empty()
    }
}

/// Per-status counts for the overview.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub on_hold: usize,
    pub done: usize,
}

impl StatusSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut summary = StatusSummary {
            total: tasks.len(),
            ..Default::default()
        };
        for task in tasks {
            match task.status {
                TaskStatus::NotStarted => summary.not_started += 1,
                TaskStatus::InProgress => summary.in_progress += 1,
                TaskStatus::OnHold => summary.on_hold += 1,
                TaskStatus::Done => summary.done += 1,
            }
        }
        summary
    }
}
