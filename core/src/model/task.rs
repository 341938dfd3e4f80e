use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Title given to a task whose interpreted or edited title is empty.
pub const UNTITLED_TASK: &str = "Untitled Task";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    #[serde(rename = "todo")]
    NotStarted,
    #[serde(rename = "progress")]
    InProgress,
    #[serde(rename = "hold")]
    OnHold,
    #[serde(rename = "done")]
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::NotStarted
    }
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::OnHold => "On Hold",
            TaskStatus::Done => "Completed",
        }
    }

    /// The status a toggle lands on.
    pub fn for_completed(completed: bool) -> Self {
        if completed {
            TaskStatus::Done
        } else {
            TaskStatus::NotStarted
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub status: TaskStatus,

    // Local wall-clock time. Midnight means the task is due "all day".
    pub due_date: Option<NaiveDateTime>,

    pub created_at: DateTime<Utc>,
    pub priority: Priority,
    pub project: Option<String>,
    pub tag: Option<String>,
}

impl Task {
    pub fn new(title: String, due_date: Option<NaiveDateTime>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: normalize_title(&title),
            completed: false,
            status: TaskStatus::default(),
            due_date,
            created_at: created_at.trunc_subsecs(3),
            priority: Priority::default(),
            project: None,
            tag: None,
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.due_date
            .map(|d| d.time() == chrono::NaiveTime::MIN)
            .unwrap_or(false)
    }

    /// Returns a new record with the patch applied, keeping `completed` and
    /// `status` coupled.
    pub fn patched(&self, patch: &TaskPatch) -> Task {
        let mut next = self.clone();

        if let Some(title) = &patch.title {
            next.title = normalize_title(title);
        }
        if let Some(due_date) = patch.due_date {
            next.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(project) = &patch.project {
            next.project = project.clone();
        }
        if let Some(tag) = &patch.tag {
            next.tag = tag.clone();
        }

        match (patch.status, patch.completed) {
            (Some(status), _) => next.set_status(status),
            (None, Some(completed)) => {
                if completed {
                    next.set_status(TaskStatus::Done);
                } else if next.status == TaskStatus::Done {
                    next.set_status(TaskStatus::NotStarted);
                }
            }
            (None, None) => {}
        }

        next
    }

    pub fn toggled(&self) -> Task {
        let mut next = self.clone();
        next.set_status(TaskStatus::for_completed(!self.completed));
        next
    }

    pub fn with_status(&self, status: TaskStatus) -> Task {
        let mut next = self.clone();
        next.set_status(status);
        next
    }

    fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed = status == TaskStatus::Done;
    }
}

pub(crate) fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED_TASK.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Partial update for [`Task`]. `None` leaves a field untouched; the nested
/// `Option`s on clearable fields distinguish "clear" from "keep".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<NaiveDateTime>>,
    pub priority: Option<Priority>,
    pub project: Option<Option<String>>,
    pub tag: Option<Option<String>>,
}

impl TaskPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDateTime>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn project(mut self, project: Option<String>) -> Self {
        self.project = Some(project);
        self
    }

    pub fn tag(mut self, tag: Option<String>) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}
