use std::sync::Arc;

use uuid::Uuid;

use crate::model::task::Task;
use crate::model::view::{ActiveView, Workspace};

/// Point-in-time, read-only view of the store. Cloning is cheap: the task
/// list is shared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreSnapshot {
    pub tasks: Arc<Vec<Task>>,
    pub active_view: ActiveView,
    pub active_workspace: Workspace,
}

impl StoreSnapshot {
    pub fn find(&self, id: &Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
