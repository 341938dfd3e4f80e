use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::{debug, info};
use uuid::Uuid;

use crate::grammar::EnglishDateParser;
use crate::input::interpret;
use crate::model::snapshot::StoreSnapshot;
use crate::model::task::{Task, TaskPatch, TaskStatus};
use crate::model::view::{ActiveView, Workspace};
use crate::repository::StateRepository;
use crate::service::classifier::build_board;
use crate::service::dto::TaskGroups;
use crate::time::{Clock, DateExpressionParser, SystemClock};

type Observer = Box<dyn Fn(&StoreSnapshot)>;

/// Owner of the task collection.
///
/// Every effective mutation swaps in a freshly built task list, saves the
/// whole state through the repository and hands the new snapshot to
/// observers. Mutations addressed to an unknown id change nothing and return
/// `None`/`false`. The only error a mutation can return is a failed save; the
/// in-memory change is kept in that case.
pub struct TaskStore<R: StateRepository> {
    repo: R,
    parser: Box<dyn DateExpressionParser>,
    clock: Box<dyn Clock>,
    state: StoreSnapshot,
    observers: Vec<Observer>,
}

impl<R: StateRepository> TaskStore<R> {
    /// Loads and rehydrates whatever the repository holds.
    pub fn open(repo: R) -> Result<Self> {
        Self::open_with_clock(repo, Box::new(SystemClock))
    }

    pub fn open_with_clock(repo: R, clock: Box<dyn Clock>) -> Result<Self> {
        let state = repo.load(clock.now().to_utc())?.unwrap_or_default();
        info!(tasks = state.len(), view = %state.active_view, "task store opened");
        Ok(Self {
            repo,
            parser: Box::new(EnglishDateParser::new()),
            clock,
            state,
            observers: Vec::new(),
        })
    }

    /// Swaps the date grammar used by [`TaskStore::add_task`].
    pub fn with_parser(mut self, parser: impl DateExpressionParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn subscribe(&mut self, observer: impl Fn(&StoreSnapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.clone()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn parser(&self) -> &dyn DateExpressionParser {
        self.parser.as_ref()
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// The grouped board for the active view at the store's "now".
    pub fn board(&self) -> TaskGroups {
        build_board(
            &self.state.tasks,
            self.clock.now().naive_local(),
            self.state.active_view,
        )
    }

    pub fn add_task(&mut self, raw: &str) -> Result<Task> {
        let now = self.clock.now();
        let parsed = interpret(raw, self.parser.as_ref(), now.naive_local());
        let task = Task::new(parsed.title, parsed.due_date, now.to_utc());

        let mut tasks = Vec::with_capacity(self.state.tasks.len() + 1);
        tasks.push(task.clone());
        tasks.extend(self.state.tasks.iter().cloned());

        info!(id = %task.id, title = %task.title, due = ?task.due_date, "task added");
        self.commit_tasks(tasks)?;
        Ok(task)
    }

    /// Applies `patch` as given; the title is not re-interpreted.
    pub fn update_task(&mut self, id: &Uuid, patch: &TaskPatch) -> Result<Option<Task>> {
        self.replace_task(id, |task| task.patched(patch))
    }

    pub fn toggle_task(&mut self, id: &Uuid) -> Result<Option<Task>> {
        self.replace_task(id, Task::toggled)
    }

    pub fn update_status(&mut self, id: &Uuid, status: TaskStatus) -> Result<Option<Task>> {
        self.replace_task(id, |task| task.with_status(status))
    }

    pub fn delete_task(&mut self, id: &Uuid) -> Result<bool> {
        if self.state.find(id).is_none() {
            debug!(%id, "delete ignored; no such task");
            return Ok(false);
        }
        let tasks = self.state.tasks.iter().filter(|t| t.id != *id).cloned().collect();
        info!(%id, "task deleted");
        self.commit_tasks(tasks)?;
        Ok(true)
    }

    /// Removes every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> Result<usize> {
        let remaining: Vec<Task> = self.state.tasks.iter().filter(|t| !t.completed).cloned().collect();
        let removed = self.state.tasks.len() - remaining.len();
        if removed == 0 {
            return Ok(0);
        }
        info!(removed, "completed tasks cleared");
        self.commit_tasks(remaining)?;
        Ok(removed)
    }

    pub fn set_active_view(&mut self, view: ActiveView) -> Result<()> {
        if self.state.active_view == view {
            return Ok(());
        }
        let next = StoreSnapshot {
            active_view: view,
            ..self.state.clone()
        };
        self.commit(next)
    }

    pub fn toggle_workspace(&mut self) -> Result<Workspace> {
        let workspace = self.state.active_workspace.toggled();
        let next = StoreSnapshot {
            active_workspace: workspace,
            ..self.state.clone()
        };
        self.commit(next)?;
        Ok(workspace)
    }

    fn replace_task<F>(&mut self, id: &Uuid, change: F) -> Result<Option<Task>>
    where
        F: FnOnce(&Task) -> Task,
    {
        let Some(index) = self.state.tasks.iter().position(|t| t.id == *id) else {
            debug!(%id, "update ignored; no such task");
            return Ok(None);
        };

        let updated = change(&self.state.tasks[index]);
        let mut tasks = self.state.tasks.as_ref().clone();
        tasks[index] = updated.clone();

        info!(%id, status = ?updated.status, completed = updated.completed, "task updated");
        self.commit_tasks(tasks)?;
        Ok(Some(updated))
    }

    fn commit_tasks(&mut self, tasks: Vec<Task>) -> Result<()> {
        let next = StoreSnapshot {
            tasks: Arc::new(tasks),
            ..self.state.clone()
        };
        self.commit(next)
    }

    fn commit(&mut self, next: StoreSnapshot) -> Result<()> {
        self.state = next;
        for observer in &self.observers {
            observer(&self.state);
        }
        self.repo.save(&self.state)
    }
}
