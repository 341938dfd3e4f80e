mod render;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use brief_core::{
    format_due_label, interpret, ActiveView, FileStateRepository, Priority, StoreSnapshot, TaskPatch,
    TaskStatus, TaskStore,
};
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "brief")]
#[command(about = "A plain-language task list", long_about = None)]
struct Cli {
    /// Directory holding the task file (defaults to ~/.brief)
    #[arg(long, global = true, env = "BRIEF_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log filter, e.g. "info" or "brief_core=debug"
    #[arg(long, global = true, env = "BRIEF_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a task (usage: add Review deck tomorrow at 2pm)
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        text: Vec<String>,
    },
    /// Show how input would be read, without saving anything
    Preview {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        text: Vec<String>,
    },
    /// Show tasks grouped into Overdue, Today, Upcoming and History
    List {
        /// View to render instead of the saved one (all, today)
        #[arg(long)]
        view: Option<ActiveView>,
    },
    /// Mark a task done, or reopen it
    Toggle { id: String },
    /// Set a task's status
    Status { id: String, status: StatusArg },
    /// Change fields of a task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        priority: Option<PriorityArg>,
        /// New due date in plain language, e.g. "friday 9am"
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
        /// Project label; pass "" to clear
        #[arg(long)]
        project: Option<String>,
        /// Tag label; pass "" to clear
        #[arg(long)]
        tag: Option<String>,
    },
    /// Delete a task
    Rm { id: String },
    /// Permanently delete all completed tasks
    Purge,
    /// Switch the saved view (all, today)
    View { view: ActiveView },
    /// Switch between the Personal and Brief workspaces
    Workspace,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Todo,
    Progress,
    Hold,
    Done,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Todo => TaskStatus::NotStarted,
            StatusArg::Progress => TaskStatus::InProgress,
            StatusArg::Hold => TaskStatus::OnHold,
            StatusArg::Done => TaskStatus::Done,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PriorityArg {
    #[value(alias = "l")]
    Low,
    #[value(alias = "m", alias = "med")]
    Medium,
    #[value(alias = "h")]
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = filter
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Finds the task an id or id prefix refers to.
fn resolve_id(snapshot: &StoreSnapshot, key: &str) -> Result<Uuid> {
    let key = key.trim().to_lowercase();
    if key.is_empty() {
        bail!("Task ID is required.");
    }

    // 1. Exact match
    if let Ok(id) = Uuid::parse_str(&key) {
        if snapshot.find(&id).is_some() {
            return Ok(id);
        }
    }

    // 2. Prefix match
    let matches: Vec<Uuid> = snapshot
        .tasks
        .iter()
        .filter(|t| t.id.to_string().starts_with(&key))
        .map(|t| t.id)
        .collect();

    match matches.len() {
        1 => Ok(matches[0]),
        0 => Err(anyhow!("No task with ID '{}'", key)),
        n => Err(anyhow!("Ambiguous ID '{}' matches {} tasks", key, n)),
    }
}

fn optional_label(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let repo = FileStateRepository::new(cli.data_dir)?;
    let mut store = TaskStore::open(repo)?;
    debug!(path = %store.repository().path().display(), "using task file");

    match cli.command {
        Some(Commands::Add { text }) => {
            let task = store.add_task(&text.join(" "))?;
            render::print_task("Task added", &task);
        }
        Some(Commands::Preview { text }) => {
            let raw = text.join(" ");
            let now = store.now().naive_local();
            let parsed = interpret(&raw, store.parser(), now);
            println!("Title: {}", parsed.title);
            match store.parser().parse(&raw, now) {
                Some(found) => println!(
                    "Due:   {} (from \"{}\")",
                    format_due_label(found.value),
                    found.text
                ),
                None => println!("Due:   -"),
            }
        }
        Some(Commands::List { view }) => {
            let snapshot = store.snapshot();
            let view = view.unwrap_or(snapshot.active_view);
            render::print_board(view, &snapshot.tasks, store.now().naive_local());
        }
        Some(Commands::Toggle { id }) => {
            let id = resolve_id(&store.snapshot(), &id)?;
            if let Some(task) = store.toggle_task(&id)? {
                let verb = if task.completed { "Completed" } else { "Reopened" };
                println!("{}: {}", verb, task.title);
            }
        }
        Some(Commands::Status { id, status }) => {
            let id = resolve_id(&store.snapshot(), &id)?;
            if let Some(task) = store.update_status(&id, status.into())? {
                println!("{} → {}", task.title, task.status.label());
            }
        }
        Some(Commands::Edit { id, title, priority, due, clear_due, project, tag }) => {
            let id = resolve_id(&store.snapshot(), &id)?;

            let mut patch = TaskPatch::default();
            if let Some(title) = title {
                patch = patch.title(title);
            }
            if let Some(priority) = priority {
                patch = patch.priority(priority.into());
            }
            if clear_due {
                patch = patch.due_date(None);
            } else if let Some(expr) = due {
                let now = store.now().naive_local();
                let found = store
                    .parser()
                    .parse(&expr, now)
                    .ok_or_else(|| anyhow!("Could not read a date from '{}'", expr))?;
                patch = patch.due_date(Some(found.value));
            }
            if let Some(project) = project {
                patch = patch.project(optional_label(project));
            }
            if let Some(tag) = tag {
                patch = patch.tag(optional_label(tag));
            }

            if patch.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            if let Some(task) = store.update_task(&id, &patch)? {
                render::print_task("Task updated", &task);
            }
        }
        Some(Commands::Rm { id }) => {
            let id = resolve_id(&store.snapshot(), &id)?;
            let title = store.snapshot().find(&id).map(|t| t.title.clone());
            if store.delete_task(&id)? {
                println!("Deleted: {}", title.unwrap_or_default());
            }
        }
        Some(Commands::Purge) => {
            let removed = store.clear_completed()?;
            println!("Removed {} completed task(s).", removed);
        }
        Some(Commands::View { view }) => {
            store.set_active_view(view)?;
            println!("View: {}", view);
        }
        Some(Commands::Workspace) => {
            let workspace = store.toggle_workspace()?;
            println!("Workspace: {}", workspace);
        }
        None => {
            let snapshot = store.snapshot();
            render::print_board(snapshot.active_view, &snapshot.tasks, store.now().naive_local());
        }
    }
    Ok(())
}
