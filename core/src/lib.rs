pub mod model;
pub mod repository;
pub mod input;
pub mod time;
pub mod grammar;
pub mod service;

pub use model::task::{Task, TaskPatch, Priority, TaskStatus, UNTITLED_TASK};
pub use model::view::{ActiveView, Workspace};
pub use model::snapshot::StoreSnapshot;
pub use repository::{StateRepository, FileStateRepository, MemoryStateRepository};
pub use input::{interpret, ParsedInput};
pub use time::{format_due_label, Clock, DateExpressionParser, DateMatch, FixedClock, SystemClock};
pub use grammar::EnglishDateParser;
pub use service::classifier::{build_board, classify, focus, is_overdue, is_today, is_upcoming};
pub use service::dto::{StatusSummary, TaskGroups};
pub use service::task_store::TaskStore;
