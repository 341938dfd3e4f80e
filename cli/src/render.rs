use brief_core::{
    classify, focus, format_due_label, ActiveView, StatusSummary, Task, TaskGroups, TaskStatus,
};
use chrono::NaiveDateTime;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    title: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Labels")]
    labels: String,
}

pub fn short_id(task: &Task) -> String {
    task.id.to_string()[..8].to_string()
}

fn row(task: &Task) -> TaskRow {
    let labels: Vec<String> = [
        task.project.as_ref().map(|p| format!("@{}", p)),
        task.tag.as_ref().map(|t| format!("#{}", t)),
    ]
    .into_iter()
    .flatten()
    .collect();

    TaskRow {
        id: short_id(task),
        title: if task.completed { format!("✓ {}", task.title) } else { task.title.clone() },
        due: task.due_date.map(format_due_label).unwrap_or_else(|| "-".to_string()),
        status: task.status.label().to_string(),
        priority: format!("{:?}", task.priority),
        labels: if labels.is_empty() { "-".to_string() } else { labels.join(" ") },
    }
}

fn print_group(title: &str, tasks: &[Task], always: bool) {
    if tasks.is_empty() && !always {
        return;
    }
    println!("\n\x1b[1;31m{}\x1b[0m ({})", title.to_uppercase(), tasks.len());
    if tasks.is_empty() {
        println!("  nothing here");
        return;
    }

    let mut table = Table::new(tasks.iter().map(row));
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

pub fn print_summary(summary: &StatusSummary) {
    println!(
        "{} tasks · {} not started · {} in progress · {} on hold · {} completed",
        summary.total, summary.not_started, summary.in_progress, summary.on_hold, summary.done
    );
}

/// Groups for the board, or `None` when the view has nothing to show.
///
/// Emptiness is judged on the view's task list, not on the groups: undated
/// tasks in the All view belong to no group but still count.
fn sections(view: ActiveView, tasks: &[Task], now: NaiveDateTime) -> Option<TaskGroups> {
    let focused = focus(tasks, now, view);
    if focused.is_empty() {
        return None;
    }
    Some(classify(&focused, now, view))
}

pub fn print_board(view: ActiveView, tasks: &[Task], now: NaiveDateTime) {
    let heading = match view {
        ActiveView::All => "Tasks",
        ActiveView::Today => "Today",
    };
    println!("\x1b[1m{}\x1b[0m", heading);

    if view == ActiveView::All {
        print_summary(&StatusSummary::from_tasks(tasks));
    }

    let Some(groups) = sections(view, tasks, now) else {
        println!("\nNo tasks. Add one with: brief add \"Review deck tomorrow at 2pm\"");
        return;
    };

    print_group("Overdue", &groups.overdue, false);
    // The Today group is always shown, even when empty.
    print_group("Today", &groups.today, true);
    print_group("Upcoming", &groups.upcoming, false);
    print_group("History", &groups.completed, false);
}

pub fn print_task(prefix: &str, task: &Task) {
    println!("{}: {} (ID: {})", prefix, task.title, short_id(task));
    if let Some(due) = task.due_date {
        println!("  Due: {}", format_due_label(due));
    }
    if task.status != TaskStatus::NotStarted {
        println!("  Status: {}", task.status.label());
    }
    if let Some(project) = &task.project {
        println!("  Project: {}", project);
    }
    if let Some(tag) = &task.tag {
        println!("  Tag: {}", tag);
    }
    println!("  Priority: {:?}", task.priority);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap().and_hms_opt(10, 30, 0).unwrap()
    }

    fn task(title: &str, due: Option<NaiveDateTime>) -> Task {
        Task::new(title.to_string(), due, Utc::now())
    }

    #[test]
    fn test_undated_tasks_keep_all_view_out_of_empty_state() {
        let tasks = vec![task("Buy milk", None)];

        let groups = sections(ActiveView::All, &tasks, now()).unwrap();
        assert!(groups.is_empty());

        let groups = sections(ActiveView::Today, &tasks, now()).unwrap();
        assert_eq!(groups.today.len(), 1);
    }

    #[test]
    fn test_empty_state() {
        assert!(sections(ActiveView::All, &[], now()).is_none());
        assert!(sections(ActiveView::Today, &[], now()).is_none());

        // Completed and future tasks are outside the Today view.
        let tomorrow = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(9, 0, 0);
        let tasks = vec![task("Done", None).toggled(), task("Later", tomorrow)];
        assert!(sections(ActiveView::Today, &tasks, now()).is_none());
        assert!(sections(ActiveView::All, &tasks, now()).is_some());
    }
}
