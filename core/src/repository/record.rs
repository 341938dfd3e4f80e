//! On-disk shape of the store and the rehydration step.
//!
//! Saving writes typed records. Loading goes through loosely typed
//! [`serde_json::Value`]s so that a bad field degrades to a default instead
//! of failing the whole load. Date fields in particular are re-parsed
//! explicitly; an unparsable due date becomes `None`.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::model::snapshot::StoreSnapshot;
use crate::model::task::{normalize_title, Priority, Task, TaskStatus};
use crate::model::view::{ActiveView, Workspace};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedState<'a> {
    tasks: &'a [Task],
    active_view: ActiveView,
    active_workspace: Workspace,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StoredState {
    tasks: Option<Value>,
    active_view: Option<Value>,
    active_workspace: Option<Value>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StoredTask {
    id: Option<Value>,
    title: Option<Value>,
    completed: Option<Value>,
    status: Option<Value>,
    due_date: Option<Value>,
    created_at: Option<Value>,
    priority: Option<Value>,
    project: Option<Value>,
    tag: Option<Value>,
}

pub fn encode(snapshot: &StoreSnapshot) -> Result<String> {
    let saved = SavedState {
        tasks: snapshot.tasks.as_slice(),
        active_view: snapshot.active_view,
        active_workspace: snapshot.active_workspace,
    };
    serde_json::to_string_pretty(&saved).context("Failed to serialize task state")
}

/// Parses persisted state. Only malformed JSON is an error; `loaded_at`
/// stands in for creation times that cannot be recovered.
pub fn decode(json: &str, loaded_at: DateTime<Utc>) -> Result<StoreSnapshot> {
    let mut root: Value = serde_json::from_str(json).context("Persisted state is not valid JSON")?;

    // Accept the `{ "state": {...}, "version": n }` envelope as well.
    if let Some(inner) = root
        .get_mut("state")
        .filter(|v| v.is_object())
        .map(Value::take)
    {
        root = inner;
    }

    let stored: StoredState = serde_json::from_value(root).unwrap_or_else(|err| {
        warn!(error = %err, "persisted state has an unexpected shape; starting empty");
        StoredState::default()
    });

    let records = match stored.tasks {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            warn!(raw = %other, "task list is not an array; ignoring it");
            Vec::new()
        }
    };

    let tasks = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<StoredTask>(value) {
            Ok(record) => Some(record.rehydrate(loaded_at)),
            Err(err) => {
                warn!(index, error = %err, "skipping unreadable task record");
                None
            }
        })
        .collect();

    Ok(StoreSnapshot {
        tasks: Arc::new(tasks),
        active_view: enum_or_default(stored.active_view.as_ref(), "activeView"),
        active_workspace: enum_or_default(stored.active_workspace.as_ref(), "activeWorkspace"),
    })
}

impl StoredTask {
    fn rehydrate(self, loaded_at: DateTime<Utc>) -> Task {
        let id = self
            .id
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(|| {
                let fresh = Uuid::new_v4();
                warn!(%fresh, "task record without a usable id; assigned a new one");
                fresh
            });

        let title = normalize_title(self.title.as_ref().and_then(Value::as_str).unwrap_or(""));
        let completed = self.completed.as_ref().and_then(Value::as_bool).unwrap_or(false);
        let mut status: TaskStatus = enum_or_default(self.status.as_ref(), "status");
        if completed {
            status = TaskStatus::Done;
        }

        let due_date = self.due_date.as_ref().and_then(|v| {
            let parsed = local_timestamp(v);
            if parsed.is_none() && !v.is_null() {
                warn!(%id, raw = %v, "unreadable due date dropped");
            }
            parsed
        });

        let created_at = self
            .created_at
            .as_ref()
            .and_then(utc_timestamp)
            .unwrap_or_else(|| {
                warn!(%id, "missing or unreadable creation time; using load time");
                loaded_at
            })
            .trunc_subsecs(3);

        Task {
            id,
            title,
            completed: status == TaskStatus::Done,
            status,
            due_date,
            created_at,
            priority: enum_or_default::<Priority>(self.priority.as_ref(), "priority"),
            project: label(self.project.as_ref()),
            tag: label(self.tag.as_ref()),
        }
    }
}

fn enum_or_default<T>(value: Option<&Value>, field: &str) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    match value {
        None | Some(Value::Null) => T::default(),
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|_| {
            warn!(field, raw = %v, "unknown value; using default");
            T::default()
        }),
    }
}

fn label(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn epoch_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

fn naive_text(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// A stored timestamp as local wall-clock time.
pub fn local_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(_) => Local
            .timestamp_millis_opt(epoch_millis(value)?)
            .single()
            .map(|dt| dt.naive_local()),
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Local).naive_local())
                .ok()
                .or_else(|| naive_text(s))
        }
        _ => None,
    }
}

/// A stored timestamp as an instant. Offset-less text is read as local time.
pub fn utc_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(_) => Utc.timestamp_millis_opt(epoch_millis(value)?).single(),
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    let naive = naive_text(s)?;
                    Local
                        .from_local_datetime(&naive)
                        .earliest()
                        .map(|dt| dt.with_timezone(&Utc))
                })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loaded_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn due(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_dates() {
        let mut task = Task::new("Sync".to_string(), Some(due(19, 16, 0)), Utc::now());
        task.project = Some("Ops".to_string());
        let undated = Task::new("Read".to_string(), None, Utc::now()).toggled();
        let snapshot = StoreSnapshot {
            tasks: Arc::new(vec![task.clone(), undated.clone()]),
            active_view: ActiveView::All,
            active_workspace: Workspace::Personal,
        };

        let json = encode(&snapshot).unwrap();
        let restored = decode(&json, loaded_at()).unwrap();

        assert_eq!(restored, snapshot);
        assert_eq!(restored.tasks[0].due_date, task.due_date);
        assert_eq!(restored.tasks[0].created_at, task.created_at);
    }

    #[test]
    fn test_encoded_layout_uses_camel_case() {
        let task = Task::new("Sync".to_string(), Some(due(19, 16, 0)), Utc::now());
        let snapshot = StoreSnapshot {
            tasks: Arc::new(vec![task]),
            ..Default::default()
        };
        let value: Value = serde_json::from_str(&encode(&snapshot).unwrap()).unwrap();

        assert_eq!(value["activeView"], "Today");
        assert_eq!(value["activeWorkspace"], "Brief");
        let record = &value["tasks"][0];
        assert_eq!(record["status"], "todo");
        assert_eq!(record["priority"], "medium");
        assert_eq!(record["dueDate"], "2026-10-19T16:00:00");
        assert!(record["createdAt"].is_string());
    }

    #[test]
    fn test_decode_reconstructs_string_and_number_dates() {
        let millis = Local
            .from_local_datetime(&due(21, 9, 30))
            .single()
            .unwrap()
            .timestamp_millis();
        let json = json!({
            "tasks": [
                { "id": Uuid::new_v4().to_string(), "title": "a", "dueDate": "2026-10-19T16:00:00",
                  "createdAt": "2026-10-01T08:00:00.250Z" },
                { "id": Uuid::new_v4().to_string(), "title": "b", "dueDate": millis,
                  "createdAt": 1_760_000_000_000i64 },
                { "id": Uuid::new_v4().to_string(), "title": "c", "dueDate": "2026-10-20" }
            ]
        })
        .to_string();

        let snapshot = decode(&json, loaded_at()).unwrap();
        assert_eq!(snapshot.tasks[0].due_date, Some(due(19, 16, 0)));
        assert_eq!(
            snapshot.tasks[0].created_at,
            Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap() + chrono::Duration::milliseconds(250)
        );
        assert_eq!(snapshot.tasks[1].due_date, Some(due(21, 9, 30)));
        assert_eq!(snapshot.tasks[1].created_at.timestamp_millis(), 1_760_000_000_000);
        assert_eq!(snapshot.tasks[2].due_date, Some(due(20, 0, 0)));
    }

    #[test]
    fn test_decode_tolerates_bad_fields() {
        let json = json!({
            "tasks": [
                { "id": "not-a-uuid", "title": "  ", "dueDate": "someday", "createdAt": true,
                  "status": "archived", "priority": 3, "completed": "yes" },
                { "title": "no dates" },
                42
            ],
            "activeView": "Hot",
            "activeWorkspace": null
        })
        .to_string();

        let snapshot = decode(&json, loaded_at()).unwrap();
        assert_eq!(snapshot.len(), 2);

        let first = &snapshot.tasks[0];
        assert_eq!(first.title, crate::model::task::UNTITLED_TASK);
        assert!(first.due_date.is_none());
        assert_eq!(first.created_at, loaded_at());
        assert_eq!(first.status, TaskStatus::NotStarted);
        assert!(!first.completed);
        assert_eq!(first.priority, Priority::Medium);

        assert!(snapshot.tasks[1].due_date.is_none());
        assert_eq!(snapshot.active_view, ActiveView::Today);
        assert_eq!(snapshot.active_workspace, Workspace::Brief);
    }

    #[test]
    fn test_decode_reconciles_completed_and_status() {
        let json = json!({
            "tasks": [
                { "title": "flag only", "completed": true, "status": "todo" },
                { "title": "status only", "completed": false, "status": "done" }
            ]
        })
        .to_string();

        let snapshot = decode(&json, loaded_at()).unwrap();
        for task in snapshot.tasks.iter() {
            assert!(task.completed);
            assert_eq!(task.status, TaskStatus::Done);
        }
    }

    #[test]
    fn test_decode_unwraps_state_envelope() {
        let json = json!({
            "state": { "tasks": [ { "title": "wrapped" } ], "activeView": "All" },
            "version": 0
        })
        .to_string();

        let snapshot = decode(&json, loaded_at()).unwrap();
        assert_eq!(snapshot.tasks[0].title, "wrapped");
        assert_eq!(snapshot.active_view, ActiveView::All);
    }

    #[test]
    fn test_decode_keeps_view_when_task_list_is_not_an_array() {
        for tasks in [json!(null), json!("oops"), json!({ "title": "a" })] {
            let json = json!({
                "tasks": tasks,
                "activeView": "All",
                "activeWorkspace": "Personal"
            })
            .to_string();

            let snapshot = decode(&json, loaded_at()).unwrap();
            assert!(snapshot.is_empty());
            assert_eq!(snapshot.active_view, ActiveView::All);
            assert_eq!(snapshot.active_workspace, Workspace::Personal);
        }
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(decode("{ not json", loaded_at()).is_err());
    }
}
