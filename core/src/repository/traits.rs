use crate::model::snapshot::StoreSnapshot;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Whole-state persistence for the task store.
pub trait StateRepository {
    /// Returns `None` when nothing has been saved yet. `loaded_at` fills in
    /// creation times that cannot be recovered from storage.
    fn load(&self, loaded_at: DateTime<Utc>) -> Result<Option<StoreSnapshot>>;
    fn save(&self, snapshot: &StoreSnapshot) -> Result<()>;
}
