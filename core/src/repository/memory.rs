use std::cell::RefCell;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::model::snapshot::StoreSnapshot;
use crate::repository::record::{decode, encode};
use crate::repository::traits::StateRepository;

/// Keeps the serialized state in memory. Goes through the same encoding as
/// the file repository.
#[derive(Debug, Default)]
pub struct MemoryStateRepository {
    json: RefCell<Option<String>>,
    saves: RefCell<usize>,
}

impl MemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: RefCell::new(Some(json.into())),
            saves: RefCell::new(0),
        }
    }

    pub fn json(&self) -> Option<String> {
        self.json.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl StateRepository for MemoryStateRepository {
    fn load(&self, loaded_at: DateTime<Utc>) -> Result<Option<StoreSnapshot>> {
        match self.json.borrow().as_deref() {
            Some(json) => Ok(Some(decode(json, loaded_at)?)),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let json = encode(snapshot)?;
        *self.json.borrow_mut() = Some(json);
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
