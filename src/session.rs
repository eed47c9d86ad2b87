//! The logged-in user, as an owned and versioned context.
//!
//! Screens receive `&Session` to read and `&mut Session` to replace. The record
//! is only ever swapped as a whole; every swap bumps `version`.

use std::sync::Arc;

use crate::model::UserRecord;

#[derive(Clone, Debug, Default)]
pub struct Session {
    current: Option<Arc<UserRecord>>,
    version: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&UserRecord> {
        self.current.as_deref()
    }

    /// Shared handle to the current record, stable across later swaps.
    pub fn snapshot(&self) -> Option<Arc<UserRecord>> {
        self.current.clone()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current().is_some_and(UserRecord::is_admin)
    }

    pub fn replace(&mut self, record: UserRecord) {
        self.current = Some(Arc::new(record));
        self.version += 1;
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            self.version += 1;
        }
    }
}
