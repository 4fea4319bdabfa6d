// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Publication registry
//!
//! Registration takes `&mut self`, so it can only happen while the registry is
//! exclusively owned (startup). Once populated, the registry is shared behind an
//! `Arc` and only read.

use crate::error::{ExecutionError, RegistrationError};
use crate::publication::PublicationRecord;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name → record mapping of every published operation
#[derive(Debug, Default)]
pub struct PublicationRegistry {
    records: BTreeMap<String, Arc<PublicationRecord>>,
}

impl PublicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; an existing entry with the same name is kept and the call fails.
    pub fn register(
        &mut self,
        record: PublicationRecord,
    ) -> Result<Arc<PublicationRecord>, RegistrationError> {
        if self.records.contains_key(record.name()) {
            return Err(RegistrationError::DuplicateName {
                name: record.name().to_string(),
            });
        }
        let record = Arc::new(record);
        self.records.insert(record.name().to_string(), Arc::clone(&record));
        Ok(record)
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<PublicationRecord>, ExecutionError> {
        self.records
            .get(name)
            .cloned()
            .ok_or_else(|| ExecutionError::NotFound(name.to_string()))
    }

    /// All records, ordered by name
    pub fn list_all(&self) -> Vec<Arc<PublicationRecord>> {
        self.records.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
