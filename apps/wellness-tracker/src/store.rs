//! Entry store: one entry per calendar day with create-or-update by date.
//!
//! The store is the only writer of [`DailyEntry`] records. Every mutation is
//! written through to the injected [`EntryPersistence`] before returning.

use crate::dates;
use crate::models::{DailyEntry, EntryDraft};
use crate::storage::{EntryPersistence, StorageError};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Entry store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid entry: {0}")]
    InvalidDraft(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whether an upsert created a new day or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Daily entries, kept sorted by date with the newest first.
pub struct EntryStore<P> {
    persistence: P,
    entries: Vec<DailyEntry>,
}

impl<P: EntryPersistence> EntryStore<P> {
    /// Load the stored collection. Missing or unreadable data starts empty.
    pub fn open(persistence: P) -> Self {
        let entries = persistence.load();
        tracing::info!(count = entries.len(), "Loaded wellness entries");
        Self {
            persistence,
            entries,
        }
    }

    /// All entries, newest date first.
    pub fn entries(&self) -> &[DailyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The backing persistence collaborator.
    #[cfg(test)]
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Entry for `date`, if one was logged.
    pub fn find_by_date(&self, date: NaiveDate) -> Option<&DailyEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    /// Entry for the reference day.
    pub fn today_entry(&self, today: NaiveDate) -> Option<&DailyEntry> {
        self.find_by_date(today)
    }

    /// Entries dated within the last `days` days of `today`, newest first.
    pub fn recent(&self, days: i64, today: NaiveDate) -> Vec<&DailyEntry> {
        let cutoff = dates::add_days(today, -days);
        self.entries.iter().filter(|e| e.date >= cutoff).collect()
    }

    /// Create or update the entry for `draft.date`, stamped with the current time.
    pub fn upsert(&mut self, draft: EntryDraft) -> StoreResult<UpsertOutcome> {
        self.upsert_at(draft, Utc::now())
    }

    /// Create or update the entry for `draft.date`.
    ///
    /// An existing entry keeps its `id` and `created_at`; everything else is
    /// replaced and `updated_at` becomes `now`. A new entry gets a fresh id
    /// and both timestamps set to `now`.
    ///
    /// If saving fails the in-memory change is kept and the error returned.
    pub fn upsert_at(&mut self, draft: EntryDraft, now: DateTime<Utc>) -> StoreResult<UpsertOutcome> {
        validate(&draft)?;

        let date = draft.date;
        let outcome = match self.entries.iter_mut().find(|e| e.date == date) {
            Some(entry) => {
                entry.apply(draft, now);
                tracing::debug!(%date, id = %entry.id, "Updated entry");
                UpsertOutcome::Updated
            }
            None => {
                let entry = DailyEntry::new(draft, now);
                tracing::debug!(%date, id = %entry.id, "Created entry");
                self.entries.push(entry);
                self.entries.sort_by(|a, b| b.date.cmp(&a.date));
                UpsertOutcome::Created
            }
        };

        self.persist()?;
        Ok(outcome)
    }

    /// Delete the entry for `date`. Returns the removed entry, or `None`
    /// without touching storage when nothing was logged that day.
    pub fn remove_by_date(&mut self, date: NaiveDate) -> StoreResult<Option<DailyEntry>> {
        let Some(index) = self.entries.iter().position(|e| e.date == date) else {
            return Ok(None);
        };

        let removed = self.entries.remove(index);
        tracing::info!(%date, id = %removed.id, "Deleted entry");
        self.persist()?;
        Ok(Some(removed))
    }

    fn persist(&self) -> StoreResult<()> {
        if let Err(e) = self.persistence.save(&self.entries) {
            tracing::warn!(error = %e, "Failed to save entries");
            return Err(e.into());
        }
        Ok(())
    }
}

fn validate(draft: &EntryDraft) -> StoreResult<()> {
    if !draft.sleep.is_finite() {
        return Err(StoreError::InvalidDraft(format!(
            "sleep must be a finite number of hours, got {}",
            draft.sleep
        )));
    }
    if !draft.movement.is_finite() {
        return Err(StoreError::InvalidDraft(format!(
            "movement must be a finite number of minutes, got {}",
            draft.movement
        )));
    }
    Ok(())
}
