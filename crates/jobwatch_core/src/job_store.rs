use std::collections::HashMap;

use thiserror::Error;

use crate::job::{JobKey, JobRecord, JobStage};

/// A job as held by the store: the merged record plus how far it has progressed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJob {
    /// Key the job was first stored under.
    pub key: JobKey,
    pub stage: JobStage,
    pub record: JobRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First sighting of this identity; the view prepends it and bumps its count.
    Inserted,
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpsertError {
    #[error("record has no url, id or title to identify it")]
    MissingIdentity,
}

/// Keyed collection of job records with merge-on-conflict semantics.
///
/// Records keep insertion order. Every url and id a record has carried is indexed, so a
/// later event that only repeats the id still lands on the same record; url matches win
/// over id matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobStore {
    jobs: Vec<StoredJob>,
    index: HashMap<JobKey, usize>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(
        &mut self,
        record: JobRecord,
        stage: JobStage,
    ) -> Result<UpsertOutcome, UpsertError> {
        let lookup = record.lookup_keys();
        if lookup.is_empty() {
            return Err(UpsertError::MissingIdentity);
        }

        let existing = lookup.iter().find_map(|key| self.index.get(key).copied());
        match existing {
            Some(position) => {
                let job = &mut self.jobs[position];
                job.record.merge_from(record);
                job.stage = job.stage.max(stage);
                let aliases = job.record.lookup_keys();
                self.register(aliases, position);
                Ok(UpsertOutcome::Merged)
            }
            None => {
                let key = record
                    .identity()
                    .ok_or(UpsertError::MissingIdentity)?;
                let position = self.jobs.len();
                self.jobs.push(StoredJob { key, stage, record });
                self.register(lookup, position);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    fn register(&mut self, keys: Vec<JobKey>, position: usize) {
        for key in keys {
            self.index.entry(key).or_insert(position);
        }
    }

    pub fn get(&self, key: &JobKey) -> Option<&StoredJob> {
        self.index.get(key).map(|&position| &self.jobs[position])
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StoredJob> {
        self.jobs.iter()
    }

    /// Owned point-in-time copy; later upserts do not affect it.
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            jobs: self.jobs.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
        self.index.clear();
    }
}

/// Immutable copy of the store contents in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobSnapshot {
    jobs: Vec<StoredJob>,
}

impl JobSnapshot {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[StoredJob] {
        &self.jobs
    }

    pub fn records(&self) -> impl Iterator<Item = &JobRecord> {
        self.jobs.iter().map(|job| &job.record)
    }
}
