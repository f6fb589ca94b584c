use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StorageError;
use crate::filter::{self, StudentFilter};
use crate::kv::{KeyValueStore, ANNOUNCEMENTS_KEY, STUDENTS_KEY};
use crate::models::{display_date, Announcement, NewStudent, StudentRecord};
use crate::sort::{self, StudentSort};

/// The persisted student roster.
///
/// Every operation reads the whole collection and every mutation writes the
/// whole collection back. Mutations take `&mut self`, which serialises writers
/// sharing one handle; separate handles over the same storage can still clobber
/// each other's writes.
#[derive(Debug)]
pub struct RecordStore<S> {
    kv: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StorageError> {
        match self.kv.get(key).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(items).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, &raw).await
    }

    pub async fn get_all(&self) -> Result<Vec<StudentRecord>, StorageError> {
        self.load(STUDENTS_KEY).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<StudentRecord>, StorageError> {
        let records = self.get_all().await?;
        Ok(records.into_iter().find(|record| record.id == id))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<StudentRecord>, StorageError> {
        let needle = email.to_lowercase();
        let records = self.get_all().await?;
        Ok(records
            .into_iter()
            .find(|record| record.email.to_lowercase() == needle))
    }

    pub async fn insert(&mut self, student: NewStudent) -> Result<StudentRecord, StorageError> {
        let mut records = self.get_all().await?;

        let mut id = Uuid::new_v4().to_string();
        while records.iter().any(|record| record.id == id) {
            id = Uuid::new_v4().to_string();
        }
        let created_at = next_timestamp(records.iter().map(|record| record.created_at));

        let record = student.into_record(id, created_at);
        records.push(record.clone());
        self.save(STUDENTS_KEY, &records).await?;

        info!(id = %record.id, course = %record.course, "student added");
        Ok(record)
    }

    /// Replaces the stored record with the same id. `created_at` always comes
    /// from the stored record. Returns `None`, without writing, for an unknown id.
    pub async fn update(
        &mut self,
        record: StudentRecord,
    ) -> Result<Option<StudentRecord>, StorageError> {
        let mut records = self.get_all().await?;
        let Some(slot) = records.iter_mut().find(|existing| existing.id == record.id) else {
            debug!(id = %record.id, "update skipped, no such student");
            return Ok(None);
        };

        let updated = StudentRecord {
            created_at: slot.created_at,
            ..record
        };
        *slot = updated.clone();
        self.save(STUDENTS_KEY, &records).await?;

        info!(id = %updated.id, "student updated");
        Ok(Some(updated))
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool, StorageError> {
        let mut records = self.get_all().await?;
        let before = records.len();
        records.retain(|record| record.id != id);

        if records.len() == before {
            debug!(id, "delete skipped, no such student");
            return Ok(false);
        }

        self.save(STUDENTS_KEY, &records).await?;
        info!(id, "student deleted");
        Ok(true)
    }

    pub(crate) async fn replace_all(
        &mut self,
        records: &[StudentRecord],
    ) -> Result<(), StorageError> {
        self.save(STUDENTS_KEY, records).await
    }

    /// Filter then sort, without touching storage.
    pub async fn roster_view(
        &self,
        filter_spec: &StudentFilter,
        sort_spec: Option<&StudentSort>,
    ) -> Result<Vec<StudentRecord>, StorageError> {
        let records = self.get_all().await?;
        let filtered = filter::filter(&records, filter_spec);
        Ok(match sort_spec {
            Some(spec) => sort::sort(&filtered, spec),
            None => filtered,
        })
    }

    pub async fn announcements(&self) -> Result<Vec<Announcement>, StorageError> {
        self.load(ANNOUNCEMENTS_KEY).await
    }

    pub async fn recent_announcements(
        &self,
        limit: usize,
    ) -> Result<Vec<Announcement>, StorageError> {
        let mut announcements = self.announcements().await?;
        announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        announcements.truncate(limit);
        Ok(announcements)
    }

    pub async fn post_announcement(
        &mut self,
        title: &str,
        content: &str,
    ) -> Result<Announcement, StorageError> {
        let mut announcements = self.announcements().await?;
        let created_at = next_timestamp(announcements.iter().map(|a| a.created_at));

        let announcement = Announcement {
            id: format!("ann_{}", Uuid::new_v4().simple()),
            title: title.to_string(),
            content: content.to_string(),
            date: display_date(created_at),
            created_at,
        };
        announcements.push(announcement.clone());
        self.save(ANNOUNCEMENTS_KEY, &announcements).await?;

        info!(id = %announcement.id, "announcement posted");
        Ok(announcement)
    }

    pub(crate) async fn replace_announcements(
        &mut self,
        announcements: &[Announcement],
    ) -> Result<(), StorageError> {
        self.save(ANNOUNCEMENTS_KEY, announcements).await
    }
}

/// Millisecond precision, never earlier than anything already stored.
fn next_timestamp(existing: impl Iterator<Item = DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(3);
    existing.fold(now, |latest, stamp| latest.max(stamp))
}
