use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::filter::StudentFilter;
use crate::kv::{KeyValueStore, MemoryStore, INITIALIZED_KEY};
use crate::models::StudentRecord;
use crate::seed;
use crate::sort::StudentSort;
use crate::store::RecordStore;

pub async fn is_initialized<S: KeyValueStore>(
    store: &RecordStore<S>,
) -> Result<bool, StorageError> {
    Ok(store.kv().get(INITIALIZED_KEY).await?.is_some())
}

/// Seeds the sample roster and announcements on first use, then records the
/// marker. Collections that already hold data are left alone. Returns whether
/// this call performed the initialization.
pub async fn ensure_seeded<S: KeyValueStore>(
    store: &mut RecordStore<S>,
) -> Result<bool, StorageError> {
    if is_initialized(store).await? {
        debug!("storage already initialized");
        return Ok(false);
    }

    let now = Utc::now();

    if store.get_all().await?.is_empty() {
        let students = seed::sample_students(now);
        store.replace_all(&students).await?;
        info!(count = students.len(), "seeded sample students");
    }

    if store.announcements().await?.is_empty() {
        let announcements = seed::sample_announcements(now);
        store.replace_announcements(&announcements).await?;
        info!(count = announcements.len(), "seeded sample announcements");
    }

    store.kv().set(INITIALIZED_KEY, "true").await?;
    Ok(true)
}

/// Records for a roster listing, plus the storage error that forced the
/// sample roster in their place, if any.
#[derive(Debug)]
pub struct RosterView {
    pub records: Vec<StudentRecord>,
    pub fallback_reason: Option<StorageError>,
}

/// Seeds and reads `opened`. Failing to open, seed or read the store yields
/// the sample roster through the same filter and sort instead.
pub async fn view_or_sample<S: KeyValueStore>(
    opened: Result<RecordStore<S>, StorageError>,
    filter_spec: &StudentFilter,
    sort_spec: Option<&StudentSort>,
) -> Result<RosterView, StorageError> {
    let attempt = match opened {
        Ok(mut store) => seeded_view(&mut store, filter_spec, sort_spec).await,
        Err(err) => Err(err),
    };

    match attempt {
        Ok(records) => Ok(RosterView {
            records,
            fallback_reason: None,
        }),
        Err(err) => {
            warn!(error = %err, "storage unavailable, using sample roster");
            let records = sample_view(filter_spec, sort_spec).await?;
            Ok(RosterView {
                records,
                fallback_reason: Some(err),
            })
        }
    }
}

async fn seeded_view<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    filter_spec: &StudentFilter,
    sort_spec: Option<&StudentSort>,
) -> Result<Vec<StudentRecord>, StorageError> {
    ensure_seeded(store).await?;
    store.roster_view(filter_spec, sort_spec).await
}

async fn sample_view(
    filter_spec: &StudentFilter,
    sort_spec: Option<&StudentSort>,
) -> Result<Vec<StudentRecord>, StorageError> {
    let mut memory = RecordStore::new(MemoryStore::new());
    ensure_seeded(&mut memory).await?;
    memory.roster_view(filter_spec, sort_spec).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{FileStore, STUDENTS_KEY};
    use crate::models::{Course, NewStudent};
    use crate::sort::{SortDirection, SortKey};

    #[tokio::test]
    async fn seeds_once() {
        let mut store = RecordStore::new(MemoryStore::new());
        assert!(!is_initialized(&store).await.unwrap());

        assert!(ensure_seeded(&mut store).await.unwrap());
        assert!(is_initialized(&store).await.unwrap());
        assert_eq!(store.get_all().await.unwrap().len(), 15);
        assert_eq!(store.announcements().await.unwrap().len(), 4);

        let snapshot = store.kv().get(STUDENTS_KEY).await.unwrap();
        assert!(!ensure_seeded(&mut store).await.unwrap());
        assert_eq!(store.kv().get(STUDENTS_KEY).await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn emptied_roster_is_not_reseeded() {
        let mut store = RecordStore::new(MemoryStore::new());
        ensure_seeded(&mut store).await.unwrap();

        for student in store.get_all().await.unwrap() {
            store.delete(&student.id).await.unwrap();
        }

        assert!(!ensure_seeded(&mut store).await.unwrap());
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_students_are_kept() {
        let mut store = RecordStore::new(MemoryStore::new());
        let existing = store
            .insert(NewStudent::new("A", "a@e.com", Course::Fizik, 80, 90))
            .await
            .unwrap();

        assert!(ensure_seeded(&mut store).await.unwrap());
        assert_eq!(store.get_all().await.unwrap(), vec![existing]);
        assert_eq!(store.announcements().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn unopenable_storage_lists_sample_roster() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let opened = FileStore::open(blocker.path().join("sub"))
            .await
            .map(RecordStore::new);
        assert!(opened.is_err());

        let filter_spec = StudentFilter {
            course: Some("fizik".to_string()),
            ..Default::default()
        };
        let sort_spec = StudentSort::new(SortKey::Grade, SortDirection::Desc);
        let roster = view_or_sample(opened, &filter_spec, Some(&sort_spec))
            .await
            .unwrap();

        assert!(matches!(roster.fallback_reason, Some(StorageError::Io { .. })));
        let grades: Vec<i32> = roster.records.iter().map(|r| r.grade).collect();
        assert_eq!(grades, vec![92, 86, 72]);
        assert!(roster.records.iter().all(|r| r.course == Course::Fizik));
    }

    #[tokio::test]
    async fn corrupted_storage_lists_sample_roster() {
        let store = RecordStore::new(MemoryStore::new());
        store.kv().set(STUDENTS_KEY, "{not json").await.unwrap();

        let roster = view_or_sample(Ok(store), &StudentFilter::default(), None)
            .await
            .unwrap();

        assert!(matches!(
            roster.fallback_reason,
            Some(StorageError::Corrupt { .. })
        ));
        assert_eq!(roster.records.len(), 15);
    }

    #[tokio::test]
    async fn healthy_storage_is_seeded_and_listed() {
        let dir = tempfile::tempdir().unwrap();
        let opened = FileStore::open(dir.path()).await.map(RecordStore::new);

        let roster = view_or_sample(opened, &StudentFilter::default(), None)
            .await
            .unwrap();
        assert!(roster.fallback_reason.is_none());
        assert_eq!(roster.records.len(), 15);

        let reopened = RecordStore::new(FileStore::open(dir.path()).await.unwrap());
        assert!(is_initialized(&reopened).await.unwrap());
        assert_eq!(reopened.get_all().await.unwrap(), roster.records);
    }
}
