use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::form;
use crate::kv::KeyValueStore;
use crate::models::{Course, NewStudent};
use crate::store::RecordStore;

#[derive(serde::Deserialize)]
struct CsvRow {
    name: String,
    email: String,
    course: String,
    grade: i32,
    attendance: i32,
    photo: Option<String>,
}

/// Adds every row whose email is not already on the roster. Stops at the
/// first malformed or invalid row; rows before it stay inserted.
pub async fn import_csv<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    csv_path: &Path,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;

    let mut known: HashSet<String> = store
        .get_all()
        .await?
        .into_iter()
        .map(|record| record.email.to_lowercase())
        .collect();
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("malformed row on line {line}"))?;

        let course: Course = row
            .course
            .parse()
            .with_context(|| format!("line {line}"))?;
        let mut student = NewStudent::new(&row.name, &row.email, course, row.grade, row.attendance);
        student.photo = row.photo.filter(|url| !url.trim().is_empty());
        form::validate(&student).with_context(|| format!("line {line}"))?;

        if !known.insert(student.email.to_lowercase()) {
            debug!(email = %student.email, "skipping existing student");
            continue;
        }

        store.insert(student).await?;
        inserted += 1;
    }

    info!(inserted, path = %csv_path.display(), "csv import finished");
    Ok(inserted)
}
