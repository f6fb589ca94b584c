use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Course {
    Matematik,
    Fizik,
    Programlama,
    Biyoloji,
    Kimya,
    Tarih,
}

impl Course {
    pub const ALL: [Course; 6] = [
        Course::Matematik,
        Course::Fizik,
        Course::Programlama,
        Course::Biyoloji,
        Course::Kimya,
        Course::Tarih,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Matematik => "Matematik",
            Course::Fizik => "Fizik",
            Course::Programlama => "Programlama",
            Course::Biyoloji => "Biyoloji",
            Course::Kimya => "Kimya",
            Course::Tarih => "Tarih",
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown course '{0}'")]
pub struct UnknownCourse(pub String);

impl FromStr for Course {
    type Err = UnknownCourse;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase();
        Course::ALL
            .into_iter()
            .find(|course| course.as_str().to_lowercase() == needle)
            .ok_or_else(|| UnknownCourse(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[serde(rename = "Tamamlandı", alias = "Completed")]
    Completed,
    #[serde(rename = "Devam Ediyor", alias = "InProgress")]
    InProgress,
    #[serde(rename = "Planlandı", alias = "Planned")]
    Planned,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::InProgress => "in progress",
            AssignmentStatus::Planned => "planned",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub due_date: String,
    pub status: AssignmentStatus,
    /// `None` until the assignment has been graded.
    pub grade: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub day: String,
    pub time: String,
    pub course: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub course: Course,
    pub grade: i32,
    pub attendance: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<Assignment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Vec<f64>>,
}

impl StudentRecord {
    pub fn assignments(&self) -> &[Assignment] {
        self.assignments.as_deref().unwrap_or_default()
    }

    pub fn schedule(&self) -> &[ScheduleItem] {
        self.schedule.as_deref().unwrap_or_default()
    }

    pub fn performance(&self) -> &[f64] {
        self.performance.as_deref().unwrap_or_default()
    }

    /// Every field except `id` and `created_at`.
    pub fn fields(&self) -> NewStudent {
        NewStudent {
            name: self.name.clone(),
            email: self.email.clone(),
            course: self.course,
            grade: self.grade,
            attendance: self.attendance,
            photo: self.photo.clone(),
            assignments: self.assignments.clone(),
            schedule: self.schedule.clone(),
            performance: self.performance.clone(),
        }
    }
}

/// A student as entered by a caller, before the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub course: Course,
    pub grade: i32,
    pub attendance: i32,
    pub photo: Option<String>,
    pub assignments: Option<Vec<Assignment>>,
    pub schedule: Option<Vec<ScheduleItem>>,
    pub performance: Option<Vec<f64>>,
}

impl NewStudent {
    pub fn new(name: &str, email: &str, course: Course, grade: i32, attendance: i32) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            course,
            grade,
            attendance,
            photo: None,
            assignments: None,
            schedule: None,
            performance: None,
        }
    }

    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> StudentRecord {
        StudentRecord {
            id,
            name: self.name,
            email: self.email,
            course: self.course,
            grade: self.grade,
            attendance: self.attendance,
            photo: self.photo,
            created_at,
            assignments: self.assignments,
            schedule: self.schedule,
            performance: self.performance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

const MONTHS: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

/// Day and month name as shown to users, e.g. `5 Mayıs`.
pub fn display_date(at: DateTime<Utc>) -> String {
    format!("{} {}", at.day(), MONTHS[at.month0() as usize])
}

#[derive(Debug, Clone)]
pub struct CourseSummary {
    pub course: Course,
    pub count: usize,
    pub avg_grade: f64,
    pub avg_attendance: f64,
}
