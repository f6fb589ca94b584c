use crate::models::StudentRecord;

/// Every present field must hold for a record to pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub course: Option<String>,
    pub min_grade: Option<i32>,
    pub max_grade: Option<i32>,
}

impl StudentFilter {
    pub fn matches(&self, record: &StudentRecord) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !record.name.to_lowercase().contains(&needle)
                && !record.email.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(course) = &self.course {
            if record.course.as_str().to_lowercase() != course.to_lowercase() {
                return false;
            }
        }

        if self.min_grade.is_some_and(|min| record.grade < min) {
            return false;
        }

        if self.max_grade.is_some_and(|max| record.grade > max) {
            return false;
        }

        true
    }
}

pub fn filter(records: &[StudentRecord], spec: &StudentFilter) -> Vec<StudentRecord> {
    records
        .iter()
        .filter(|record| spec.matches(record))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, NewStudent};
    use chrono::Utc;

    fn student(id: &str, name: &str, email: &str, course: Course, grade: i32) -> StudentRecord {
        NewStudent::new(name, email, course, grade, 90).into_record(id.to_string(), Utc::now())
    }

    fn roster() -> Vec<StudentRecord> {
        vec![
            student("1", "Ahmet Yılmaz", "ahmet.yilmaz@edu.com", Course::Matematik, 85),
            student("2", "Ayşe Demir", "ayse.demir@edu.com", Course::Fizik, 92),
            student("3", "Mehmet Kaya", "mehmet.kaya@edu.com", Course::Programlama, 78),
            student("4", "Zeynep Çelik", "zeynep@school.org", Course::Matematik, 70),
            student("5", "Can Aksoy", "can.aksoy@edu.com", Course::Kimya, 90),
            student("6", "Ece Kılıç", "ece.kilic@edu.com", Course::Matematik, 55),
        ]
    }

    fn ids(records: &[StudentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_returns_input_unchanged() {
        let records = roster();
        let spec = StudentFilter::default();
        assert_eq!(filter(&records, &spec), records);
    }

    #[test]
    fn course_matches_case_insensitively() {
        let spec = StudentFilter {
            course: Some("matematik".to_string()),
            ..Default::default()
        };
        let result = filter(&roster(), &spec);
        assert_eq!(ids(&result), vec!["1", "4", "6"]);
        assert!(result.iter().all(|r| r.course == Course::Matematik));
    }

    #[test]
    fn unknown_course_matches_nothing() {
        let spec = StudentFilter {
            course: Some("Astronomi".to_string()),
            ..Default::default()
        };
        assert!(filter(&roster(), &spec).is_empty());
    }

    #[test]
    fn grade_bounds_are_inclusive() {
        let spec = StudentFilter {
            min_grade: Some(70),
            max_grade: Some(90),
            ..Default::default()
        };
        let result = filter(&roster(), &spec);
        assert_eq!(ids(&result), vec!["1", "3", "4", "5"]);
        assert!(result.iter().all(|r| (70..=90).contains(&r.grade)));
    }

    #[test]
    fn search_checks_name_or_email() {
        let by_name = StudentFilter {
            search: Some("DEMIR".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&roster(), &by_name)), vec!["2"]);

        let by_email = StudentFilter {
            search: Some("school.org".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&roster(), &by_email)), vec!["4"]);
    }

    #[test]
    fn fields_combine_with_and() {
        let spec = StudentFilter {
            search: Some("edu.com".to_string()),
            course: Some("Matematik".to_string()),
            min_grade: Some(60),
            max_grade: None,
        };
        assert_eq!(ids(&filter(&roster(), &spec)), vec!["1"]);
    }
}
