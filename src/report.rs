use std::collections::HashMap;
use std::fmt::Write;

use crate::models::{AssignmentStatus, Course, CourseSummary, StudentRecord};

pub fn summarize_by_course(records: &[StudentRecord]) -> Vec<CourseSummary> {
    let mut map: HashMap<Course, (usize, i64, i64)> = HashMap::new();

    for record in records {
        let entry = map.entry(record.course).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 += i64::from(record.grade);
        entry.2 += i64::from(record.attendance);
    }

    let mut summaries: Vec<CourseSummary> = map
        .into_iter()
        .map(|(course, (count, total_grade, total_attendance))| CourseSummary {
            course,
            count,
            avg_grade: total_grade as f64 / count as f64,
            avg_attendance: total_attendance as f64 / count as f64,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.course.as_str().cmp(b.course.as_str()))
    });
    summaries
}

pub fn tally_assignments(records: &[StudentRecord]) -> [(AssignmentStatus, usize); 3] {
    let mut tally = [
        (AssignmentStatus::Completed, 0),
        (AssignmentStatus::InProgress, 0),
        (AssignmentStatus::Planned, 0),
    ];
    for assignment in records.iter().flat_map(|record| record.assignments()) {
        if let Some(slot) = tally.iter_mut().find(|(status, _)| *status == assignment.status) {
            slot.1 += 1;
        }
    }
    tally
}

/// Renders `records` in the order given.
pub fn build_report(label: Option<&str>, records: &[StudentRecord]) -> String {
    let summaries = summarize_by_course(records);

    let mut output = String::new();
    let label = label.unwrap_or("all students");

    let _ = writeln!(output, "# Student Roster Report");
    let _ = writeln!(output, "Generated for {} ({} students)", label, records.len());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Course Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No students match this view.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} students (avg grade {:.1}, avg attendance {:.1}%)",
                summary.course, summary.count, summary.avg_grade, summary.avg_attendance
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Roster");

    if records.is_empty() {
        let _ = writeln!(output, "No students match this view.");
    } else {
        for record in records {
            let _ = writeln!(
                output,
                "- {} ({}, {}) grade {} attendance {}%",
                record.name, record.email, record.course, record.grade, record.attendance
            );
        }
    }

    let tally = tally_assignments(records);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignments");

    if tally.iter().all(|(_, count)| *count == 0) {
        let _ = writeln!(output, "No assignments recorded.");
    } else {
        for (status, count) in tally {
            let _ = writeln!(output, "- {status}: {count}");
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use chrono::Utc;

    fn student(name: &str, course: Course, grade: i32, attendance: i32) -> StudentRecord {
        crate::models::NewStudent::new(name, "x@edu.com", course, grade, attendance)
            .into_record(name.to_string(), Utc::now())
    }

    #[test]
    fn course_summary_averages_and_orders() {
        let records = vec![
            student("a", Course::Tarih, 80, 90),
            student("b", Course::Fizik, 70, 80),
            student("c", Course::Fizik, 91, 100),
            student("d", Course::Biyoloji, 60, 70),
        ];

        let summaries = summarize_by_course(&records);
        let order: Vec<Course> = summaries.iter().map(|s| s.course).collect();
        assert_eq!(order, vec![Course::Fizik, Course::Biyoloji, Course::Tarih]);
        assert_eq!(summaries[0].count, 2);
        assert!((summaries[0].avg_grade - 80.5).abs() < 0.001);
        assert!((summaries[0].avg_attendance - 90.0).abs() < 0.001);
    }

    #[test]
    fn assignment_tally_counts_sample_data() {
        let tally = tally_assignments(&seed::sample_students(Utc::now()));
        assert_eq!(
            tally,
            [
                (AssignmentStatus::Completed, 6),
                (AssignmentStatus::InProgress, 3),
                (AssignmentStatus::Planned, 1),
            ]
        );
    }

    #[test]
    fn report_lists_students_in_given_order() {
        let records = vec![
            student("Zeynep", Course::Kimya, 88, 97),
            student("Ahmet", Course::Kimya, 85, 92),
        ];
        let report = build_report(Some("Kimya"), &records);

        assert!(report.starts_with("# Student Roster Report\nGenerated for Kimya (2 students)"));
        let zeynep = report.find("- Zeynep").unwrap();
        let ahmet = report.find("- Ahmet").unwrap();
        assert!(zeynep < ahmet);
        assert!(report.contains("- Kimya: 2 students (avg grade 86.5, avg attendance 94.5%)"));
        assert!(report.contains("No assignments recorded."));
    }

    #[test]
    fn empty_report_says_so() {
        let report = build_report(None, &[]);
        assert!(report.contains("Generated for all students (0 students)"));
        assert!(report.contains("No students match this view."));
    }
}
