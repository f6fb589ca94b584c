use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::models::{
    display_date, Announcement, Assignment, AssignmentStatus, Course, NewStudent, ScheduleItem,
    StudentRecord,
};

const ROSTER: [(&str, Course, i32, i32, i64); 12] = [
    ("Zeynep Çelik", Course::Biyoloji, 88, 97, 28),
    ("Mustafa Aydın", Course::Kimya, 64, 74, 26),
    ("Fatma Şahin", Course::Tarih, 91, 93, 24),
    ("Ali Öztürk", Course::Matematik, 57, 71, 22),
    ("Seda Arslan", Course::Programlama, 83, 88, 20),
    ("Can Aksoy", Course::Fizik, 72, 80, 18),
    ("Ece Kılıç", Course::Biyoloji, 95, 99, 15),
    ("Burak Yıldız", Course::Tarih, 68, 77, 12),
    ("Deniz Aslan", Course::Kimya, 79, 90, 9),
    ("Elif Çetin", Course::Matematik, 99, 96, 6),
    ("Eren Özkan", Course::Programlama, 61, 73, 4),
    ("Gamze Koç", Course::Fizik, 86, 91, 2),
];

fn assignment(
    id: &str,
    title: &str,
    due_date: &str,
    status: AssignmentStatus,
    grade: Option<i32>,
) -> Assignment {
    Assignment {
        id: id.to_string(),
        title: title.to_string(),
        due_date: due_date.to_string(),
        status,
        grade,
    }
}

fn slot(day: &str, time: &str, course: &str, room: &str) -> ScheduleItem {
    ScheduleItem {
        day: day.to_string(),
        time: time.to_string(),
        course: course.to_string(),
        room: room.to_string(),
    }
}

fn email_for(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .chars()
        .map(|ch| match ch {
            'ç' => 'c',
            'ğ' => 'g',
            'ı' => 'i',
            'ö' => 'o',
            'ş' => 's',
            'ü' => 'u',
            other => other,
        })
        .collect();
    format!("{}@edu.com", folded.split_whitespace().collect::<Vec<_>>().join("."))
}

/// The fixed demo roster. `created_at` values are whole days before `now`.
pub fn sample_students(now: DateTime<Utc>) -> Vec<StudentRecord> {
    use AssignmentStatus::{Completed, InProgress, Planned};

    let now = now.trunc_subsecs(3);
    let days_ago = |days: i64| now - Duration::days(days);

    let mut ahmet =
        NewStudent::new("Ahmet Yılmaz", "ahmet.yilmaz@edu.com", Course::Matematik, 85, 92);
    ahmet.assignments = Some(vec![
        assignment("a1", "Matematik Sınav 1", "10 Mayıs", Completed, Some(85)),
        assignment("a2", "Fizik Proje", "15 Mayıs", InProgress, None),
        assignment("a3", "Programlama Ödevi", "20 Mayıs", Completed, Some(92)),
        assignment("a4", "Matematik Sınav 2", "25 Mayıs", Planned, None),
    ]);
    ahmet.schedule = Some(vec![
        slot("Pazartesi", "09:00", "Matematik", "101"),
        slot("Pazartesi", "11:00", "Fizik", "203"),
        slot("Salı", "10:00", "Kimya", "105"),
        slot("Çarşamba", "09:00", "Programlama", "Lab-1"),
        slot("Perşembe", "13:00", "Matematik", "101"),
        slot("Cuma", "14:00", "Fizik", "203"),
    ]);
    ahmet.performance = Some(vec![65.0, 70.0, 85.0, 75.0, 90.0]);

    let mut ayse = NewStudent::new("Ayşe Demir", "ayse.demir@edu.com", Course::Fizik, 92, 95);
    ayse.assignments = Some(vec![
        assignment("a1", "Fizik Sınav 1", "12 Mayıs", Completed, Some(95)),
        assignment("a2", "Kimya Proje", "18 Mayıs", InProgress, None),
        assignment("a3", "Fizik Laboratuvar", "22 Mayıs", Completed, Some(90)),
    ]);
    ayse.schedule = Some(vec![
        slot("Pazartesi", "09:00", "Fizik", "203"),
        slot("Salı", "11:00", "Matematik", "101"),
        slot("Çarşamba", "10:00", "Biyoloji", "105"),
        slot("Perşembe", "09:00", "Fizik Lab", "Lab-2"),
        slot("Cuma", "13:00", "Kimya", "104"),
    ]);
    ayse.performance = Some(vec![75.0, 82.0, 88.0, 90.0, 92.0]);

    let mut mehmet =
        NewStudent::new("Mehmet Kaya", "mehmet.kaya@edu.com", Course::Programlama, 78, 85);
    mehmet.assignments = Some(vec![
        assignment("a1", "Programlama Sınav 1", "8 Mayıs", Completed, Some(75)),
        assignment("a2", "Web Projesi", "20 Mayıs", InProgress, None),
        assignment("a3", "Algoritma Ödevi", "15 Mayıs", Completed, Some(80)),
    ]);
    mehmet.schedule = Some(vec![
        slot("Pazartesi", "10:00", "Algoritma", "Lab-3"),
        slot("Salı", "13:00", "Programlama", "Lab-1"),
        slot("Çarşamba", "09:00", "Matematik", "101"),
        slot("Perşembe", "14:00", "Veri Yapıları", "Lab-2"),
        slot("Cuma", "11:00", "Web Geliştirme", "Lab-4"),
    ]);
    mehmet.performance = Some(vec![60.0, 68.0, 75.0, 78.0, 82.0]);

    let mut students = vec![
        ahmet.into_record("student_1".to_string(), days_ago(30)),
        ayse.into_record("student_2".to_string(), days_ago(45)),
        mehmet.into_record("student_3".to_string(), days_ago(60)),
    ];

    for (offset, (name, course, grade, attendance, age)) in ROSTER.into_iter().enumerate() {
        let id = format!("student_{}", offset + 4);
        let student = NewStudent::new(name, &email_for(name), course, grade, attendance);
        students.push(student.into_record(id, days_ago(age)));
    }

    students
}

/// Sample announcements, each displayed with the date it was created.
pub fn sample_announcements(now: DateTime<Utc>) -> Vec<Announcement> {
    let now = now.trunc_subsecs(3);
    [
        ("ann_1", "Online Ders", "Yarınki Matematik dersi online yapılacaktır.", 2),
        ("ann_2", "Proje Teslimi", "Programlama projesi son teslim tarihi uzatılmıştır.", 4),
        (
            "ann_3",
            "Sınav Duyurusu",
            "Fizik sınavı 15 Mayıs tarihinde yapılacaktır. Tüm konular dahildir.",
            6,
        ),
        (
            "ann_4",
            "Okul Gezisi",
            "Bilim Müzesi gezisi 20 Mayıs tarihinde gerçekleştirilecektir.",
            8,
        ),
    ]
    .into_iter()
    .map(|(id, title, content, age)| {
        let created_at = now - Duration::days(age);
        Announcement {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            date: display_date(created_at),
            created_at,
        }
    })
    .collect()
}
