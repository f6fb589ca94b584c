use std::cmp::Ordering;

use clap::ValueEnum;

use crate::models::StudentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Name,
    Grade,
    Course,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentSort {
    pub by: SortKey,
    pub direction: SortDirection,
}

impl StudentSort {
    pub fn new(by: SortKey, direction: SortDirection) -> Self {
        Self { by, direction }
    }

    pub fn compare(&self, a: &StudentRecord, b: &StudentRecord) -> Ordering {
        let ordering = match self.by {
            SortKey::Name => locale_compare(&a.name, &b.name),
            SortKey::Grade => a.grade.cmp(&b.grade),
            SortKey::Course => locale_compare(a.course.as_str(), b.course.as_str()),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };

        match self.direction {
            SortDirection::Asc => ordering,
            // Reverse the comparison, not the output, so ties keep input order.
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

pub fn sort(records: &[StudentRecord], spec: &StudentSort) -> Vec<StudentRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| spec.compare(a, b));
    sorted
}

struct CollationKey {
    primary: Vec<char>,
    secondary: Vec<u8>,
    tertiary: Vec<u8>,
}

fn collation_key(value: &str) -> CollationKey {
    let mut key = CollationKey {
        primary: Vec::with_capacity(value.len()),
        secondary: Vec::with_capacity(value.len()),
        tertiary: Vec::with_capacity(value.len()),
    };

    for ch in value.chars() {
        let upper = u8::from(ch.is_uppercase());
        for lower in ch.to_lowercase() {
            if is_combining_mark(lower) {
                if let Some(last) = key.secondary.last_mut() {
                    *last = 1;
                }
                continue;
            }
            let (base, accented) = fold_diacritic(lower);
            key.primary.push(base);
            key.secondary.push(u8::from(accented));
            key.tertiary.push(upper);
        }
    }

    key
}

/// Orders text the way a reader expects: letters first by base form, then by
/// accent, then lowercase before uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let left = collation_key(a);
    let right = collation_key(b);

    left.primary
        .cmp(&right.primary)
        .then_with(|| left.secondary.cmp(&right.secondary))
        .then_with(|| left.tertiary.cmp(&right.tertiary))
        .then_with(|| a.cmp(b))
}

fn is_combining_mark(ch: char) -> bool {
    matches!(ch, '\u{0300}'..='\u{036F}')
}

fn fold_diacritic(ch: char) -> (char, bool) {
    let base = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'ş' | 'š' => 's',
        'ť' | 'ţ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => return (other, false),
    };
    (base, true)
}
