use thiserror::Error;

use crate::models::NewStudent;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("email '{0}' must contain '@'")]
    InvalidEmail(String),

    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfRange { field: &'static str, value: i32 },
}

/// Checks user input before it reaches the store, which trusts its callers.
pub fn validate(student: &NewStudent) -> Result<(), ValidationError> {
    if student.name.trim().is_empty() {
        return Err(ValidationError::Missing("name"));
    }
    if student.email.trim().is_empty() {
        return Err(ValidationError::Missing("email"));
    }
    if !student.email.contains('@') {
        return Err(ValidationError::InvalidEmail(student.email.clone()));
    }
    check_percentage("grade", student.grade)?;
    check_percentage("attendance", student.attendance)?;
    Ok(())
}

fn check_percentage(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;

    #[test]
    fn accepts_complete_input() {
        let student = NewStudent::new("Ahmet", "ahmet@edu.com", Course::Matematik, 0, 100);
        assert_eq!(validate(&student), Ok(()));
    }

    #[test]
    fn rejects_blank_fields() {
        let student = NewStudent::new("  ", "a@e.com", Course::Fizik, 80, 90);
        assert_eq!(validate(&student), Err(ValidationError::Missing("name")));

        let student = NewStudent::new("A", "", Course::Fizik, 80, 90);
        assert_eq!(validate(&student), Err(ValidationError::Missing("email")));
    }

    #[test]
    fn rejects_email_without_at() {
        let student = NewStudent::new("A", "a.edu.com", Course::Fizik, 80, 90);
        assert!(matches!(
            validate(&student),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        let student = NewStudent::new("A", "a@e.com", Course::Fizik, 101, 90);
        assert_eq!(
            validate(&student),
            Err(ValidationError::OutOfRange {
                field: "grade",
                value: 101
            })
        );

        let student = NewStudent::new("A", "a@e.com", Course::Fizik, 80, -1);
        assert_eq!(
            validate(&student),
            Err(ValidationError::OutOfRange {
                field: "attendance",
                value: -1
            })
        );
    }
}
