//! Hard-coded deployment constants for the pre-registration campaign.

/// Domain appended to the enrollment number to derive the student e-mail.
pub const EMAIL_DOMAIN: &str = "maristabrasil.g12.br";

/// Enrollment number that unlocks the submissions export.
pub const EXPORT_ENROLLMENT: &str = "200291";

/// Accepted birth-year range for submissions, inclusive.
pub const BIRTH_YEAR_MIN: i32 = 2000;
pub const BIRTH_YEAR_MAX: i32 = 2020;

/// Document collections.
pub const STUDENTS: &str = "students";
pub const SUBMISSIONS: &str = "submissions";

/// Store filename inside the selected workspace directory.
pub const STORE_FILENAME: &str = "prereg.sqlite3";

pub fn student_email(enrollment: &str) -> String {
    format!("{}@{}", enrollment, EMAIL_DOMAIN)
}
