pub mod extractor;
pub mod file_magic;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod random_code;
pub mod sql;
pub mod validate;

pub use extractor::{
    SafeAttendanceIdI64, SafeCourseIdI64, SafeEnrollmentIdI64, SafeExamIdI64, SafeFileToken,
    SafeGradeIdI64, SafeIDI64, SafeLessonIdI64, SafeReportIdI64, SafeSubmissionIdI64,
    SafeUserIdI64,
};
pub use file_magic::validate_magic_bytes;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;
