//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod attendance_records;
pub mod course_assignments;
pub mod courses;
pub mod enrollments;
pub mod exam_questions;
pub mod exam_submissions;
pub mod exams;
pub mod files;
pub mod grade_records;
pub mod lessons;
pub mod pqrs;
pub mod reports;
pub mod users;

use chrono::{DateTime, Utc};

/// Unix 秒转 UTC 时间
pub(crate) fn from_ts(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
