use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    pub enum AssignmentRole("course-assignment.ts") {
        Teacher => "teacher",
        Assistant => "assistant",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course-assignment.ts")]
pub struct CourseAssignment {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    pub role: AssignmentRole,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}
