use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    pub enum EnrollmentStatus("enrollment.ts") {
        Active => "active",
        Withdrawn => "withdrawn",
        Completed => "completed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct Enrollment {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub status: EnrollmentStatus,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
