use super::entities::EnrollmentStatus;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 选课记录（附带学生信息）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentListItem {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub status: EnrollmentStatus,
    pub username: String,
    pub display_name: Option<String>,
    pub email: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentListResponse {
    pub items: Vec<EnrollmentListItem>,
    pub pagination: PaginationInfo,
}
