use super::entities::AssignmentRole;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "course-assignment.ts")]
pub struct AssignmentListItem {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    pub role: AssignmentRole,
    pub username: String,
    pub display_name: Option<String>,
    pub email: String,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course-assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<AssignmentListItem>,
}
