use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    // 请求、投诉、申诉、建议
    pub enum PqrKind("pqr.ts") {
        Petition => "petition",
        Complaint => "complaint",
        Claim => "claim",
        Suggestion => "suggestion",
    }
}

crate::string_enum! {
    pub enum PqrStatus("pqr.ts") {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

impl PqrStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, PqrStatus::Resolved | PqrStatus::Closed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "pqr.ts")]
pub struct Pqr {
    pub id: i64,
    pub requester_id: i64,
    pub course_id: Option<i64>,
    // 处理人；关联课程时默认为课程主讲教师
    pub assignee_id: Option<i64>,
    pub kind: PqrKind,
    pub subject: String,
    pub description: String,
    pub status: PqrStatus,
    pub response: Option<String>,
    pub responded_by: Option<i64>,
    pub responded_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
