use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    pub enum ReportKind("report.ts") {
        Academic => "academic",
        Attendance => "attendance",
        Behavior => "behavior",
        General => "general",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct Report {
    pub id: i64,
    pub course_id: Option<i64>,
    pub author_id: i64,
    pub title: String,
    pub kind: ReportKind,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
