use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lesson.ts")]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content: Option<String>,
    // 课时顺序，从 1 开始
    pub position: i32,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    // 附件下载令牌
    pub attachments: Vec<String>,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
