use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// position 缺省时追加到课程末尾
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "lesson.ts")]
pub struct CreateLessonRequest {
    pub title: String,
    pub content: Option<String>,
    pub position: Option<i32>,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "lesson.ts")]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub position: Option<i32>,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "lesson.ts")]
pub struct LessonListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LessonListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
}
