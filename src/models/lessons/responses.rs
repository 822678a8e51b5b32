use super::entities::Lesson;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "lesson.ts")]
pub struct LessonListResponse {
    pub items: Vec<Lesson>,
    pub pagination: PaginationInfo,
}
