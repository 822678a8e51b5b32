use super::entities::{ExamSubmission, SessionStatus};
use crate::models::common::PaginationInfo;
use crate::models::exams::responses::ExamDetailResponse;
use serde::Serialize;
use ts_rs::TS;

// 开始/恢复作答时返回的会话，题目已去除答案
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct ExamSessionResponse {
    pub submission: ExamSubmission,
    pub remaining_seconds: i64,
    pub exam: ExamDetailResponse,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct WarningRecordedResponse {
    pub warning_count: usize,
    pub remaining_seconds: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct UnansweredQuestionsResponse {
    pub unanswered: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct SubmissionListItem {
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub status: SessionStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub elapsed_seconds: Option<i64>,
    pub auto_score: Option<f64>,
    pub score: Option<f64>,
    pub warning_count: usize,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct SubmissionListResponse {
    pub items: Vec<SubmissionListItem>,
    pub pagination: PaginationInfo,
}
