use super::entities::{SessionStatus, WarningKind};
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use std::collections::HashMap;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct RecordWarningRequest {
    pub kind: WarningKind,
    pub detail: Option<String>,
}

// 中途保存答案，按题目合并
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct SaveAnswersRequest {
    pub answers: HashMap<i64, String>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct SubmitExamRequest {
    #[serde(default)]
    pub answers: HashMap<i64, String>,
    pub recording_token: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct GradeSubmissionRequest {
    pub score: f64,
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct SubmissionListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<SessionStatus>,
}

// 作答更新（用于存储层），None 表示不修改
#[derive(Debug, Clone, Default)]
pub struct SubmissionUpdate {
    pub status: Option<SessionStatus>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub elapsed_seconds: Option<i64>,
    pub answers: Option<HashMap<i64, String>>,
    pub warnings: Option<Vec<super::entities::ProctoringWarning>>,
    pub auto_score: Option<f64>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub recording_token: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 追加监考告警的结果
#[derive(Debug, Clone)]
pub enum WarningAppend {
    Recorded(super::entities::ExamSubmission),
    LimitReached,
    // 作答已结束或不存在
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub status: Option<SessionStatus>,
}
