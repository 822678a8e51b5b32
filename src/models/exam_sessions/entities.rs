use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

crate::string_enum! {
    pub enum SessionStatus("exam-session.ts") {
        InProgress => "in_progress",
        Submitted => "submitted",
        AutoSubmitted => "auto_submitted",
        Graded => "graded",
    }
}

impl SessionStatus {
    /// 已交卷，可以评分的状态
    pub const FINISHED: &'static [SessionStatus] = &[
        SessionStatus::Submitted,
        SessionStatus::AutoSubmitted,
        SessionStatus::Graded,
    ];

    pub fn is_open(&self) -> bool {
        matches!(self, SessionStatus::InProgress)
    }
}

crate::string_enum! {
    // 监考告警类型，由客户端上报
    pub enum WarningKind("exam-session.ts") {
        TabBlur => "tab_blur",
        ClipboardPaste => "clipboard_paste",
        ClipboardCopy => "clipboard_copy",
        RightClick => "right_click",
        FullscreenExit => "fullscreen_exit",
        Devtools => "devtools",
        MediaStopped => "media_stopped",
        Other => "other",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct ProctoringWarning {
    pub kind: WarningKind,
    pub detail: Option<String>,
    pub at: chrono::DateTime<chrono::Utc>,
}

/// 一次考试作答（每个学生每场考试仅一条）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam-session.ts")]
pub struct ExamSubmission {
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub status: SessionStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    // 开始时刻加考试时长，服务端计算
    pub deadline_at: chrono::DateTime<chrono::Utc>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub elapsed_seconds: Option<i64>,
    // 题目 ID -> 答案；选择题答案为选项下标
    pub answers: HashMap<i64, String>,
    pub warnings: Vec<ProctoringWarning>,
    pub auto_score: Option<f64>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    // 录屏文件的下载令牌
    pub recording_token: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}
