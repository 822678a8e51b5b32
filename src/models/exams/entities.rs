use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    pub enum QuestionKind("exam.ts") {
        MultipleChoice => "multiple_choice",
        FreeText => "free_text",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct Exam {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    // 作答时长（分钟）
    pub duration_minutes: i32,
    pub max_score: f64,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub available_until: Option<chrono::DateTime<chrono::Utc>>,
    // 提交前是否要求所有必答题都已作答
    pub require_all_answered: bool,
    // 是否启用监考（切屏、剪贴板等告警）
    pub proctoring_enabled: bool,
    pub published: bool,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Exam {
    /// 考试在给定时刻是否处于开放窗口内
    pub fn is_open_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.available_from.is_none_or(|from| now >= from)
            && self.available_until.is_none_or(|until| now <= until)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct Question {
    pub id: i64,
    pub exam_id: i64,
    // 所属分节，如 "Listening" / "Reading"
    pub section: String,
    pub position: i32,
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<String>,
    // 正确选项下标，学生视图中会被隐藏
    pub correct_option: Option<i32>,
    pub points: f64,
    pub required: bool,
}

impl Question {
    /// 去掉答案信息，供学生作答时使用
    pub fn redacted(mut self) -> Self {
        self.correct_option = None;
        self
    }
}
