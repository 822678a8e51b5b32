//! 限时考试作答
//!
//! 学生端：开始/恢复作答、上报监考告警、保存草稿、提交。
//! 教职端：查看作答列表与详情、人工评分。

mod attempt;
pub mod proctoring;
mod review;

use actix_web::{HttpRequest, Result as ActixResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::exam_sessions::entities::{ExamSubmission, SessionStatus};
use crate::models::exams::entities::{Exam, Question};
use crate::storage::Storage;

use super::not_found;

pub struct ExamSessionService {
    storage: Option<Arc<dyn Storage>>,
}

impl ExamSessionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    pub(crate) fn grace_seconds(&self) -> i64 {
        AppConfig::get().exam.submission_grace_seconds
    }

    pub(crate) fn max_warnings(&self) -> usize {
        AppConfig::get().exam.max_warnings
    }
}

pub(crate) async fn load_exam(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    exam_id: i64,
) -> ActixResult<Exam> {
    storage
        .get_exam(course_id, exam_id)
        .await?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "考试不存在"))
}

/// 惰性过期：超过截止时间加宽限期仍未提交的作答，按已保存的答案自动提交
pub(crate) async fn finalize_if_expired(
    storage: &Arc<dyn Storage>,
    exam: &Exam,
    questions: &[Question],
    submission: ExamSubmission,
    now: DateTime<Utc>,
    grace_seconds: i64,
) -> ActixResult<ExamSubmission> {
    if !submission.status.is_open()
        || !proctoring::is_expired(submission.deadline_at, now, grace_seconds)
    {
        return Ok(submission);
    }

    let update = proctoring::finalize(
        &submission,
        exam,
        questions,
        submission.answers.clone(),
        now,
        grace_seconds,
    );
    info!(
        "考试 {} 学生 {} 作答超时，自动提交",
        exam.id, submission.student_id
    );
    let expected = [SessionStatus::InProgress];
    if let Some(finalized) = storage
        .update_exam_submission(submission.id, &expected, update)
        .await?
    {
        return Ok(finalized);
    }

    // 其他请求已先行提交或评分，以库中的最新状态为准
    Ok(storage
        .get_exam_submission_by_id(submission.id)
        .await?
        .unwrap_or(submission))
}
