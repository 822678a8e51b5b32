use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::{ExamSessionService, finalize_if_expired, load_exam, proctoring};
use crate::errors::SchoolError;
use crate::models::enrollments::entities::EnrollmentStatus;
use crate::models::exam_sessions::entities::{ExamSubmission, ProctoringWarning, SessionStatus};
use crate::models::exam_sessions::requests::{
    RecordWarningRequest, SaveAnswersRequest, SubmitExamRequest, WarningAppend,
};
use crate::models::exam_sessions::responses::{
    ExamSessionResponse, UnansweredQuestionsResponse, WarningRecordedResponse,
};
use crate::models::exams::entities::{Exam, Question};
use crate::models::exams::responses::ExamDetailResponse;
use crate::models::files::entities::FileBucket;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, conflict, current_user, forbidden, not_found};
use crate::storage::Storage;

fn session_response(
    exam: Exam,
    questions: Vec<Question>,
    submission: ExamSubmission,
) -> ExamSessionResponse {
    let remaining_seconds = proctoring::remaining_seconds(&submission, Utc::now());
    let questions = questions.into_iter().map(|q| q.redacted()).collect();
    ExamSessionResponse {
        submission,
        remaining_seconds,
        exam: ExamDetailResponse::new(exam, questions),
    }
}

/// 当前学生在该考试中进行中的作答；已超时的会先被自动提交，随后按已结束处理
async fn open_attempt(
    service: &ExamSessionService,
    storage: &Arc<dyn Storage>,
    exam: &Exam,
    questions: &[Question],
    user: &User,
) -> ActixResult<ExamSubmission> {
    let submission = storage
        .get_exam_submission(exam.id, user.id)
        .await?
        .ok_or_else(|| not_found(ErrorCode::ExamSessionNotFound, "尚未开始作答"))?;

    let submission = finalize_if_expired(
        storage,
        exam,
        questions,
        submission,
        Utc::now(),
        service.grace_seconds(),
    )
    .await?;

    if !submission.status.is_open() {
        return Err(conflict(ErrorCode::ExamSessionClosed, "作答已结束"));
    }
    Ok(submission)
}

impl ExamSessionService {
    /// 开始作答；进行中的作答直接恢复，截止时间不变
    pub async fn start_exam(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let exam = load_exam(&storage, course_id, exam_id).await?;
        if !exam.published {
            return Err(forbidden(ErrorCode::ExamNotPublished, "考试尚未发布"));
        }

        let enrolled = storage
            .get_enrollment(course_id, user.id)
            .await?
            .is_some_and(|e| e.status == EnrollmentStatus::Active);
        if !enrolled {
            return Err(forbidden(ErrorCode::NotEnrolled, "未选修该课程"));
        }

        let questions = storage.list_exam_questions(exam.id).await?;
        let now = Utc::now();

        if let Some(existing) = storage.get_exam_submission(exam.id, user.id).await? {
            let existing = finalize_if_expired(
                &storage,
                &exam,
                &questions,
                existing,
                now,
                self.grace_seconds(),
            )
            .await?;
            if !existing.status.is_open() {
                return Err(conflict(ErrorCode::ExamAlreadyTaken, "已参加过该考试"));
            }
            return Ok(HttpResponse::Ok().json(ApiResponse::success(
                session_response(exam, questions, existing),
                "继续作答",
            )));
        }

        if !exam.is_open_at(now) {
            return Err(forbidden(ErrorCode::ExamNotAvailable, "不在考试开放时间内"));
        }
        if questions.is_empty() {
            return Err(forbidden(ErrorCode::ExamNotAvailable, "考试没有题目"));
        }

        let deadline_at = proctoring::deadline_for(&exam, now);
        let submission = match storage
            .create_exam_submission(exam.id, user.id, now, deadline_at)
            .await
        {
            Ok(submission) => submission,
            // 并发开始：另一个请求已创建作答
            Err(SchoolError::Conflict(_)) => {
                let existing = storage
                    .get_exam_submission(exam.id, user.id)
                    .await?
                    .ok_or_else(|| conflict(ErrorCode::ExamAlreadyTaken, "已参加过该考试"))?;
                if !existing.status.is_open() {
                    return Err(conflict(ErrorCode::ExamAlreadyTaken, "已参加过该考试"));
                }
                return Ok(HttpResponse::Ok().json(ApiResponse::success(
                    session_response(exam, questions, existing),
                    "继续作答",
                )));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "学生 {} 开始考试 {}，截止 {}",
            user.id, exam.id, submission.deadline_at
        );
        Ok(HttpResponse::Created().json(ApiResponse::success(
            session_response(exam, questions, submission),
            "开始作答",
        )))
    }

    /// 学生查看自己的作答；已结束的作答也可查看
    pub async fn my_session(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let exam = load_exam(&storage, course_id, exam_id).await?;
        let questions = storage.list_exam_questions(exam.id).await?;

        let submission = storage
            .get_exam_submission(exam.id, user.id)
            .await?
            .ok_or_else(|| not_found(ErrorCode::ExamSessionNotFound, "尚未开始作答"))?;
        let submission = finalize_if_expired(
            &storage,
            &exam,
            &questions,
            submission,
            Utc::now(),
            self.grace_seconds(),
        )
        .await?;

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            session_response(exam, questions, submission),
            "获取作答成功",
        )))
    }

    pub async fn record_warning(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
        body: RecordWarningRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let exam = load_exam(&storage, course_id, exam_id).await?;
        if !exam.proctoring_enabled {
            return Err(bad_request(ErrorCode::BadRequest, "该考试未启用监考"));
        }
        let questions = storage.list_exam_questions(exam.id).await?;
        let submission = open_attempt(self, &storage, &exam, &questions, &user).await?;

        let detail = body
            .detail
            .map(|d| {
                d.trim()
                    .chars()
                    .take(proctoring::MAX_WARNING_DETAIL_CHARS)
                    .collect::<String>()
            })
            .filter(|d| !d.is_empty());
        let warning = ProctoringWarning {
            kind: body.kind,
            detail,
            at: Utc::now(),
        };

        let submission = match storage
            .append_exam_warning(submission.id, warning, self.max_warnings())
            .await?
        {
            WarningAppend::Recorded(submission) => submission,
            WarningAppend::LimitReached => {
                return Err(conflict(ErrorCode::ExamWarningLimit, "告警记录已达上限"));
            }
            WarningAppend::Closed => {
                return Err(conflict(ErrorCode::ExamSessionClosed, "作答已结束"));
            }
        };
        let warning_count = submission.warnings.len();

        warn!(
            "考试 {} 学生 {} 监考告警: {} (第 {} 次)",
            exam.id,
            user.id,
            body.kind.as_str(),
            warning_count
        );

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            WarningRecordedResponse {
                warning_count,
                remaining_seconds: proctoring::remaining_seconds(&submission, Utc::now()),
            },
            "告警已记录",
        )))
    }

    /// 保存草稿，按题目合并到已有答案
    pub async fn save_answers(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
        body: SaveAnswersRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let exam = load_exam(&storage, course_id, exam_id).await?;
        let questions = storage.list_exam_questions(exam.id).await?;
        let submission = open_attempt(self, &storage, &exam, &questions, &user).await?;

        proctoring::validate_answers(&questions, &body.answers)
            .map_err(|msg| bad_request(ErrorCode::ExamAnswerInvalid, msg))?;

        let submission = storage
            .merge_exam_answers(submission.id, body.answers)
            .await?
            .ok_or_else(|| conflict(ErrorCode::ExamSessionClosed, "作答已结束"))?;

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            session_response(exam, questions, submission),
            "答案已保存",
        )))
    }

    /// 提交作答
    ///
    /// 宽限期内提交记为 submitted；必答题未答完时拒绝并返回未答题目。
    /// 超过宽限期的提交只采用已保存的草稿，记为 auto_submitted。
    pub async fn submit_exam(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
        body: SubmitExamRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let exam = load_exam(&storage, course_id, exam_id).await?;
        let questions = storage.list_exam_questions(exam.id).await?;

        let submission = storage
            .get_exam_submission(exam.id, user.id)
            .await?
            .ok_or_else(|| not_found(ErrorCode::ExamSessionNotFound, "尚未开始作答"))?;
        if !submission.status.is_open() {
            return Err(conflict(ErrorCode::ExamSessionClosed, "作答已结束"));
        }

        proctoring::validate_answers(&questions, &body.answers)
            .map_err(|msg| bad_request(ErrorCode::ExamAnswerInvalid, msg))?;

        if let Some(ref token) = body.recording_token {
            let owned = storage.get_file_by_token(token).await?.is_some_and(|f| {
                f.bucket == FileBucket::ExamRecordings && f.user_id == user.id
            });
            if !owned {
                return Err(bad_request(ErrorCode::FileNotFound, "录屏文件不存在"));
            }
        }

        let now = Utc::now();
        let grace = self.grace_seconds();
        let late = proctoring::is_expired(submission.deadline_at, now, grace);
        let answers = if late {
            submission.answers.clone()
        } else {
            proctoring::merge_answers(&submission.answers, body.answers)
        };

        if !late && exam.require_all_answered {
            let unanswered = proctoring::unanswered_required(&questions, &answers);
            if !unanswered.is_empty() {
                return Ok(HttpResponse::UnprocessableEntity().json(ApiResponse::error(
                    ErrorCode::ExamUnansweredQuestions,
                    UnansweredQuestionsResponse { unanswered },
                    "还有必答题未作答",
                )));
            }
        }

        let mut update = proctoring::finalize(&submission, &exam, &questions, answers, now, grace);
        update.recording_token = body.recording_token;

        let submission = storage
            .update_exam_submission(submission.id, &[SessionStatus::InProgress], update)
            .await?
            .ok_or_else(|| conflict(ErrorCode::ExamSessionClosed, "作答已结束"))?;

        info!(
            "学生 {} 提交考试 {}: {} 用时 {:?} 秒",
            user.id,
            exam.id,
            submission.status.as_str(),
            submission.elapsed_seconds
        );
        let message = if late {
            "已超过截止时间，按已保存的答案自动提交"
        } else {
            "提交成功"
        };
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            session_response(exam, questions, submission),
            message,
        )))
    }
}
