use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::{ExamSessionService, finalize_if_expired, load_exam};
use crate::models::exam_sessions::entities::SessionStatus;
use crate::models::exam_sessions::requests::{
    GradeSubmissionRequest, SubmissionListParams, SubmissionListQuery, SubmissionUpdate,
};
use crate::models::exam_sessions::responses::ExamSessionResponse;
use crate::models::exams::responses::ExamDetailResponse;
use crate::models::grades::entities::round2;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, conflict, current_user, not_found};
use crate::storage::ExamGradeSync;
use crate::utils::validate::validate_optional_text;

impl ExamSessionService {
    /// 列表前先结算已超时的作答，保证状态与成绩是最新的
    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
        query: SubmissionListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let exam = load_exam(&storage, course_id, exam_id).await?;

        let now = Utc::now();
        let grace = self.grace_seconds();
        let overdue: Vec<_> = storage
            .list_course_submissions(course_id)
            .await?
            .into_iter()
            .filter(|s| s.exam_id == exam.id && s.status.is_open())
            .filter(|s| super::proctoring::is_expired(s.deadline_at, now, grace))
            .collect();
        if !overdue.is_empty() {
            let questions = storage.list_exam_questions(exam.id).await?;
            for submission in overdue {
                finalize_if_expired(&storage, &exam, &questions, submission, now, grace).await?;
            }
        }

        let list_query = SubmissionListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            status: query.status,
        };
        let response = storage
            .list_exam_submissions_with_pagination(exam.id, list_query)
            .await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取作答列表成功")))
    }

    /// 教职人员查看单份作答，附带含正确答案的题目
    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let exam = load_exam(&storage, course_id, exam_id).await?;

        let submission = storage
            .get_exam_submission_by_id(submission_id)
            .await?
            .filter(|s| s.exam_id == exam.id)
            .ok_or_else(|| not_found(ErrorCode::SubmissionNotFound, "作答不存在"))?;

        let questions = storage.list_exam_questions(exam.id).await?;
        let submission = finalize_if_expired(
            &storage,
            &exam,
            &questions,
            submission,
            Utc::now(),
            self.grace_seconds(),
        )
        .await?;

        let remaining_seconds = super::proctoring::remaining_seconds(&submission, Utc::now());
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            ExamSessionResponse {
                submission,
                remaining_seconds,
                exam: ExamDetailResponse::new(exam, questions),
            },
            "获取作答成功",
        )))
    }

    /// 人工评分，同时写入课程成绩（类别为 exam）
    pub async fn grade_submission(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
        submission_id: i64,
        body: GradeSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        let grader = current_user(request)?;
        let storage = self.get_storage(request)?;
        let exam = load_exam(&storage, course_id, exam_id).await?;

        let submission = storage
            .get_exam_submission_by_id(submission_id)
            .await?
            .filter(|s| s.exam_id == exam.id)
            .ok_or_else(|| not_found(ErrorCode::SubmissionNotFound, "作答不存在"))?;

        let questions = storage.list_exam_questions(exam.id).await?;
        let submission = finalize_if_expired(
            &storage,
            &exam,
            &questions,
            submission,
            Utc::now(),
            self.grace_seconds(),
        )
        .await?;
        if submission.status == SessionStatus::InProgress {
            return Err(conflict(
                ErrorCode::SubmissionNotGradable,
                "学生仍在作答，不能评分",
            ));
        }

        if !body.score.is_finite() || body.score < 0.0 || body.score > exam.max_score {
            return Err(bad_request(
                ErrorCode::GradeInvalid,
                format!("分数必须在 0 到 {} 之间", exam.max_score),
            ));
        }
        let feedback = body
            .feedback
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        validate_optional_text("评语", feedback.as_deref(), 4000)
            .map_err(|msg| bad_request(ErrorCode::GradeInvalid, msg))?;

        let score = round2(body.score);
        let update = SubmissionUpdate {
            status: Some(SessionStatus::Graded),
            score: Some(score),
            feedback: feedback.clone(),
            graded_by: Some(grader.id),
            graded_at: Some(Utc::now()),
            ..Default::default()
        };
        let sync = ExamGradeSync {
            course_id,
            student_id: submission.student_id,
            exam_id: exam.id,
            title: exam.title.clone(),
            score,
            max_score: exam.max_score,
            comment: feedback,
            graded_by: grader.id,
        };
        let submission = storage
            .grade_exam_submission(submission.id, update, sync)
            .await?
            .ok_or_else(|| {
                conflict(
                    ErrorCode::SubmissionNotGradable,
                    "学生仍在作答，不能评分",
                )
            })?;

        info!(
            "考试 {} 作答 {} 已评分: {}/{} (评分人 {})",
            exam.id, submission.id, score, exam.max_score, grader.id
        );
        Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "评分成功")))
    }
}
