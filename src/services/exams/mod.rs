//! 考试与题目管理

mod questions;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::models::exams::requests::{
    CreateExamRequest, ExamListParams, ExamListQuery, MAX_DURATION_MINUTES, PublishExamRequest,
    ReplaceQuestionsRequest, UpdateExamRequest,
};
use crate::models::exams::responses::ExamDetailResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::validate::{validate_optional_text, validate_required_text};

use super::{course_member, current_user, load_course};

pub use questions::validate_questions;

pub struct ExamService {
    storage: Option<Arc<dyn Storage>>,
}

impl ExamService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    // 学生只能看到已发布的考试
    pub async fn list_exams(
        &self,
        request: &HttpRequest,
        course_id: i64,
        query: ExamListParams,
    ) -> ActixResult<HttpResponse> {
        let member = course_member(request)?;
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let published = if member.role.is_staff() {
            query.published
        } else {
            Some(true)
        };

        let list_query = ExamListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            search: query.search.filter(|s| !s.trim().is_empty()),
            published,
        };

        let response = storage
            .list_exams_with_pagination(course_id, list_query)
            .await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取考试列表成功")))
    }

    /// 教职人员看到完整题目，学生只能看到已发布考试且不含正确答案
    pub async fn get_exam(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        let member = course_member(request)?;
        let storage = self.get_storage(request)?;

        let exam = match storage.get_exam(course_id, exam_id).await? {
            Some(exam) if member.role.is_staff() || exam.published => exam,
            _ => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::ExamNotFound,
                    "考试不存在",
                )));
            }
        };

        let mut questions = storage.list_exam_questions(exam.id).await?;
        if !member.role.is_staff() {
            questions = questions.into_iter().map(|q| q.redacted()).collect();
        }

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            ExamDetailResponse::new(exam, questions),
            "获取考试成功",
        )))
    }

    pub async fn create_exam(
        &self,
        request: &HttpRequest,
        course_id: i64,
        mut exam_data: CreateExamRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        exam_data.title = exam_data.title.trim().to_string();
        if let Err(msg) = validate_exam_settings(
            Some(&exam_data.title),
            exam_data.description.as_deref(),
            Some(exam_data.duration_minutes),
            exam_data.max_score,
            exam_data.available_from,
            exam_data.available_until,
        ) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ExamInvalid, msg)));
        }

        if let Some(ref questions) = exam_data.questions
            && let Err(msg) = validate_questions(questions)
        {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::QuestionInvalid, msg)));
        }

        let exam = storage.create_exam(course_id, user.id, exam_data).await?;
        info!("课程 {} 新建考试 {} ({})", course_id, exam.id, exam.title);

        let questions = storage.list_exam_questions(exam.id).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(
            ExamDetailResponse::new(exam, questions),
            "考试创建成功",
        )))
    }

    pub async fn update_exam(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
        mut update_data: UpdateExamRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        let Some(exam) = storage.get_exam(course_id, exam_id).await? else {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExamNotFound,
                "考试不存在",
            )));
        };

        update_data.title = update_data.title.map(|t| t.trim().to_string());
        // 窗口校验基于合并后的取值
        let from = update_data.available_from.or(exam.available_from);
        let until = update_data.available_until.or(exam.available_until);
        if let Err(msg) = validate_exam_settings(
            update_data.title.as_deref(),
            update_data.description.as_deref(),
            update_data.duration_minutes,
            update_data.max_score,
            from,
            until,
        ) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ExamInvalid, msg)));
        }

        match storage.update_exam(exam.id, update_data).await? {
            Some(exam) => Ok(HttpResponse::Ok().json(ApiResponse::success(exam, "考试更新成功"))),
            None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExamNotFound,
                "考试不存在",
            ))),
        }
    }

    pub async fn delete_exam(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        if storage.get_exam(course_id, exam_id).await?.is_none() {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExamNotFound,
                "考试不存在",
            )));
        }

        storage.delete_exam(exam_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("考试删除成功")))
    }

    /// 整体替换题目；已发布且已有作答的考试不能再改题
    pub async fn replace_questions(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
        body: ReplaceQuestionsRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        let Some(exam) = storage.get_exam(course_id, exam_id).await? else {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExamNotFound,
                "考试不存在",
            )));
        };

        if exam.published && storage.count_exam_submissions(exam.id).await? > 0 {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ExamLocked,
                "考试已有学生作答，不能修改题目",
            )));
        }

        if let Err(msg) = validate_questions(&body.questions) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::QuestionInvalid, msg)));
        }

        if exam.published && body.questions.is_empty() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::QuestionInvalid,
                "已发布的考试至少需要一道题目",
            )));
        }

        let questions = storage.replace_exam_questions(exam.id, body.questions).await?;
        info!("考试 {} 题目已替换，共 {} 题", exam.id, questions.len());

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            ExamDetailResponse::new(exam, questions),
            "题目已更新",
        )))
    }

    /// 发布需要至少一道题目
    pub async fn publish_exam(
        &self,
        request: &HttpRequest,
        course_id: i64,
        exam_id: i64,
        body: PublishExamRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        let Some(exam) = storage.get_exam(course_id, exam_id).await? else {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExamNotFound,
                "考试不存在",
            )));
        };

        if body.published && storage.list_exam_questions(exam.id).await?.is_empty() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ExamInvalid,
                "考试没有题目，不能发布",
            )));
        }

        match storage.set_exam_published(exam.id, body.published).await? {
            Some(exam) => {
                let message = if exam.published {
                    "考试已发布"
                } else {
                    "考试已取消发布"
                };
                Ok(HttpResponse::Ok().json(ApiResponse::success(exam, message)))
            }
            None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExamNotFound,
                "考试不存在",
            ))),
        }
    }
}

/// 考试基本设置校验，`None` 表示该字段未修改
pub(crate) fn validate_exam_settings(
    title: Option<&str>,
    description: Option<&str>,
    duration_minutes: Option<i32>,
    max_score: Option<f64>,
    available_from: Option<DateTime<Utc>>,
    available_until: Option<DateTime<Utc>>,
) -> Result<(), String> {
    if let Some(title) = title {
        validate_required_text("考试标题", title, 200)?;
    }
    validate_optional_text("考试说明", description, 4000)?;
    if let Some(duration) = duration_minutes
        && !(1..=MAX_DURATION_MINUTES).contains(&duration)
    {
        return Err(format!(
            "考试时长必须在 1 到 {MAX_DURATION_MINUTES} 分钟之间"
        ));
    }
    if let Some(max_score) = max_score
        && !(max_score.is_finite() && max_score > 0.0)
    {
        return Err("满分必须大于 0".to_string());
    }
    if let (Some(from), Some(until)) = (available_from, available_until)
        && from >= until
    {
        return Err("开放时间必须早于截止时间".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_bounds() {
        assert!(validate_exam_settings(Some("Quiz"), None, Some(1), None, None, None).is_ok());
        assert!(validate_exam_settings(None, None, Some(600), None, None, None).is_ok());
        assert!(validate_exam_settings(None, None, Some(0), None, None, None).is_err());
        assert!(validate_exam_settings(None, None, Some(601), None, None, None).is_err());
    }

    #[test]
    fn test_max_score_and_window() {
        assert!(validate_exam_settings(None, None, None, Some(0.0), None, None).is_err());
        assert!(validate_exam_settings(None, None, None, Some(f64::NAN), None, None).is_err());

        let now = Utc::now();
        let later = now + chrono::Duration::hours(2);
        assert!(validate_exam_settings(None, None, None, None, Some(now), Some(later)).is_ok());
        assert!(validate_exam_settings(None, None, None, None, Some(later), Some(now)).is_err());
    }
}
