//! 课时管理

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use crate::models::lessons::requests::{
    CreateLessonRequest, LessonListParams, LessonListQuery, UpdateLessonRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::validate::{validate_optional_text, validate_required_text};

use super::{current_user, load_course};

const MAX_ATTACHMENTS: usize = 20;

pub struct LessonService {
    storage: Option<Arc<dyn Storage>>,
}

impl LessonService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    // 按 position、id 排序
    pub async fn list_lessons(
        &self,
        request: &HttpRequest,
        course_id: i64,
        query: LessonListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let list_query = LessonListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            search: query.search.filter(|s| !s.trim().is_empty()),
        };

        let response = storage
            .list_lessons_with_pagination(course_id, list_query)
            .await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取课时列表成功")))
    }

    pub async fn get_lesson(
        &self,
        request: &HttpRequest,
        course_id: i64,
        lesson_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        match storage.get_lesson(course_id, lesson_id).await? {
            Some(lesson) => Ok(HttpResponse::Ok().json(ApiResponse::success(lesson, "获取课时成功"))),
            None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::LessonNotFound,
                "课时不存在",
            ))),
        }
    }

    pub async fn create_lesson(
        &self,
        request: &HttpRequest,
        course_id: i64,
        mut lesson_data: CreateLessonRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        lesson_data.title = lesson_data.title.trim().to_string();
        if let Err(msg) = validate_lesson_fields(
            Some(&lesson_data.title),
            lesson_data.content.as_deref(),
            lesson_data.position,
        ) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::LessonInvalid, msg)));
        }

        if let Some(attachments) = lesson_data.attachments.take() {
            lesson_data.attachments = Some(check_attachments(&storage, attachments).await?);
        }

        let lesson = storage.create_lesson(course_id, user.id, lesson_data).await?;
        info!("课程 {} 新增课时 {} ({})", course_id, lesson.id, lesson.title);

        Ok(HttpResponse::Created().json(ApiResponse::success(lesson, "课时创建成功")))
    }

    pub async fn update_lesson(
        &self,
        request: &HttpRequest,
        course_id: i64,
        lesson_id: i64,
        mut update_data: UpdateLessonRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        if storage.get_lesson(course_id, lesson_id).await?.is_none() {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::LessonNotFound,
                "课时不存在",
            )));
        }

        update_data.title = update_data.title.map(|t| t.trim().to_string());
        if let Err(msg) = validate_lesson_fields(
            update_data.title.as_deref(),
            update_data.content.as_deref(),
            update_data.position,
        ) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::LessonInvalid, msg)));
        }

        if let Some(attachments) = update_data.attachments.take() {
            update_data.attachments = Some(check_attachments(&storage, attachments).await?);
        }

        match storage.update_lesson(lesson_id, update_data).await? {
            Some(lesson) => Ok(HttpResponse::Ok().json(ApiResponse::success(lesson, "课时更新成功"))),
            None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::LessonNotFound,
                "课时不存在",
            ))),
        }
    }

    pub async fn delete_lesson(
        &self,
        request: &HttpRequest,
        course_id: i64,
        lesson_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        if storage.get_lesson(course_id, lesson_id).await?.is_none() {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::LessonNotFound,
                "课时不存在",
            )));
        }

        storage.delete_lesson(lesson_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("课时删除成功")))
    }
}

fn validate_lesson_fields(
    title: Option<&str>,
    content: Option<&str>,
    position: Option<i32>,
) -> Result<(), String> {
    if let Some(title) = title {
        validate_required_text("课时标题", title, 200)?;
    }
    validate_optional_text("课时内容", content, 20_000)?;
    if let Some(position) = position
        && position < 1
    {
        return Err("课时顺序必须从 1 开始".to_string());
    }
    Ok(())
}

/// 附件令牌去重后逐一确认文件存在
async fn check_attachments(
    storage: &Arc<dyn Storage>,
    attachments: Vec<String>,
) -> ActixResult<Vec<String>> {
    let mut tokens: Vec<String> = Vec::with_capacity(attachments.len());
    for token in attachments {
        let token = token.trim().to_string();
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    }

    if tokens.len() > MAX_ATTACHMENTS {
        return Err(super::bad_request(
            ErrorCode::LessonInvalid,
            format!("附件不能超过 {MAX_ATTACHMENTS} 个"),
        ));
    }

    let existing = storage.existing_file_tokens(&tokens).await?;
    let missing: Vec<&String> = tokens.iter().filter(|t| !existing.contains(t)).collect();
    if !missing.is_empty() {
        return Err(super::bad_request(
            ErrorCode::FileNotFound,
            format!("附件不存在: {missing:?}"),
        ));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_fields() {
        assert!(validate_lesson_fields(Some("Unit 3: Past tense"), None, Some(3)).is_ok());
        assert!(validate_lesson_fields(Some(" "), None, None).is_err());
        assert!(validate_lesson_fields(None, None, Some(0)).is_err());
    }
}
