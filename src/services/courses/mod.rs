pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::courses::requests::{
    CourseQueryParams, CreateCourseRequest, UpdateCourseRequest,
};
use crate::models::users::entities::UserRole;
use crate::storage::Storage;
use crate::utils::validate::{validate_optional_text, validate_required_text};

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    // 协调员看到全部课程，其他用户只看到自己参与的课程
    pub async fn list_courses(
        &self,
        request: &HttpRequest,
        query: CourseQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, request, query).await
    }

    pub async fn create_course(
        &self,
        request: &HttpRequest,
        course_data: CreateCourseRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, request, course_data).await
    }

    pub async fn get_course(&self, request: &HttpRequest, course_id: i64) -> ActixResult<HttpResponse> {
        get::get_course(self, request, course_id).await
    }

    pub async fn update_course(
        &self,
        request: &HttpRequest,
        course_id: i64,
        update_data: UpdateCourseRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, request, course_id, update_data).await
    }

    pub async fn delete_course(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, request, course_id).await
    }
}

/// 课程表单字段校验
pub(crate) fn validate_course_fields(
    name: Option<&str>,
    language: Option<&str>,
    level: Option<&str>,
    description: Option<&str>,
    capacity: Option<i32>,
) -> Result<(), String> {
    if let Some(name) = name {
        validate_required_text("课程名称", name, 128)?;
    }
    if let Some(language) = language {
        validate_required_text("授课语言", language, 32)?;
    }
    if let Some(level) = level {
        validate_required_text("课程级别", level, 32)?;
    }
    validate_optional_text("课程描述", description, 4000)?;
    if let Some(capacity) = capacity
        && !(1..=1000).contains(&capacity)
    {
        return Err("课程容量必须在 1 到 1000 之间".to_string());
    }
    Ok(())
}

/// 主讲教师必须是教师角色的用户
pub(crate) async fn ensure_teacher(
    storage: &Arc<dyn Storage>,
    teacher_id: i64,
) -> ActixResult<()> {
    match storage.get_user_by_id(teacher_id).await? {
        Some(user) if user.role == UserRole::Teacher => Ok(()),
        Some(_) => Err(super::bad_request(
            ErrorCode::CourseInvalid,
            "主讲教师必须是教师角色的用户",
        )),
        None => Err(super::not_found(ErrorCode::UserNotFound, "主讲教师不存在")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_fields() {
        assert!(validate_course_fields(Some("English B2"), Some("english"), Some("B2"), None, Some(20)).is_ok());
        assert!(validate_course_fields(Some("  "), None, None, None, None).is_err());
        assert!(validate_course_fields(None, None, None, None, Some(0)).is_err());
        // 部分更新时未提供的字段不校验
        assert!(validate_course_fields(None, None, None, None, None).is_ok());
    }
}
