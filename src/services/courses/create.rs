use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CourseService, ensure_teacher, validate_course_fields};
use crate::models::courses::requests::CreateCourseRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_user;

pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    mut course_data: CreateCourseRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    course_data.name = course_data.name.trim().to_string();
    course_data.language = course_data.language.trim().to_lowercase();
    course_data.level = course_data.level.trim().to_string();

    if let Err(msg) = validate_course_fields(
        Some(&course_data.name),
        Some(&course_data.language),
        Some(&course_data.level),
        course_data.description.as_deref(),
        course_data.capacity,
    ) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg)));
    }

    if let Some(teacher_id) = course_data.teacher_id {
        ensure_teacher(&storage, teacher_id).await?;
    }

    let course = storage.create_course(course_data).await?;
    info!("课程 {} ({}) 已由 {} 创建", course.name, course.code, user.id);

    Ok(HttpResponse::Created().json(ApiResponse::success(course, "课程创建成功")))
}
