use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, ensure_teacher, validate_course_fields};
use crate::models::courses::requests::UpdateCourseRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::load_course;

pub async fn update_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
    mut update_data: UpdateCourseRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    load_course(&storage, course_id).await?;

    update_data.name = update_data.name.map(|s| s.trim().to_string());
    update_data.language = update_data.language.map(|s| s.trim().to_lowercase());
    update_data.level = update_data.level.map(|s| s.trim().to_string());

    if let Err(msg) = validate_course_fields(
        update_data.name.as_deref(),
        update_data.language.as_deref(),
        update_data.level.as_deref(),
        update_data.description.as_deref(),
        update_data.capacity,
    ) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg)));
    }

    // 容量不能低于当前在读人数
    if let Some(capacity) = update_data.capacity {
        let active = storage.count_active_enrollments(course_id).await?;
        if (capacity as u64) < active {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::CourseInvalid,
                format!("课程容量不能低于当前在读人数 {active}"),
            )));
        }
    }

    if let Some(teacher_id) = update_data.teacher_id {
        ensure_teacher(&storage, teacher_id).await?;
    }

    match storage.update_course(course_id, update_data).await? {
        Some(course) => Ok(HttpResponse::Ok().json(ApiResponse::success(course, "课程更新成功"))),
        None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "课程不存在",
        ))),
    }
}
