use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_user;

pub async fn delete_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    // 课时、考试、成绩、考勤与选课记录随课程级联删除
    if storage.delete_course(course_id).await? {
        info!("课程 {} 已由 {} 删除", course_id, user.id);
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("课程删除成功")))
    } else {
        Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "课程不存在",
        )))
    }
}
