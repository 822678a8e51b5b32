use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::ApiResponse;
use crate::models::courses::responses::CourseDetailResponse;
use crate::services::{course_member, load_course};

pub async fn get_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let member = course_member(request)?;
    let storage = service.get_storage(request)?;
    let course = load_course(&storage, course_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CourseDetailResponse {
            course,
            my_role: member.role,
        },
        "获取课程信息成功",
    )))
}
