use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::ApiResponse;
use crate::models::courses::requests::{CourseListQuery, CourseQueryParams};
use crate::services::current_user;

pub async fn list_courses(
    service: &CourseService,
    request: &HttpRequest,
    query: CourseQueryParams,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let list_query = CourseListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        search: query.search.filter(|s| !s.trim().is_empty()),
        language: query.language,
        level: query.level,
        status: query.status,
        member_id: (!user.is_coordinator()).then_some(user.id),
    };

    let response = storage.list_courses_with_pagination(list_query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取课程列表成功")))
}
