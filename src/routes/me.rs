use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::requests::CourseQueryParams;
use crate::services::EnrollmentService;

use super::grades::GRADE_SERVICE;

static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

pub async fn my_courses(
    req: HttpRequest,
    query: web::Query<CourseQueryParams>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .list_my_courses(&req, query.into_inner())
        .await
}

pub async fn my_grades(req: HttpRequest) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.my_grades(&req).await
}

// 当前用户视角的聚合接口
pub fn configure_me_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/me")
            .wrap(middlewares::RequireJWT)
            .route("/courses", web::get().to(my_courses))
            .route("/grades", web::get().to(my_grades)),
    );
}
