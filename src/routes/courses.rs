use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::entities::CourseRole;
use crate::models::courses::requests::{CourseQueryParams, CreateCourseRequest, UpdateCourseRequest};
use crate::models::users::entities::UserRole;
use crate::services::CourseService;
use crate::utils::SafeCourseIdI64;

// 懒加载的全局 CourseService 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseQueryParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(&req, query.into_inner()).await
}

pub async fn create_course(
    req: HttpRequest,
    course_data: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_course(&req, course_data.into_inner())
        .await
}

pub async fn get_course(req: HttpRequest, course_id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(&req, course_id.0).await
}

pub async fn update_course(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    update_data: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(&req, course_id.0, update_data.into_inner())
        .await
}

pub async fn delete_course(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(&req, course_id.0).await
}

// 配置路由；课程下的子资源都挂在同一个 scope 内
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 协调员看到全部，其他用户看到自己参与的课程
                    .route(web::get().to(list_courses))
                    .route(
                        web::post()
                            .to(create_course)
                            .wrap(middlewares::RequireRole::new_any(UserRole::coordinator_roles())),
                    ),
            )
            .service(
                web::scope("/{course_id}")
                    .configure(super::assignments::configure_assignment_routes)
                    .configure(super::enrollments::configure_enrollment_routes)
                    .configure(super::lessons::configure_lesson_routes)
                    .configure(super::exams::configure_exam_routes)
                    .configure(super::grades::configure_course_grade_routes)
                    .configure(super::attendance::configure_attendance_routes)
                    .configure(super::reports::configure_course_report_routes)
                    .service(
                        web::resource("")
                            .route(
                                web::get()
                                    .to(get_course)
                                    .wrap(middlewares::RequireCourseRole::new_any(
                                        CourseRole::all_roles(),
                                    )),
                            )
                            .route(
                                web::put()
                                    .to(update_course)
                                    .wrap(middlewares::RequireRole::new_any(
                                        UserRole::coordinator_roles(),
                                    )),
                            )
                            .route(
                                web::delete()
                                    .to(delete_course)
                                    .wrap(middlewares::RequireRole::new_any(
                                        UserRole::coordinator_roles(),
                                    )),
                            ),
                    ),
            ),
    );
}
