use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::entities::CourseRole;
use crate::models::reports::requests::{CreateReportRequest, ReportListParams, UpdateReportRequest};
use crate::models::users::entities::UserRole;
use crate::services::ReportService;
use crate::utils::{SafeCourseIdI64, SafeReportIdI64};

static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

pub async fn list_course_reports(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<ReportListParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .list_course_reports(&req, course_id.0, query.into_inner())
        .await
}

pub async fn create_course_report(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    report_data: web::Json<CreateReportRequest>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .create_report(&req, Some(course_id.0), report_data.into_inner())
        .await
}

pub async fn get_course_report(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    report_id: SafeReportIdI64,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .get_course_report(&req, course_id.0, report_id.0)
        .await
}

pub async fn update_course_report(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    report_id: SafeReportIdI64,
    update_data: web::Json<UpdateReportRequest>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .update_course_report(&req, course_id.0, report_id.0, update_data.into_inner())
        .await
}

pub async fn delete_course_report(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    report_id: SafeReportIdI64,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .delete_course_report(&req, course_id.0, report_id.0)
        .await
}

pub async fn course_summary(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.course_summary(&req, course_id.0).await
}

pub async fn list_all_reports(
    req: HttpRequest,
    query: web::Query<ReportListParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.list_all_reports(&req, query.into_inner()).await
}

pub async fn create_general_report(
    req: HttpRequest,
    report_data: web::Json<CreateReportRequest>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .create_report(&req, None, report_data.into_inner())
        .await
}

// 挂在 /api/v1/courses/{course_id} 下
pub fn configure_course_report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/summary")
            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles()))
            .route(web::get().to(course_summary)),
    )
    .service(
        web::scope("/reports")
            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::manager_roles()))
            .route("", web::get().to(list_course_reports))
            .route("", web::post().to(create_course_report))
            .route("/{report_id}", web::get().to(get_course_report))
            .route("/{report_id}", web::put().to(update_course_report))
            .route("/{report_id}", web::delete().to(delete_course_report)),
    );
}

// 协调员的全局报告入口
pub fn configure_report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reports")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::coordinator_roles()))
                    .route("", web::get().to(list_all_reports))
                    .route("", web::post().to(create_general_report)),
            ),
    );
}
