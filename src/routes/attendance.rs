use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attendance::requests::{
    AttendanceListParams, RecordAttendanceRequest, UpdateAttendanceRequest,
};
use crate::models::courses::entities::CourseRole;
use crate::services::AttendanceService;
use crate::utils::{SafeAttendanceIdI64, SafeCourseIdI64};

static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

pub async fn list_attendance(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<AttendanceListParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_attendance(&req, course_id.0, query.into_inner())
        .await
}

pub async fn record_attendance(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    body: web::Json<RecordAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .record_attendance(&req, course_id.0, body.into_inner())
        .await
}

pub async fn update_attendance(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    record_id: SafeAttendanceIdI64,
    update_data: web::Json<UpdateAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .update_attendance(&req, course_id.0, record_id.0, update_data.into_inner())
        .await
}

pub async fn delete_attendance(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    record_id: SafeAttendanceIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .delete_attendance(&req, course_id.0, record_id.0)
        .await
}

pub async fn attendance_summary(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.attendance_summary(&req, course_id.0).await
}

pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .service(
                web::resource("/summary")
                    .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles()))
                    .route(web::get().to(attendance_summary)),
            )
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_attendance)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::all_roles())),
                    )
                    .route(
                        web::post()
                            .to(record_attendance)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles())),
                    ),
            )
            .service(
                web::resource("/{attendance_id}")
                    .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles()))
                    .route(web::put().to(update_attendance))
                    .route(web::delete().to(delete_attendance)),
            ),
    );
}
