use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::entities::CourseRole;
use crate::models::enrollments::requests::{
    EnrollStudentRequest, EnrollmentListParams, UpdateEnrollmentRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::EnrollmentService;
use crate::utils::{SafeCourseIdI64, SafeEnrollmentIdI64};

static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

pub async fn list_enrollments(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<EnrollmentListParams>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .list_enrollments(&req, course_id.0, query.into_inner())
        .await
}

pub async fn enroll_student(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    enroll_data: web::Json<EnrollStudentRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .enroll_student(&req, course_id.0, enroll_data.into_inner())
        .await
}

pub async fn update_enrollment(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    enrollment_id: SafeEnrollmentIdI64,
    update_data: web::Json<UpdateEnrollmentRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .update_enrollment(&req, course_id.0, enrollment_id.0, update_data.into_inner())
        .await
}

pub async fn remove_enrollment(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    enrollment_id: SafeEnrollmentIdI64,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .remove_enrollment(&req, course_id.0, enrollment_id.0)
        .await
}

pub fn configure_enrollment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/enrollments")
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_enrollments)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles())),
                    )
                    .route(
                        web::post()
                            .to(enroll_student)
                            .wrap(middlewares::RequireRole::new_any(UserRole::coordinator_roles())),
                    ),
            )
            .service(
                web::resource("/{enrollment_id}")
                    .wrap(middlewares::RequireRole::new_any(UserRole::coordinator_roles()))
                    .route(web::put().to(update_enrollment))
                    .route(web::delete().to(remove_enrollment)),
            ),
    );
}
