use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::AssignStaffRequest;
use crate::models::courses::entities::CourseRole;
use crate::models::users::entities::UserRole;
use crate::services::AssignmentService;
use crate::utils::{SafeCourseIdI64, SafeUserIdI64};

static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

pub async fn list_assignments(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_assignments(&req, course_id.0).await
}

pub async fn assign_staff(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    assign_data: web::Json<AssignStaffRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .assign_staff(&req, course_id.0, assign_data.into_inner())
        .await
}

pub async fn unassign_staff(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    user_id: SafeUserIdI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .unassign_staff(&req, course_id.0, user_id.0)
        .await
}

// 挂在 /api/v1/courses/{course_id} 下
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/assignments")
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_assignments)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles())),
                    )
                    .route(
                        web::post()
                            .to(assign_staff)
                            .wrap(middlewares::RequireRole::new_any(UserRole::coordinator_roles())),
                    ),
            )
            .service(
                web::resource("/{user_id}").route(
                    web::delete()
                        .to(unassign_staff)
                        .wrap(middlewares::RequireRole::new_any(UserRole::coordinator_roles())),
                ),
            ),
    );
}
