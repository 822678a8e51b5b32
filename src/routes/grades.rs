use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::entities::CourseRole;
use crate::models::grades::requests::{CreateGradeRequest, GradeListParams, UpdateGradeRequest};
use crate::services::GradeService;
use crate::utils::{SafeCourseIdI64, SafeGradeIdI64};

pub(crate) static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn list_grades(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<GradeListParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .list_grades(&req, course_id.0, query.into_inner())
        .await
}

pub async fn create_grade(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    grade_data: web::Json<CreateGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .create_grade(&req, course_id.0, grade_data.into_inner())
        .await
}

pub async fn update_grade(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    grade_id: SafeGradeIdI64,
    update_data: web::Json<UpdateGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .update_grade(&req, course_id.0, grade_id.0, update_data.into_inner())
        .await
}

pub async fn delete_grade(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    grade_id: SafeGradeIdI64,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.delete_grade(&req, course_id.0, grade_id.0).await
}

pub async fn grade_summary(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.grade_summary(&req, course_id.0).await
}

pub fn configure_course_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/grades")
            .service(
                web::resource("/summary")
                    .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles()))
                    .route(web::get().to(grade_summary)),
            )
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_grades)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::all_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_grade)
                            .wrap(middlewares::RequireCourseRole::new_any(
                                CourseRole::manager_roles(),
                            )),
                    ),
            )
            .service(
                web::resource("/{grade_id}")
                    .wrap(middlewares::RequireCourseRole::new_any(CourseRole::manager_roles()))
                    .route(web::put().to(update_grade))
                    .route(web::delete().to(delete_grade)),
            ),
    );
}
