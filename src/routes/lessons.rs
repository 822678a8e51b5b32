use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::entities::CourseRole;
use crate::models::lessons::requests::{CreateLessonRequest, LessonListParams, UpdateLessonRequest};
use crate::services::LessonService;
use crate::utils::{SafeCourseIdI64, SafeLessonIdI64};

static LESSON_SERVICE: Lazy<LessonService> = Lazy::new(LessonService::new_lazy);

pub async fn list_lessons(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<LessonListParams>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .list_lessons(&req, course_id.0, query.into_inner())
        .await
}

pub async fn get_lesson(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    lesson_id: SafeLessonIdI64,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.get_lesson(&req, course_id.0, lesson_id.0).await
}

pub async fn create_lesson(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    lesson_data: web::Json<CreateLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .create_lesson(&req, course_id.0, lesson_data.into_inner())
        .await
}

pub async fn update_lesson(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    lesson_id: SafeLessonIdI64,
    update_data: web::Json<UpdateLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .update_lesson(&req, course_id.0, lesson_id.0, update_data.into_inner())
        .await
}

pub async fn delete_lesson(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    lesson_id: SafeLessonIdI64,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .delete_lesson(&req, course_id.0, lesson_id.0)
        .await
}

pub fn configure_lesson_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/lessons")
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_lessons)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::all_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_lesson)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles())),
                    ),
            )
            .service(
                web::resource("/{lesson_id}")
                    .route(
                        web::get()
                            .to(get_lesson)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::all_roles())),
                    )
                    .route(
                        web::put()
                            .to(update_lesson)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_lesson)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles())),
                    ),
            ),
    );
}
