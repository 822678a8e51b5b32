use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::entities::CourseRole;
use crate::models::exam_sessions::requests::{
    GradeSubmissionRequest, RecordWarningRequest, SaveAnswersRequest, SubmissionListParams,
    SubmitExamRequest,
};
use crate::models::exams::requests::{
    CreateExamRequest, ExamListParams, PublishExamRequest, ReplaceQuestionsRequest,
    UpdateExamRequest,
};
use crate::services::{ExamService, ExamSessionService};
use crate::utils::{SafeCourseIdI64, SafeExamIdI64, SafeSubmissionIdI64};

static EXAM_SERVICE: Lazy<ExamService> = Lazy::new(ExamService::new_lazy);
static EXAM_SESSION_SERVICE: Lazy<ExamSessionService> = Lazy::new(ExamSessionService::new_lazy);

pub async fn list_exams(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<ExamListParams>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .list_exams(&req, course_id.0, query.into_inner())
        .await
}

pub async fn create_exam(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_data: web::Json<CreateExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .create_exam(&req, course_id.0, exam_data.into_inner())
        .await
}

pub async fn get_exam(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.get_exam(&req, course_id.0, exam_id.0).await
}

pub async fn update_exam(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
    update_data: web::Json<UpdateExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .update_exam(&req, course_id.0, exam_id.0, update_data.into_inner())
        .await
}

pub async fn delete_exam(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.delete_exam(&req, course_id.0, exam_id.0).await
}

pub async fn replace_questions(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
    body: web::Json<ReplaceQuestionsRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .replace_questions(&req, course_id.0, exam_id.0, body.into_inner())
        .await
}

pub async fn publish_exam(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
    body: web::Json<PublishExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .publish_exam(&req, course_id.0, exam_id.0, body.into_inner())
        .await
}

// 学生作答
pub async fn start_exam(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SESSION_SERVICE
        .start_exam(&req, course_id.0, exam_id.0)
        .await
}

pub async fn my_session(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SESSION_SERVICE
        .my_session(&req, course_id.0, exam_id.0)
        .await
}

pub async fn record_warning(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
    body: web::Json<RecordWarningRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SESSION_SERVICE
        .record_warning(&req, course_id.0, exam_id.0, body.into_inner())
        .await
}

pub async fn save_answers(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
    body: web::Json<SaveAnswersRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SESSION_SERVICE
        .save_answers(&req, course_id.0, exam_id.0, body.into_inner())
        .await
}

pub async fn submit_exam(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
    body: web::Json<SubmitExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SESSION_SERVICE
        .submit_exam(&req, course_id.0, exam_id.0, body.into_inner())
        .await
}

// 教职人员查看与评分
pub async fn list_submissions(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
    query: web::Query<SubmissionListParams>,
) -> ActixResult<HttpResponse> {
    EXAM_SESSION_SERVICE
        .list_submissions(&req, course_id.0, exam_id.0, query.into_inner())
        .await
}

pub async fn get_submission(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
    submission_id: SafeSubmissionIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SESSION_SERVICE
        .get_submission(&req, course_id.0, exam_id.0, submission_id.0)
        .await
}

pub async fn grade_submission(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    exam_id: SafeExamIdI64,
    submission_id: SafeSubmissionIdI64,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SESSION_SERVICE
        .grade_submission(&req, course_id.0, exam_id.0, submission_id.0, body.into_inner())
        .await
}

pub fn configure_exam_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/exams")
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_exams)
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::all_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_exam)
                            .wrap(middlewares::RequireCourseRole::new_any(
                                CourseRole::manager_roles(),
                            )),
                    ),
            )
            .service(
                web::scope("/{exam_id}")
                    // 作答流程，仅限本课程学生
                    .service(
                        web::scope("/session")
                            .wrap(middlewares::RequireCourseRole::new_any(&[&CourseRole::Student]))
                            .route("", web::get().to(my_session))
                            .route("/start", web::post().to(start_exam))
                            .route("/answers", web::put().to(save_answers))
                            .route("/submit", web::post().to(submit_exam))
                            .service(
                                web::resource("/warnings")
                                    .wrap(middlewares::RateLimit::proctoring())
                                    .route(web::post().to(record_warning)),
                            ),
                    )
                    .service(
                        web::scope("/submissions")
                            .wrap(middlewares::RequireCourseRole::new_any(CourseRole::staff_roles()))
                            .route("", web::get().to(list_submissions))
                            .route("/{submission_id}", web::get().to(get_submission))
                            .route("/{submission_id}/grade", web::put().to(grade_submission)),
                    )
                    .service(
                        web::resource("/questions")
                            .wrap(middlewares::RequireCourseRole::new_any(
                                CourseRole::manager_roles(),
                            ))
                            .route(web::put().to(replace_questions)),
                    )
                    .service(
                        web::resource("/publish")
                            .wrap(middlewares::RequireCourseRole::new_any(
                                CourseRole::manager_roles(),
                            ))
                            .route(web::post().to(publish_exam)),
                    )
                    .service(
                        web::resource("")
                            .route(
                                web::get()
                                    .to(get_exam)
                                    .wrap(middlewares::RequireCourseRole::new_any(
                                        CourseRole::all_roles(),
                                    )),
                            )
                            .route(
                                web::put()
                                    .to(update_exam)
                                    .wrap(middlewares::RequireCourseRole::new_any(
                                        CourseRole::manager_roles(),
                                    )),
                            )
                            .route(
                                web::delete()
                                    .to(delete_exam)
                                    .wrap(middlewares::RequireCourseRole::new_any(
                                        CourseRole::manager_roles(),
                                    )),
                            ),
                    ),
            ),
    );
}
