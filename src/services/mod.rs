pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod exam_sessions;
pub mod exams;
pub mod files;
pub mod grades;
pub mod lessons;
pub mod pqrs;
pub mod reports;
pub mod users;

pub use assignments::AssignmentService;
pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use enrollments::EnrollmentService;
pub use exam_sessions::ExamSessionService;
pub use exams::ExamService;
pub use files::FileService;
pub use grades::GradeService;
pub use lessons::LessonService;
pub use pqrs::PqrService;
pub use reports::ReportService;
pub use users::UserService;

use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult, error::InternalError, http::StatusCode, web,
};
use std::sync::Arc;

use crate::middlewares::{RequireCourseRole, RequireJWT};
use crate::models::courses::entities::CourseMember;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 各服务共用：优先使用注入的存储，否则取 app_data 中的实例
pub(crate) fn storage_from_request(
    storage: &Option<Arc<dyn Storage>>,
    request: &HttpRequest,
) -> ActixResult<Arc<dyn Storage>> {
    if let Some(storage) = storage {
        return Ok(storage.clone());
    }
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Storage not found in app data",
            )
        })
}

/// 带统一响应体的错误，处理函数中可用 `?` 直接返回
pub(crate) fn api_error(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
) -> actix_web::Error {
    let message = message.into();
    let response = HttpResponse::build(status).json(ApiResponse::error_empty(code, &message));
    InternalError::from_response(message, response).into()
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> actix_web::Error {
    api_error(StatusCode::BAD_REQUEST, code, message)
}

pub(crate) fn forbidden(code: ErrorCode, message: impl Into<String>) -> actix_web::Error {
    api_error(StatusCode::FORBIDDEN, code, message)
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> actix_web::Error {
    api_error(StatusCode::NOT_FOUND, code, message)
}

pub(crate) fn conflict(code: ErrorCode, message: impl Into<String>) -> actix_web::Error {
    api_error(StatusCode::CONFLICT, code, message)
}

/// 当前登录用户
pub(crate) fn current_user(request: &HttpRequest) -> ActixResult<User> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        api_error(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Unauthorized: missing user",
        )
    })
}

/// 当前用户在路径课程中的身份
pub(crate) fn course_member(request: &HttpRequest) -> ActixResult<CourseMember> {
    RequireCourseRole::extract_course_member(request).ok_or_else(|| {
        forbidden(
            ErrorCode::CoursePermissionDenied,
            "没有该课程的访问权限",
        )
    })
}

/// 读取课程，不存在时返回 404
pub(crate) async fn load_course(
    storage: &Arc<dyn Storage>,
    course_id: i64,
) -> ActixResult<crate::models::courses::entities::Course> {
    storage
        .get_course_by_id(course_id)
        .await?
        .ok_or_else(|| not_found(ErrorCode::CourseNotFound, "课程不存在"))
}
