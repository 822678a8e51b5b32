pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod common;
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

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码（写入响应体的 `code` 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1002,
    NotFound = 1003,
    Conflict = 1004,
    RateLimitExceeded = 1005,
    InternalServerError = 1006,

    // 认证
    AuthFailed = 2000,
    UserInactive = 2001,

    // 用户
    UserNotFound = 2100,
    UserAlreadyExists = 2101,
    UserNameInvalid = 2102,
    UserEmailInvalid = 2103,
    UserPasswordInvalid = 2104,
    UserEmailAlreadyExists = 2105,
    UserCreationFailed = 2106,
    UserUpdateFailed = 2107,
    UserDeleteFailed = 2108,
    CanNotDeleteCurrentUser = 2109,
    UserRoleInvalid = 2110,

    // 课程
    CourseNotFound = 3000,
    CourseAlreadyExists = 3001,
    CoursePermissionDenied = 3002,
    CourseArchived = 3003,
    CourseFull = 3004,
    CourseInvalid = 3005,
    AssignmentNotFound = 3100,
    AssignmentAlreadyExists = 3101,
    EnrollmentNotFound = 3200,
    EnrollmentAlreadyExists = 3201,
    NotEnrolled = 3202,

    // 课时
    LessonNotFound = 4000,
    LessonInvalid = 4001,

    // 考试
    ExamNotFound = 5000,
    ExamInvalid = 5001,
    ExamNotPublished = 5002,
    ExamNotAvailable = 5003,
    ExamLocked = 5004,
    QuestionInvalid = 5005,
    ExamSessionNotFound = 5100,
    ExamAlreadyTaken = 5101,
    ExamSessionClosed = 5102,
    ExamUnansweredQuestions = 5103,
    ExamAnswerInvalid = 5104,
    ExamWarningLimit = 5105,
    SubmissionNotFound = 5106,
    SubmissionNotGradable = 5107,

    // 成绩与考勤
    GradeNotFound = 6000,
    GradeInvalid = 6001,
    AttendanceNotFound = 6100,
    AttendanceInvalid = 6101,

    // PQR 与报告
    PqrNotFound = 7000,
    PqrInvalid = 7001,
    ReportNotFound = 7100,
    ReportInvalid = 7101,

    // 文件
    FileNotFound = 8000,
    FileUploadFailed = 8001,
    FileTypeNotAllowed = 8002,
    FileSizeExceeded = 8003,
    MultifileUploadNotAllowed = 8004,
    BucketInvalid = 8005,
}
