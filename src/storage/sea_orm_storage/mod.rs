//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod attendance;
mod courses;
mod enrollments;
mod exam_submissions;
mod exams;
mod files;
mod grades;
mod lessons;
mod pqrs;
mod reports;
mod users;

use crate::config::AppConfig;
use crate::errors::{Result, SchoolError};
use migration::{Migrator, MigratorTrait};
use crate::models::PaginationInfo;
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    PaginatorTrait, Select, SqlErr,
};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);
        Ok(storage)
    }

    /// 使用已有连接创建存储并执行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| SchoolError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchoolError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| SchoolError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| SchoolError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SchoolError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 插入失败时区分唯一约束冲突与其他数据库错误
pub(crate) fn insert_error(err: DbErr, what: &str) -> SchoolError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            SchoolError::conflict(format!("{what}已存在"))
        }
        _ => SchoolError::database_operation(format!("创建{what}失败: {err}")),
    }
}

/// 分页查询，返回当前页数据与分页信息
pub(crate) async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    page: u64,
    size: u64,
    what: &str,
) -> Result<(Vec<E::Model>, PaginationInfo)>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync,
{
    let paginator = select.paginate(db, size);
    let total = paginator
        .num_items()
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询{what}总数失败: {e}")))?;
    let pages = paginator
        .num_pages()
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询{what}页数失败: {e}")))?;
    let items = paginator
        .fetch_page(page - 1)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询{what}列表失败: {e}")))?;

    Ok((items, PaginationInfo::new(page, size, total, pages)))
}

// Storage trait 实现
use crate::models::{
    assignments::{
        entities::{AssignmentRole, CourseAssignment},
        responses::AssignmentListItem,
    },
    attendance::{
        entities::AttendanceRecord,
        requests::{AttendanceEntry, AttendanceListQuery, UpdateAttendanceRequest},
        responses::AttendanceListResponse,
    },
    courses::{
        entities::{Course, CourseRole},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseListResponse,
    },
    enrollments::{
        entities::{Enrollment, EnrollmentStatus},
        requests::EnrollmentListQuery,
        responses::EnrollmentListResponse,
    },
    exam_sessions::{
        entities::{ExamSubmission, ProctoringWarning, SessionStatus},
        requests::{SubmissionListQuery, SubmissionUpdate, WarningAppend},
        responses::SubmissionListResponse,
    },
    exams::{
        entities::{Exam, Question},
        requests::{CreateExamRequest, ExamListQuery, QuestionInput, UpdateExamRequest},
        responses::ExamListResponse,
    },
    files::entities::{File, FileBucket},
    grades::{
        entities::GradeRecord,
        requests::{CreateGradeRequest, GradeListQuery, UpdateGradeRequest},
        responses::GradeListResponse,
    },
    lessons::{
        entities::Lesson,
        requests::{CreateLessonRequest, LessonListQuery, UpdateLessonRequest},
        responses::LessonListResponse,
    },
    pqrs::{
        entities::Pqr,
        requests::{CreatePqrRequest, PqrListQuery, RespondPqrRequest},
        responses::PqrListResponse,
    },
    reports::{
        entities::Report,
        requests::{CreateReportRequest, ReportListQuery, UpdateReportRequest},
        responses::ReportListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::storage::{ExamGradeSync, Storage};
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(course_id).await
    }

    async fn list_courses_with_pagination(&self, query: CourseListQuery) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(&self, course_id: i64, update: UpdateCourseRequest) -> Result<Option<Course>> {
        self.update_course_impl(course_id, update).await
    }

    async fn delete_course(&self, course_id: i64) -> Result<bool> {
        self.delete_course_impl(course_id).await
    }

    async fn get_course_role(&self, course_id: i64, user_id: i64) -> Result<Option<CourseRole>> {
        self.get_course_role_impl(course_id, user_id).await
    }

    async fn list_course_assignments(&self, course_id: i64) -> Result<Vec<AssignmentListItem>> {
        self.list_course_assignments_impl(course_id).await
    }

    async fn get_course_assignment(&self, course_id: i64, user_id: i64) -> Result<Option<CourseAssignment>> {
        self.get_course_assignment_impl(course_id, user_id).await
    }

    async fn assign_course_staff(&self, course_id: i64, user_id: i64, role: AssignmentRole) -> Result<CourseAssignment> {
        self.assign_course_staff_impl(course_id, user_id, role).await
    }

    async fn unassign_course_staff(&self, course_id: i64, user_id: i64) -> Result<bool> {
        self.unassign_course_staff_impl(course_id, user_id).await
    }

    async fn enroll_student(&self, course_id: i64, student_id: i64) -> Result<Enrollment> {
        self.enroll_student_impl(course_id, student_id).await
    }

    async fn get_enrollment(&self, course_id: i64, student_id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_impl(course_id, student_id).await
    }

    async fn get_enrollment_by_id(&self, course_id: i64, enrollment_id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(course_id, enrollment_id).await
    }

    async fn count_active_enrollments(&self, course_id: i64) -> Result<u64> {
        self.count_active_enrollments_impl(course_id).await
    }

    async fn list_enrollments_with_pagination(&self, course_id: i64, query: EnrollmentListQuery) -> Result<EnrollmentListResponse> {
        self.list_enrollments_with_pagination_impl(course_id, query).await
    }

    async fn update_enrollment_status(&self, enrollment_id: i64, status: EnrollmentStatus) -> Result<Option<Enrollment>> {
        self.update_enrollment_status_impl(enrollment_id, status).await
    }

    async fn delete_enrollment(&self, enrollment_id: i64) -> Result<bool> {
        self.delete_enrollment_impl(enrollment_id).await
    }

    async fn list_course_students(&self, course_id: i64) -> Result<Vec<User>> {
        self.list_course_students_impl(course_id).await
    }

    async fn create_lesson(&self, course_id: i64, created_by: i64, lesson: CreateLessonRequest) -> Result<Lesson> {
        self.create_lesson_impl(course_id, created_by, lesson).await
    }

    async fn get_lesson(&self, course_id: i64, lesson_id: i64) -> Result<Option<Lesson>> {
        self.get_lesson_impl(course_id, lesson_id).await
    }

    async fn list_lessons_with_pagination(&self, course_id: i64, query: LessonListQuery) -> Result<LessonListResponse> {
        self.list_lessons_with_pagination_impl(course_id, query).await
    }

    async fn update_lesson(&self, lesson_id: i64, update: UpdateLessonRequest) -> Result<Option<Lesson>> {
        self.update_lesson_impl(lesson_id, update).await
    }

    async fn delete_lesson(&self, lesson_id: i64) -> Result<bool> {
        self.delete_lesson_impl(lesson_id).await
    }

    async fn count_lessons(&self, course_id: i64) -> Result<u64> {
        self.count_lessons_impl(course_id).await
    }

    async fn create_exam(&self, course_id: i64, created_by: i64, exam: CreateExamRequest) -> Result<Exam> {
        self.create_exam_impl(course_id, created_by, exam).await
    }

    async fn get_exam(&self, course_id: i64, exam_id: i64) -> Result<Option<Exam>> {
        self.get_exam_impl(course_id, exam_id).await
    }

    async fn list_exams_with_pagination(&self, course_id: i64, query: ExamListQuery) -> Result<ExamListResponse> {
        self.list_exams_with_pagination_impl(course_id, query).await
    }

    async fn update_exam(&self, exam_id: i64, update: UpdateExamRequest) -> Result<Option<Exam>> {
        self.update_exam_impl(exam_id, update).await
    }

    async fn set_exam_published(&self, exam_id: i64, published: bool) -> Result<Option<Exam>> {
        self.set_exam_published_impl(exam_id, published).await
    }

    async fn delete_exam(&self, exam_id: i64) -> Result<bool> {
        self.delete_exam_impl(exam_id).await
    }

    async fn count_exams(&self, course_id: i64) -> Result<u64> {
        self.count_exams_impl(course_id).await
    }

    async fn replace_exam_questions(&self, exam_id: i64, questions: Vec<QuestionInput>) -> Result<Vec<Question>> {
        self.replace_exam_questions_impl(exam_id, questions).await
    }

    async fn list_exam_questions(&self, exam_id: i64) -> Result<Vec<Question>> {
        self.list_exam_questions_impl(exam_id).await
    }

    async fn create_exam_submission(&self, exam_id: i64, student_id: i64, started_at: chrono::DateTime<chrono::Utc>, deadline_at: chrono::DateTime<chrono::Utc>) -> Result<ExamSubmission> {
        self.create_exam_submission_impl(exam_id, student_id, started_at, deadline_at).await
    }

    async fn get_exam_submission(&self, exam_id: i64, student_id: i64) -> Result<Option<ExamSubmission>> {
        self.get_exam_submission_impl(exam_id, student_id).await
    }

    async fn get_exam_submission_by_id(&self, submission_id: i64) -> Result<Option<ExamSubmission>> {
        self.get_exam_submission_by_id_impl(submission_id).await
    }

    async fn update_exam_submission(
        &self,
        submission_id: i64,
        expected: &[SessionStatus],
        update: SubmissionUpdate,
    ) -> Result<Option<ExamSubmission>> {
        self.update_exam_submission_impl(submission_id, expected, update)
            .await
    }

    async fn append_exam_warning(
        &self,
        submission_id: i64,
        warning: ProctoringWarning,
        max_warnings: usize,
    ) -> Result<WarningAppend> {
        self.append_exam_warning_impl(submission_id, warning, max_warnings)
            .await
    }

    async fn merge_exam_answers(
        &self,
        submission_id: i64,
        answers: HashMap<i64, String>,
    ) -> Result<Option<ExamSubmission>> {
        self.merge_exam_answers_impl(submission_id, answers).await
    }

    async fn grade_exam_submission(
        &self,
        submission_id: i64,
        update: SubmissionUpdate,
        sync: ExamGradeSync,
    ) -> Result<Option<ExamSubmission>> {
        self.grade_exam_submission_impl(submission_id, update, sync)
            .await
    }

    async fn list_exam_submissions_with_pagination(&self, exam_id: i64, query: SubmissionListQuery) -> Result<SubmissionListResponse> {
        self.list_exam_submissions_with_pagination_impl(exam_id, query).await
    }

    async fn count_exam_submissions(&self, exam_id: i64) -> Result<u64> {
        self.count_exam_submissions_impl(exam_id).await
    }

    async fn list_course_submissions(&self, course_id: i64) -> Result<Vec<ExamSubmission>> {
        self.list_course_submissions_impl(course_id).await
    }

    async fn recording_course_id(&self, recording_token: &str) -> Result<Option<i64>> {
        self.recording_course_id_impl(recording_token).await
    }

    async fn create_grade(&self, course_id: i64, graded_by: i64, grade: CreateGradeRequest) -> Result<GradeRecord> {
        self.create_grade_impl(course_id, graded_by, grade).await
    }

    async fn get_grade(&self, course_id: i64, grade_id: i64) -> Result<Option<GradeRecord>> {
        self.get_grade_impl(course_id, grade_id).await
    }

    async fn list_grades_with_pagination(&self, query: GradeListQuery) -> Result<GradeListResponse> {
        self.list_grades_with_pagination_impl(query).await
    }

    async fn update_grade(&self, grade_id: i64, update: UpdateGradeRequest) -> Result<Option<GradeRecord>> {
        self.update_grade_impl(grade_id, update).await
    }

    async fn delete_grade(&self, grade_id: i64) -> Result<bool> {
        self.delete_grade_impl(grade_id).await
    }

    async fn list_course_grades(&self, course_id: i64) -> Result<Vec<GradeRecord>> {
        self.list_course_grades_impl(course_id).await
    }

    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<GradeRecord>> {
        self.list_student_grades_impl(student_id).await
    }

    async fn upsert_exam_grade(&self, sync: ExamGradeSync) -> Result<GradeRecord> {
        self.upsert_exam_grade_impl(sync).await
    }

    async fn upsert_attendance(&self, course_id: i64, lesson_id: Option<i64>, session_date: chrono::NaiveDate, entries: Vec<AttendanceEntry>, recorded_by: i64) -> Result<Vec<AttendanceRecord>> {
        self.upsert_attendance_impl(course_id, lesson_id, session_date, entries, recorded_by).await
    }

    async fn get_attendance(&self, course_id: i64, record_id: i64) -> Result<Option<AttendanceRecord>> {
        self.get_attendance_impl(course_id, record_id).await
    }

    async fn list_attendance_with_pagination(&self, course_id: i64, query: AttendanceListQuery) -> Result<AttendanceListResponse> {
        self.list_attendance_with_pagination_impl(course_id, query).await
    }

    async fn update_attendance(&self, record_id: i64, update: UpdateAttendanceRequest) -> Result<Option<AttendanceRecord>> {
        self.update_attendance_impl(record_id, update).await
    }

    async fn delete_attendance(&self, record_id: i64) -> Result<bool> {
        self.delete_attendance_impl(record_id).await
    }

    async fn list_course_attendance(&self, course_id: i64) -> Result<Vec<AttendanceRecord>> {
        self.list_course_attendance_impl(course_id).await
    }

    async fn create_pqr(&self, requester_id: i64, assignee_id: Option<i64>, pqr: CreatePqrRequest) -> Result<Pqr> {
        self.create_pqr_impl(requester_id, assignee_id, pqr).await
    }

    async fn get_pqr(&self, pqr_id: i64) -> Result<Option<Pqr>> {
        self.get_pqr_impl(pqr_id).await
    }

    async fn list_pqrs_with_pagination(&self, query: PqrListQuery) -> Result<PqrListResponse> {
        self.list_pqrs_with_pagination_impl(query).await
    }

    async fn respond_pqr(&self, pqr_id: i64, responder_id: i64, respond: RespondPqrRequest) -> Result<Option<Pqr>> {
        self.respond_pqr_impl(pqr_id, responder_id, respond).await
    }

    async fn delete_pqr(&self, pqr_id: i64) -> Result<bool> {
        self.delete_pqr_impl(pqr_id).await
    }

    async fn create_report(&self, course_id: Option<i64>, author_id: i64, report: CreateReportRequest) -> Result<Report> {
        self.create_report_impl(course_id, author_id, report).await
    }

    async fn get_report(&self, report_id: i64) -> Result<Option<Report>> {
        self.get_report_impl(report_id).await
    }

    async fn list_reports_with_pagination(&self, query: ReportListQuery) -> Result<ReportListResponse> {
        self.list_reports_with_pagination_impl(query).await
    }

    async fn update_report(&self, report_id: i64, update: UpdateReportRequest) -> Result<Option<Report>> {
        self.update_report_impl(report_id, update).await
    }

    async fn delete_report(&self, report_id: i64) -> Result<bool> {
        self.delete_report_impl(report_id).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn create_file(
        &self,
        download_token: &str,
        bucket: FileBucket,
        original_name: &str,
        stored_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: i64,
    ) -> Result<File> {
        self.create_file_impl(
            download_token,
            bucket,
            original_name,
            stored_name,
            file_size,
            file_type,
            user_id,
        )
        .await
    }

    async fn get_file_by_token(&self, download_token: &str) -> Result<Option<File>> {
        self.get_file_by_token_impl(download_token).await
    }

    async fn existing_file_tokens(&self, tokens: &[String]) -> Result<Vec<String>> {
        self.existing_file_tokens_impl(tokens).await
    }
}
