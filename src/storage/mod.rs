use std::collections::HashMap;
use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

/// 考试成绩同步到成绩表时使用的数据
#[derive(Debug, Clone)]
pub struct ExamGradeSync {
    pub course_id: i64,
    pub student_id: i64,
    pub exam_id: i64,
    pub title: String,
    pub score: f64,
    pub max_score: f64,
    pub comment: Option<String>,
    pub graded_by: i64,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段需为已哈希的值）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn count_users(&self) -> Result<u64>;

    /// 课程管理方法
    // 创建课程，设置了主讲教师时同时写入教师分配
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    async fn update_course(
        &self,
        course_id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>>;
    async fn delete_course(&self, course_id: i64) -> Result<bool>;
    // 用户在课程中的身份（不含协调员）
    async fn get_course_role(&self, course_id: i64, user_id: i64) -> Result<Option<CourseRole>>;

    /// 课程分配方法
    async fn list_course_assignments(&self, course_id: i64) -> Result<Vec<AssignmentListItem>>;
    async fn get_course_assignment(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> Result<Option<CourseAssignment>>;
    async fn assign_course_staff(
        &self,
        course_id: i64,
        user_id: i64,
        role: AssignmentRole,
    ) -> Result<CourseAssignment>;
    async fn unassign_course_staff(&self, course_id: i64, user_id: i64) -> Result<bool>;

    /// 选课方法
    async fn enroll_student(&self, course_id: i64, student_id: i64) -> Result<Enrollment>;
    async fn get_enrollment(&self, course_id: i64, student_id: i64) -> Result<Option<Enrollment>>;
    async fn get_enrollment_by_id(
        &self,
        course_id: i64,
        enrollment_id: i64,
    ) -> Result<Option<Enrollment>>;
    async fn count_active_enrollments(&self, course_id: i64) -> Result<u64>;
    async fn list_enrollments_with_pagination(
        &self,
        course_id: i64,
        query: EnrollmentListQuery,
    ) -> Result<EnrollmentListResponse>;
    async fn update_enrollment_status(
        &self,
        enrollment_id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>>;
    async fn delete_enrollment(&self, enrollment_id: i64) -> Result<bool>;
    // 课程内在读学生
    async fn list_course_students(&self, course_id: i64) -> Result<Vec<User>>;

    /// 课时方法
    async fn create_lesson(
        &self,
        course_id: i64,
        created_by: i64,
        lesson: CreateLessonRequest,
    ) -> Result<Lesson>;
    async fn get_lesson(&self, course_id: i64, lesson_id: i64) -> Result<Option<Lesson>>;
    async fn list_lessons_with_pagination(
        &self,
        course_id: i64,
        query: LessonListQuery,
    ) -> Result<LessonListResponse>;
    async fn update_lesson(
        &self,
        lesson_id: i64,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>>;
    async fn delete_lesson(&self, lesson_id: i64) -> Result<bool>;
    async fn count_lessons(&self, course_id: i64) -> Result<u64>;

    /// 考试方法
    async fn create_exam(
        &self,
        course_id: i64,
        created_by: i64,
        exam: CreateExamRequest,
    ) -> Result<Exam>;
    async fn get_exam(&self, course_id: i64, exam_id: i64) -> Result<Option<Exam>>;
    async fn list_exams_with_pagination(
        &self,
        course_id: i64,
        query: ExamListQuery,
    ) -> Result<ExamListResponse>;
    async fn update_exam(&self, exam_id: i64, update: UpdateExamRequest) -> Result<Option<Exam>>;
    async fn set_exam_published(&self, exam_id: i64, published: bool) -> Result<Option<Exam>>;
    async fn delete_exam(&self, exam_id: i64) -> Result<bool>;
    async fn count_exams(&self, course_id: i64) -> Result<u64>;
    // 整体替换题目
    async fn replace_exam_questions(
        &self,
        exam_id: i64,
        questions: Vec<QuestionInput>,
    ) -> Result<Vec<Question>>;
    async fn list_exam_questions(&self, exam_id: i64) -> Result<Vec<Question>>;

    /// 考试作答方法
    // 唯一约束冲突时返回 Conflict
    async fn create_exam_submission(
        &self,
        exam_id: i64,
        student_id: i64,
        started_at: chrono::DateTime<chrono::Utc>,
        deadline_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<ExamSubmission>;
    async fn get_exam_submission(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<ExamSubmission>>;
    async fn get_exam_submission_by_id(&self, submission_id: i64)
    -> Result<Option<ExamSubmission>>;
    // 作答状态不在 expected 中时不写入并返回 None
    async fn update_exam_submission(
        &self,
        submission_id: i64,
        expected: &[SessionStatus],
        update: SubmissionUpdate,
    ) -> Result<Option<ExamSubmission>>;
    async fn append_exam_warning(
        &self,
        submission_id: i64,
        warning: ProctoringWarning,
        max_warnings: usize,
    ) -> Result<WarningAppend>;
    // 仅进行中的作答可保存草稿
    async fn merge_exam_answers(
        &self,
        submission_id: i64,
        answers: HashMap<i64, String>,
    ) -> Result<Option<ExamSubmission>>;
    // 评分并同步考试成绩（同一事务）；作答仍在进行时返回 None
    async fn grade_exam_submission(
        &self,
        submission_id: i64,
        update: SubmissionUpdate,
        sync: ExamGradeSync,
    ) -> Result<Option<ExamSubmission>>;
    async fn list_exam_submissions_with_pagination(
        &self,
        exam_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse>;
    async fn count_exam_submissions(&self, exam_id: i64) -> Result<u64>;
    // 课程内所有考试的作答
    async fn list_course_submissions(&self, course_id: i64) -> Result<Vec<ExamSubmission>>;
    // 引用该录像的作答所属课程
    async fn recording_course_id(&self, recording_token: &str) -> Result<Option<i64>>;

    /// 成绩方法
    async fn create_grade(
        &self,
        course_id: i64,
        graded_by: i64,
        grade: CreateGradeRequest,
    ) -> Result<GradeRecord>;
    async fn get_grade(&self, course_id: i64, grade_id: i64) -> Result<Option<GradeRecord>>;
    async fn list_grades_with_pagination(&self, query: GradeListQuery)
    -> Result<GradeListResponse>;
    async fn update_grade(
        &self,
        grade_id: i64,
        update: UpdateGradeRequest,
    ) -> Result<Option<GradeRecord>>;
    async fn delete_grade(&self, grade_id: i64) -> Result<bool>;
    async fn list_course_grades(&self, course_id: i64) -> Result<Vec<GradeRecord>>;
    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<GradeRecord>>;
    // 按 (考试, 学生) 写入或更新考试成绩
    async fn upsert_exam_grade(&self, sync: ExamGradeSync) -> Result<GradeRecord>;

    /// 考勤方法
    async fn upsert_attendance(
        &self,
        course_id: i64,
        lesson_id: Option<i64>,
        session_date: chrono::NaiveDate,
        entries: Vec<AttendanceEntry>,
        recorded_by: i64,
    ) -> Result<Vec<AttendanceRecord>>;
    async fn get_attendance(
        &self,
        course_id: i64,
        record_id: i64,
    ) -> Result<Option<AttendanceRecord>>;
    async fn list_attendance_with_pagination(
        &self,
        course_id: i64,
        query: AttendanceListQuery,
    ) -> Result<AttendanceListResponse>;
    async fn update_attendance(
        &self,
        record_id: i64,
        update: UpdateAttendanceRequest,
    ) -> Result<Option<AttendanceRecord>>;
    async fn delete_attendance(&self, record_id: i64) -> Result<bool>;
    async fn list_course_attendance(&self, course_id: i64) -> Result<Vec<AttendanceRecord>>;

    /// PQR 工单方法
    async fn create_pqr(
        &self,
        requester_id: i64,
        assignee_id: Option<i64>,
        pqr: CreatePqrRequest,
    ) -> Result<Pqr>;
    async fn get_pqr(&self, pqr_id: i64) -> Result<Option<Pqr>>;
    async fn list_pqrs_with_pagination(&self, query: PqrListQuery) -> Result<PqrListResponse>;
    async fn respond_pqr(
        &self,
        pqr_id: i64,
        responder_id: i64,
        respond: RespondPqrRequest,
    ) -> Result<Option<Pqr>>;
    async fn delete_pqr(&self, pqr_id: i64) -> Result<bool>;

    /// 报告方法
    async fn create_report(
        &self,
        course_id: Option<i64>,
        author_id: i64,
        report: CreateReportRequest,
    ) -> Result<Report>;
    async fn get_report(&self, report_id: i64) -> Result<Option<Report>>;
    async fn list_reports_with_pagination(&self, query: ReportListQuery)
    -> Result<ReportListResponse>;
    async fn update_report(
        &self,
        report_id: i64,
        update: UpdateReportRequest,
    ) -> Result<Option<Report>>;
    async fn delete_report(&self, report_id: i64) -> Result<bool>;

    /// 文件管理方法
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
    ) -> Result<File>;
    async fn get_file_by_token(&self, download_token: &str) -> Result<Option<File>>;
    // 批量校验文件令牌，返回存在的令牌
    async fn existing_file_tokens(&self, tokens: &[String]) -> Result<Vec<String>>;
}

/// 按用户 ID 建立索引，便于拼装列表
pub fn index_users(users: Vec<User>) -> HashMap<i64, User> {
    users.into_iter().map(|u| (u.id, u)).collect()
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
