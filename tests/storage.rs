use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use lingua_school::errors::SchoolError;
use lingua_school::models::attendance::entities::AttendanceStatus;
use lingua_school::models::attendance::requests::AttendanceEntry;
use lingua_school::models::courses::entities::CourseRole;
use lingua_school::models::courses::requests::CreateCourseRequest;
use lingua_school::models::enrollments::entities::EnrollmentStatus;
use lingua_school::models::exam_sessions::entities::{
    ExamSubmission, ProctoringWarning, SessionStatus, WarningKind,
};
use lingua_school::models::exam_sessions::requests::{SubmissionUpdate, WarningAppend};
use lingua_school::models::exams::entities::Exam;
use lingua_school::models::exams::requests::CreateExamRequest;
use lingua_school::models::users::entities::{User, UserRole};
use lingua_school::models::users::requests::CreateUserRequest;
use lingua_school::storage::sea_orm_storage::SeaOrmStorage;
use lingua_school::storage::{ExamGradeSync, Storage};
use sea_orm::{ConnectOptions, Database};

// 内存库只能有一个连接，否则每个连接各自是一份空库
async fn memory_storage() -> SeaOrmStorage {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    SeaOrmStorage::from_connection(db).await.unwrap()
}

async fn user(storage: &SeaOrmStorage, name: &str, role: UserRole) -> User {
    storage
        .create_user(CreateUserRequest {
            username: name.to_string(),
            email: format!("{name}@lingua.test"),
            password: "hashed".to_string(),
            role,
            display_name: None,
            avatar_url: None,
        })
        .await
        .unwrap()
}

fn course_request(teacher_id: Option<i64>) -> CreateCourseRequest {
    CreateCourseRequest {
        name: "French A1".to_string(),
        language: "French".to_string(),
        level: "A1".to_string(),
        description: None,
        schedule: Some("Mon/Wed 18:00".to_string()),
        capacity: Some(20),
        teacher_id,
    }
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let storage = memory_storage().await;
    user(&storage, "ana", UserRole::Student).await;

    let err = storage
        .create_user(CreateUserRequest {
            username: "ana".to_string(),
            email: "other@lingua.test".to_string(),
            password: "hashed".to_string(),
            role: UserRole::Student,
            display_name: None,
            avatar_url: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Conflict(_)));
}

#[tokio::test]
async fn course_roles_follow_assignment_and_enrollment() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "teacher", UserRole::Teacher).await;
    let student = user(&storage, "student", UserRole::Student).await;
    let outsider = user(&storage, "outsider", UserRole::Student).await;

    let course = storage.create_course(course_request(Some(teacher.id))).await.unwrap();
    assert_eq!(course.teacher_id, Some(teacher.id));

    storage.enroll_student(course.id, student.id).await.unwrap();

    assert_eq!(
        storage.get_course_role(course.id, teacher.id).await.unwrap(),
        Some(CourseRole::Teacher)
    );
    assert_eq!(
        storage.get_course_role(course.id, student.id).await.unwrap(),
        Some(CourseRole::Student)
    );
    assert_eq!(storage.get_course_role(course.id, outsider.id).await.unwrap(), None);
}

#[tokio::test]
async fn withdrawn_student_can_enroll_again() {
    let storage = memory_storage().await;
    let student = user(&storage, "student", UserRole::Student).await;
    let course = storage.create_course(course_request(None)).await.unwrap();

    let enrollment = storage.enroll_student(course.id, student.id).await.unwrap();
    let again = storage.enroll_student(course.id, student.id).await.unwrap_err();
    assert!(matches!(again, SchoolError::Conflict(_)));

    storage
        .update_enrollment_status(enrollment.id, EnrollmentStatus::Withdrawn)
        .await
        .unwrap();
    assert_eq!(storage.get_course_role(course.id, student.id).await.unwrap(), None);
    assert_eq!(storage.count_active_enrollments(course.id).await.unwrap(), 0);

    let back = storage.enroll_student(course.id, student.id).await.unwrap();
    assert_eq!(back.id, enrollment.id);
    assert_eq!(back.status, EnrollmentStatus::Active);
}

#[tokio::test]
async fn one_exam_attempt_per_student() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "teacher", UserRole::Teacher).await;
    let student = user(&storage, "student", UserRole::Student).await;
    let course = storage.create_course(course_request(Some(teacher.id))).await.unwrap();

    let exam = storage
        .create_exam(
            course.id,
            teacher.id,
            CreateExamRequest {
                title: "Unit 1".to_string(),
                description: None,
                duration_minutes: 30,
                max_score: None,
                available_from: None,
                available_until: None,
                require_all_answered: None,
                proctoring_enabled: None,
                questions: None,
            },
        )
        .await
        .unwrap();

    let now = Utc::now();
    let deadline = now + chrono::Duration::minutes(30);
    let first = storage
        .create_exam_submission(exam.id, student.id, now, deadline)
        .await
        .unwrap();
    assert!(first.status.is_open());
    assert!(first.answers.is_empty());

    let second = storage
        .create_exam_submission(exam.id, student.id, now, deadline)
        .await
        .unwrap_err();
    assert!(matches!(second, SchoolError::Conflict(_)));
    assert_eq!(storage.count_exam_submissions(exam.id).await.unwrap(), 1);
}

#[tokio::test]
async fn exam_grade_upsert_keeps_single_record() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "teacher", UserRole::Teacher).await;
    let student = user(&storage, "student", UserRole::Student).await;
    let course = storage.create_course(course_request(Some(teacher.id))).await.unwrap();
    let exam = storage
        .create_exam(
            course.id,
            teacher.id,
            CreateExamRequest {
                title: "Midterm".to_string(),
                description: None,
                duration_minutes: 60,
                max_score: Some(50.0),
                available_from: None,
                available_until: None,
                require_all_answered: None,
                proctoring_enabled: None,
                questions: None,
            },
        )
        .await
        .unwrap();

    let sync = |score: f64| ExamGradeSync {
        course_id: course.id,
        student_id: student.id,
        exam_id: exam.id,
        title: exam.title.clone(),
        score,
        max_score: 50.0,
        comment: None,
        graded_by: teacher.id,
    };

    let first = storage.upsert_exam_grade(sync(30.0)).await.unwrap();
    let second = storage.upsert_exam_grade(sync(42.0)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.score, 42.0);
    assert_eq!(second.exam_id, Some(exam.id));
    assert_eq!(storage.list_course_grades(course.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn attendance_overwrites_same_day() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "teacher", UserRole::Teacher).await;
    let student = user(&storage, "student", UserRole::Student).await;
    let course = storage.create_course(course_request(Some(teacher.id))).await.unwrap();
    storage.enroll_student(course.id, student.id).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let entry = |status| AttendanceEntry {
        student_id: student.id,
        status,
        note: None,
    };

    storage
        .upsert_attendance(course.id, None, date, vec![entry(AttendanceStatus::Absent)], teacher.id)
        .await
        .unwrap();
    let saved = storage
        .upsert_attendance(course.id, None, date, vec![entry(AttendanceStatus::Late)], teacher.id)
        .await
        .unwrap();

    let all = storage.list_course_attendance(course.id).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, saved[0].id);
    assert_eq!(all[0].status, AttendanceStatus::Late);
}

async fn open_attempt(storage: &SeaOrmStorage) -> (User, Exam, ExamSubmission) {
    let teacher = user(storage, "teacher", UserRole::Teacher).await;
    let student = user(storage, "student", UserRole::Student).await;
    let course = storage.create_course(course_request(Some(teacher.id))).await.unwrap();
    let exam = storage
        .create_exam(
            course.id,
            teacher.id,
            CreateExamRequest {
                title: "Listening".to_string(),
                description: None,
                duration_minutes: 20,
                max_score: Some(10.0),
                available_from: None,
                available_until: None,
                require_all_answered: None,
                proctoring_enabled: Some(true),
                questions: None,
            },
        )
        .await
        .unwrap();
    let now = Utc::now();
    let submission = storage
        .create_exam_submission(exam.id, student.id, now, now + chrono::Duration::minutes(20))
        .await
        .unwrap();
    (teacher, exam, submission)
}

fn warning(kind: WarningKind) -> ProctoringWarning {
    ProctoringWarning {
        kind,
        detail: None,
        at: Utc::now(),
    }
}

fn submitted() -> SubmissionUpdate {
    SubmissionUpdate {
        status: Some(SessionStatus::Submitted),
        submitted_at: Some(Utc::now()),
        ..Default::default()
    }
}

fn graded(teacher_id: i64, score: f64) -> SubmissionUpdate {
    SubmissionUpdate {
        status: Some(SessionStatus::Graded),
        score: Some(score),
        graded_by: Some(teacher_id),
        graded_at: Some(Utc::now()),
        ..Default::default()
    }
}

fn grade_sync(exam: &Exam, submission: &ExamSubmission, teacher_id: i64, score: f64) -> ExamGradeSync {
    ExamGradeSync {
        course_id: exam.course_id,
        student_id: submission.student_id,
        exam_id: exam.id,
        title: exam.title.clone(),
        score,
        max_score: 10.0,
        comment: None,
        graded_by: teacher_id,
    }
}

#[tokio::test]
async fn concurrent_warnings_are_all_kept() {
    let storage = memory_storage().await;
    let (_, _, submission) = open_attempt(&storage).await;

    let (a, b) = tokio::join!(
        storage.append_exam_warning(submission.id, warning(WarningKind::TabBlur), 10),
        storage.append_exam_warning(submission.id, warning(WarningKind::ClipboardPaste), 10),
    );
    assert!(matches!(a.unwrap(), WarningAppend::Recorded(_)));
    assert!(matches!(b.unwrap(), WarningAppend::Recorded(_)));

    let stored = storage.get_exam_submission_by_id(submission.id).await.unwrap().unwrap();
    assert_eq!(stored.warnings.len(), 2);
}

#[tokio::test]
async fn warning_limit_and_closed_attempt() {
    let storage = memory_storage().await;
    let (_, _, submission) = open_attempt(&storage).await;

    let first = storage
        .append_exam_warning(submission.id, warning(WarningKind::Devtools), 1)
        .await
        .unwrap();
    assert!(matches!(first, WarningAppend::Recorded(ref s) if s.warnings.len() == 1));
    let over = storage
        .append_exam_warning(submission.id, warning(WarningKind::Devtools), 1)
        .await
        .unwrap();
    assert!(matches!(over, WarningAppend::LimitReached));

    storage
        .update_exam_submission(submission.id, &[SessionStatus::InProgress], submitted())
        .await
        .unwrap()
        .unwrap();
    let closed = storage
        .append_exam_warning(submission.id, warning(WarningKind::TabBlur), 10)
        .await
        .unwrap();
    assert!(matches!(closed, WarningAppend::Closed));
}

#[tokio::test]
async fn answers_merge_only_while_open() {
    let storage = memory_storage().await;
    let (_, _, submission) = open_attempt(&storage).await;

    storage
        .merge_exam_answers(submission.id, HashMap::from([(1, "0".to_string())]))
        .await
        .unwrap()
        .unwrap();
    let merged = storage
        .merge_exam_answers(submission.id, HashMap::from([(2, "bonjour".to_string())]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged.answers.len(), 2);

    storage
        .update_exam_submission(submission.id, &[SessionStatus::InProgress], submitted())
        .await
        .unwrap()
        .unwrap();
    let late = storage
        .merge_exam_answers(submission.id, HashMap::from([(1, "3".to_string())]))
        .await
        .unwrap();
    assert!(late.is_none());

    let stored = storage.get_exam_submission_by_id(submission.id).await.unwrap().unwrap();
    assert_eq!(stored.answers.get(&1).map(String::as_str), Some("0"));
}

#[tokio::test]
async fn stale_finalize_does_not_overwrite_grade() {
    let storage = memory_storage().await;
    let (teacher, exam, submission) = open_attempt(&storage).await;

    storage
        .update_exam_submission(submission.id, &[SessionStatus::InProgress], submitted())
        .await
        .unwrap()
        .unwrap();
    storage
        .grade_exam_submission(
            submission.id,
            graded(teacher.id, 8.0),
            grade_sync(&exam, &submission, teacher.id, 8.0),
        )
        .await
        .unwrap()
        .unwrap();

    // 基于过期快照的自动交卷
    let stale = storage
        .update_exam_submission(
            submission.id,
            &[SessionStatus::InProgress],
            SubmissionUpdate {
                status: Some(SessionStatus::AutoSubmitted),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(stale.is_none());

    let stored = storage.get_exam_submission_by_id(submission.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Graded);
    assert_eq!(stored.score, Some(8.0));
}

#[tokio::test]
async fn grading_writes_grade_record_atomically() {
    let storage = memory_storage().await;
    let (teacher, exam, submission) = open_attempt(&storage).await;

    // 作答中不能评分，也不应留下成绩
    let early = storage
        .grade_exam_submission(
            submission.id,
            graded(teacher.id, 5.0),
            grade_sync(&exam, &submission, teacher.id, 5.0),
        )
        .await
        .unwrap();
    assert!(early.is_none());
    assert!(storage.list_course_grades(exam.course_id).await.unwrap().is_empty());
    let still_open = storage.get_exam_submission_by_id(submission.id).await.unwrap().unwrap();
    assert_eq!(still_open.status, SessionStatus::InProgress);

    storage
        .update_exam_submission(submission.id, &[SessionStatus::InProgress], submitted())
        .await
        .unwrap()
        .unwrap();
    let done = storage
        .grade_exam_submission(
            submission.id,
            graded(teacher.id, 9.5),
            grade_sync(&exam, &submission, teacher.id, 9.5),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status, SessionStatus::Graded);

    let grades = storage.list_course_grades(exam.course_id).await.unwrap();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0].exam_id, Some(exam.id));
    assert_eq!(grades[0].score, 9.5);
}

#[tokio::test]
async fn recording_resolves_to_exam_course() {
    let storage = memory_storage().await;
    let (_, exam, submission) = open_attempt(&storage).await;

    assert_eq!(storage.recording_course_id("rec-token").await.unwrap(), None);

    storage
        .update_exam_submission(
            submission.id,
            &[SessionStatus::InProgress],
            SubmissionUpdate {
                status: Some(SessionStatus::Submitted),
                recording_token: Some("rec-token".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        storage.recording_course_id("rec-token").await.unwrap(),
        Some(exam.course_id)
    );
}
