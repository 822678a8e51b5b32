use chrono::Utc;
use std::collections::HashMap;

use crate::models::attendance::entities::{AttendanceRecord, AttendanceTally};
use crate::models::courses::entities::Course;
use crate::models::exam_sessions::entities::ExamSubmission;
use crate::models::grades::entities::GradeRecord;
use crate::models::reports::responses::{CourseSummaryResponse, CourseSummaryStudent};
use crate::models::users::entities::User;
use crate::services::attendance::summarize_attendance;
use crate::services::grades::{course_average, summarize_grades};

/// 汇总在读学生的出勤、成绩与已交考试数
pub fn build_course_summary(
    course: Course,
    students: &[User],
    lesson_count: u64,
    exam_count: u64,
    grades: Vec<GradeRecord>,
    attendance: &[AttendanceRecord],
    submissions: &[ExamSubmission],
) -> CourseSummaryResponse {
    let grade_rows = summarize_grades(students, grades);
    let average_grade = course_average(&grade_rows);
    let attendance_rows = summarize_attendance(students, attendance);
    let attendance_rate = attendance
        .iter()
        .map(|r| r.status)
        .collect::<AttendanceTally>()
        .rate();

    let mut finished: HashMap<i64, usize> = HashMap::new();
    for submission in submissions.iter().filter(|s| !s.status.is_open()) {
        *finished.entry(submission.student_id).or_default() += 1;
    }

    let rows = grade_rows
        .into_iter()
        .zip(attendance_rows)
        .map(|(grade, attendance)| CourseSummaryStudent {
            student_id: grade.student_id,
            username: grade.username,
            display_name: grade.display_name,
            attendance_rate: attendance.attendance_rate,
            weighted_average: grade.weighted_average,
            exams_submitted: finished.get(&grade.student_id).copied().unwrap_or(0),
        })
        .collect();

    CourseSummaryResponse {
        course,
        enrolled_students: students.len(),
        lesson_count,
        exam_count,
        attendance_rate,
        average_grade,
        students: rows,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::AttendanceStatus;
    use crate::models::courses::entities::CourseStatus;
    use crate::models::exam_sessions::entities::SessionStatus;
    use crate::models::grades::entities::GradeCategory;
    use crate::models::users::entities::{UserRole, UserStatus};

    fn course() -> Course {
        let now = Utc::now();
        Course {
            id: 1,
            code: "ENGA1X".to_string(),
            name: "English A1".to_string(),
            language: "english".to_string(),
            level: "A1".to_string(),
            description: None,
            schedule: None,
            capacity: Some(20),
            teacher_id: Some(2),
            status: CourseStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn student(id: i64) -> User {
        let now = Utc::now();
        User {
            id,
            username: format!("s{id}"),
            email: format!("s{id}@school.test"),
            password_hash: String::new(),
            role: UserRole::Student,
            status: UserStatus::Active,
            display_name: None,
            avatar_url: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn grade(student_id: i64, score: f64) -> GradeRecord {
        let now = Utc::now();
        GradeRecord {
            id: 0,
            course_id: 1,
            student_id,
            exam_id: None,
            title: "Oral".to_string(),
            category: GradeCategory::Oral,
            score,
            max_score: 100.0,
            weight: 1.0,
            comment: None,
            graded_by: 2,
            created_at: now,
            updated_at: now,
        }
    }

    fn attendance(student_id: i64, status: AttendanceStatus) -> AttendanceRecord {
        let now = Utc::now();
        AttendanceRecord {
            id: 0,
            course_id: 1,
            lesson_id: None,
            student_id,
            session_date: now.date_naive(),
            status,
            note: None,
            recorded_by: 2,
            created_at: now,
            updated_at: now,
        }
    }

    fn submission(student_id: i64, status: SessionStatus) -> ExamSubmission {
        let now = Utc::now();
        ExamSubmission {
            id: 0,
            exam_id: 1,
            student_id,
            status,
            started_at: now,
            deadline_at: now,
            submitted_at: None,
            elapsed_seconds: None,
            answers: HashMap::new(),
            warnings: vec![],
            auto_score: None,
            score: None,
            feedback: None,
            recording_token: None,
            graded_by: None,
            graded_at: None,
        }
    }

    #[test]
    fn test_course_summary_rows() {
        let students = vec![student(10), student(11)];
        let summary = build_course_summary(
            course(),
            &students,
            12,
            2,
            vec![grade(10, 80.0), grade(11, 60.0)],
            &[
                attendance(10, AttendanceStatus::Present),
                attendance(11, AttendanceStatus::Absent),
            ],
            &[
                submission(10, SessionStatus::Graded),
                submission(11, SessionStatus::InProgress),
            ],
        );

        assert_eq!(summary.enrolled_students, 2);
        assert_eq!(summary.lesson_count, 12);
        assert_eq!(summary.average_grade, Some(70.0));
        assert_eq!(summary.attendance_rate, Some(50.0));
        assert_eq!(summary.students[0].exams_submitted, 1);
        assert_eq!(summary.students[0].attendance_rate, Some(100.0));
        assert_eq!(summary.students[1].exams_submitted, 0);
        assert_eq!(summary.students[1].attendance_rate, Some(0.0));
    }
}
