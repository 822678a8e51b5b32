use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    pub enum CourseStatus("course.ts") {
        Active => "active",
        Archived => "archived",
    }
}

crate::string_enum! {
    // 用户在某门课程中的身份，协调员对所有课程都拥有该身份
    pub enum CourseRole("course.ts") {
        Coordinator => "coordinator",
        Teacher => "teacher",
        Assistant => "assistant",
        Student => "student",
    }
}

impl CourseRole {
    pub fn manager_roles() -> &'static [&'static CourseRole] {
        &[&Self::Coordinator, &Self::Teacher]
    }
    pub fn staff_roles() -> &'static [&'static CourseRole] {
        &[&Self::Coordinator, &Self::Teacher, &Self::Assistant]
    }
    pub fn all_roles() -> &'static [&'static CourseRole] {
        &[
            &Self::Coordinator,
            &Self::Teacher,
            &Self::Assistant,
            &Self::Student,
        ]
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, CourseRole::Student)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub id: i64,
    // 课程代码（自动生成，唯一）
    pub code: String,
    pub name: String,
    // 教学语言，如 english / french
    pub language: String,
    // 级别，如 A1 / B2
    pub level: String,
    pub description: Option<String>,
    // 上课时间安排（自由文本）
    pub schedule: Option<String>,
    // 最大学生数
    pub capacity: Option<i32>,
    // 主讲教师
    pub teacher_id: Option<i64>,
    pub status: CourseStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 当前请求用户在课程中的成员信息，由 RequireCourseRole 写入请求扩展
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseMember {
    pub course_id: i64,
    pub user_id: i64,
    pub role: CourseRole,
}
