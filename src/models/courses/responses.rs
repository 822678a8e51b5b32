use super::entities::{Course, CourseRole};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 课程列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Course>,
}

// 课程详情（附带当前用户在课程中的身份）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseDetailResponse {
    pub course: Course,
    pub my_role: CourseRole,
}
