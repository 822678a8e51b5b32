use super::entities::CourseStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 课程查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
    pub status: Option<CourseStatus>,
}

// 创建课程请求
//
// teacher_id 可选；填写时必须是教师角色的用户，并同时创建一条教师分配记录
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateCourseRequest {
    pub name: String,
    pub language: String,
    pub level: String,
    pub description: Option<String>,
    pub schedule: Option<String>,
    pub capacity: Option<i32>,
    pub teacher_id: Option<i64>,
}

// 更新课程请求
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub schedule: Option<String>,
    pub capacity: Option<i32>,
    pub teacher_id: Option<i64>,
    pub status: Option<CourseStatus>,
}

// 课程列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
    pub status: Option<CourseStatus>,
    /// 仅列出该用户被分配或选修的课程
    pub member_id: Option<i64>,
}
