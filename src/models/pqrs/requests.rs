use super::entities::{PqrKind, PqrStatus};
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "pqr.ts")]
pub struct CreatePqrRequest {
    pub kind: PqrKind,
    pub subject: String,
    pub description: String,
    pub course_id: Option<i64>,
    // 指定处理人，不指定时按课程主讲教师分派
    pub assignee_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "pqr.ts")]
pub struct RespondPqrRequest {
    pub response: Option<String>,
    pub status: PqrStatus,
    pub assignee_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "pqr.ts")]
pub struct PqrListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<PqrStatus>,
    pub kind: Option<PqrKind>,
}

#[derive(Debug, Clone, Default)]
pub struct PqrListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub status: Option<PqrStatus>,
    pub kind: Option<PqrKind>,
    /// 可见范围：本人提交或指派给本人（协调员为 None，不限制）
    pub visible_to: Option<i64>,
}
