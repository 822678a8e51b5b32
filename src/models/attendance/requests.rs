use super::entities::AttendanceStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceEntry {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

// 批量点名；同一学生同一天已有记录时覆盖
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct RecordAttendanceRequest {
    pub session_date: chrono::NaiveDate,
    pub lesson_id: Option<i64>,
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct UpdateAttendanceRequest {
    pub status: Option<AttendanceStatus>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub student_id: Option<i64>,
    pub lesson_id: Option<i64>,
    pub session_date: Option<chrono::NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub lesson_id: Option<i64>,
    pub session_date: Option<chrono::NaiveDate>,
    pub status: Option<AttendanceStatus>,
}
