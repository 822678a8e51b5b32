use super::entities::{AttendanceRecord, AttendanceTally};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceListResponse {
    pub items: Vec<AttendanceRecord>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct RecordAttendanceResponse {
    pub items: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct StudentAttendanceSummary {
    pub student_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub tally: AttendanceTally,
    pub attendance_rate: Option<f64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceSummaryResponse {
    pub course_id: i64,
    pub items: Vec<StudentAttendanceSummary>,
    pub course_rate: Option<f64>,
}
