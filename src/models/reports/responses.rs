use super::entities::Report;
use crate::models::common::PaginationInfo;
use crate::models::courses::entities::Course;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct ReportListResponse {
    pub items: Vec<Report>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct CourseSummaryStudent {
    pub student_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub attendance_rate: Option<f64>,
    pub weighted_average: Option<f64>,
    pub exams_submitted: usize,
}

// 课程汇总报表（实时计算，不落库）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct CourseSummaryResponse {
    pub course: Course,
    pub enrolled_students: usize,
    pub lesson_count: u64,
    pub exam_count: u64,
    pub attendance_rate: Option<f64>,
    pub average_grade: Option<f64>,
    pub students: Vec<CourseSummaryStudent>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
