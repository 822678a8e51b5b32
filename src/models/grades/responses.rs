use super::entities::GradeRecord;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeListResponse {
    pub items: Vec<GradeRecord>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct StudentGradeSummary {
    pub student_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub grade_count: usize,
    pub weighted_average: Option<f64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeSummaryResponse {
    pub course_id: i64,
    pub items: Vec<StudentGradeSummary>,
    // 所有学生加权平均分的算术平均
    pub course_average: Option<f64>,
}

// 学生查看自己在所有课程中的成绩
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct MyCourseGrades {
    pub course_id: i64,
    pub course_name: String,
    pub weighted_average: Option<f64>,
    pub records: Vec<GradeRecord>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct MyGradesResponse {
    pub courses: Vec<MyCourseGrades>,
}
