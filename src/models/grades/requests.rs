use super::entities::GradeCategory;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct CreateGradeRequest {
    pub student_id: i64,
    pub exam_id: Option<i64>,
    pub title: String,
    pub category: GradeCategory,
    pub score: f64,
    pub max_score: Option<f64>,
    pub weight: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct UpdateGradeRequest {
    pub title: Option<String>,
    pub category: Option<GradeCategory>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub weight: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub student_id: Option<i64>,
    pub category: Option<GradeCategory>,
}

#[derive(Debug, Clone, Default)]
pub struct GradeListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub course_id: Option<i64>,
    pub student_id: Option<i64>,
    pub category: Option<GradeCategory>,
}
