use super::entities::EnrollmentStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollStudentRequest {
    pub student_id: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct UpdateEnrollmentRequest {
    pub status: EnrollmentStatus,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<EnrollmentStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EnrollmentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub status: Option<EnrollmentStatus>,
    pub search: Option<String>,
}
