use super::entities::ReportKind;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct CreateReportRequest {
    pub title: String,
    pub kind: ReportKind,
    pub content: String,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct UpdateReportRequest {
    pub title: Option<String>,
    pub kind: Option<ReportKind>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct ReportListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub kind: Option<ReportKind>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub course_id: Option<i64>,
    pub kind: Option<ReportKind>,
    pub search: Option<String>,
}
