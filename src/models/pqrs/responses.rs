use super::entities::Pqr;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "pqr.ts")]
pub struct PqrListResponse {
    pub items: Vec<Pqr>,
    pub pagination: PaginationInfo,
}
