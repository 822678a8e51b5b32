//! 报告存储操作

use super::SeaOrmStorage;
use crate::entity::reports::{ActiveModel, Column, Entity as Reports};
use crate::errors::{Result, SchoolError};
use crate::models::{
    common::pagination::page_window,
    reports::{
        entities::Report,
        requests::{CreateReportRequest, ReportListQuery, UpdateReportRequest},
        responses::ReportListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_report_impl(
        &self,
        course_id: Option<i64>,
        author_id: i64,
        req: CreateReportRequest,
    ) -> Result<Report> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(course_id),
            author_id: Set(author_id),
            title: Set(req.title),
            kind: Set(req.kind.to_string()),
            content: Set(req.content),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| super::insert_error(e, "报告"))?;

        Ok(result.into_report())
    }

    pub async fn get_report_impl(&self, report_id: i64) -> Result<Option<Report>> {
        let result = Reports::find_by_id(report_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询报告失败: {e}")))?;

        Ok(result.map(|m| m.into_report()))
    }

    pub async fn list_reports_with_pagination_impl(
        &self,
        query: ReportListQuery,
    ) -> Result<ReportListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = Reports::find();
        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }
        if let Some(kind) = query.kind {
            select = select.filter(Column::Kind.eq(kind.to_string()));
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Title.contains(&escaped));
        }
        select = select.order_by_desc(Column::CreatedAt);

        let (reports, pagination) = super::fetch_page(&self.db, select, page, size, "报告").await?;

        Ok(ReportListResponse {
            items: reports.into_iter().map(|m| m.into_report()).collect(),
            pagination,
        })
    }

    pub async fn update_report_impl(
        &self,
        report_id: i64,
        update: UpdateReportRequest,
    ) -> Result<Option<Report>> {
        let Some(existing) = Reports::find_by_id(report_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询报告失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(kind) = update.kind {
            model.kind = Set(kind.to_string());
        }
        if let Some(content) = update.content {
            model.content = Set(content);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新报告失败: {e}")))?;

        Ok(Some(result.into_report()))
    }

    pub async fn delete_report_impl(&self, report_id: i64) -> Result<bool> {
        let result = Reports::delete_by_id(report_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除报告失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
