//! PQR 工单存储操作

use super::SeaOrmStorage;
use crate::entity::pqrs::{ActiveModel, Column, Entity as Pqrs};
use crate::errors::{Result, SchoolError};
use crate::models::{
    common::pagination::page_window,
    pqrs::{
        entities::{Pqr, PqrStatus},
        requests::{CreatePqrRequest, PqrListQuery, RespondPqrRequest},
        responses::PqrListResponse,
    },
};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_pqr_impl(
        &self,
        requester_id: i64,
        assignee_id: Option<i64>,
        req: CreatePqrRequest,
    ) -> Result<Pqr> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            requester_id: Set(requester_id),
            course_id: Set(req.course_id),
            assignee_id: Set(assignee_id),
            kind: Set(req.kind.to_string()),
            subject: Set(req.subject),
            description: Set(req.description),
            status: Set(PqrStatus::Open.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| super::insert_error(e, "工单"))?;

        Ok(result.into_pqr())
    }

    pub async fn get_pqr_impl(&self, pqr_id: i64) -> Result<Option<Pqr>> {
        let result = Pqrs::find_by_id(pqr_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询工单失败: {e}")))?;

        Ok(result.map(|m| m.into_pqr()))
    }

    pub async fn list_pqrs_with_pagination_impl(
        &self,
        query: PqrListQuery,
    ) -> Result<PqrListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = Pqrs::find();
        if let Some(user_id) = query.visible_to {
            select = select.filter(
                Condition::any()
                    .add(Column::RequesterId.eq(user_id))
                    .add(Column::AssigneeId.eq(user_id)),
            );
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        if let Some(kind) = query.kind {
            select = select.filter(Column::Kind.eq(kind.to_string()));
        }
        select = select.order_by_desc(Column::CreatedAt);

        let (pqrs, pagination) = super::fetch_page(&self.db, select, page, size, "工单").await?;

        Ok(PqrListResponse {
            items: pqrs.into_iter().map(|m| m.into_pqr()).collect(),
            pagination,
        })
    }

    /// 回复工单并更新状态
    pub async fn respond_pqr_impl(
        &self,
        pqr_id: i64,
        responder_id: i64,
        req: RespondPqrRequest,
    ) -> Result<Option<Pqr>> {
        let Some(existing) = Pqrs::find_by_id(pqr_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询工单失败: {e}")))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let mut model: ActiveModel = existing.into();
        model.status = Set(req.status.to_string());
        model.updated_at = Set(now);
        if let Some(assignee_id) = req.assignee_id {
            model.assignee_id = Set(Some(assignee_id));
        }
        if let Some(response) = req.response.filter(|s| !s.trim().is_empty()) {
            model.response = Set(Some(response));
            model.responded_by = Set(Some(responder_id));
            model.responded_at = Set(Some(now));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新工单失败: {e}")))?;

        Ok(Some(result.into_pqr()))
    }

    pub async fn delete_pqr_impl(&self, pqr_id: i64) -> Result<bool> {
        let result = Pqrs::delete_by_id(pqr_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除工单失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
