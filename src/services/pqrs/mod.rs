//! PQR 工单（请求、投诉、申诉、建议）

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use crate::models::pqrs::entities::{Pqr, PqrStatus};
use crate::models::pqrs::requests::{CreatePqrRequest, PqrListParams, PqrListQuery, RespondPqrRequest};
use crate::models::users::entities::{User, UserRole, UserStatus};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::validate::{validate_optional_text, validate_required_text};

use super::{bad_request, conflict, current_user, forbidden, load_course, not_found};

pub struct PqrService {
    storage: Option<Arc<dyn Storage>>,
}

impl PqrService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    /// 任何登录用户都可以提交；未指定处理人时分派给课程主讲教师，否则留给协调员
    pub async fn create_pqr(
        &self,
        request: &HttpRequest,
        mut pqr_data: CreatePqrRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        pqr_data.subject = pqr_data.subject.trim().to_string();
        pqr_data.description = pqr_data.description.trim().to_string();
        validate_required_text("主题", &pqr_data.subject, 200)
            .and_then(|_| validate_required_text("内容", &pqr_data.description, 4000))
            .map_err(|msg| bad_request(ErrorCode::PqrInvalid, msg))?;

        let course = match pqr_data.course_id {
            Some(course_id) => {
                let course = load_course(&storage, course_id).await?;
                if user.role != UserRole::Coordinator
                    && storage.get_course_role(course_id, user.id).await?.is_none()
                {
                    return Err(forbidden(
                        ErrorCode::CoursePermissionDenied,
                        "不是该课程的成员",
                    ));
                }
                Some(course)
            }
            None => None,
        };

        let assignee_id = match pqr_data.assignee_id {
            Some(assignee_id) => {
                ensure_handler(&storage, assignee_id).await?;
                Some(assignee_id)
            }
            None => course.and_then(|c| c.teacher_id),
        };

        let pqr = storage.create_pqr(user.id, assignee_id, pqr_data).await?;
        info!(
            "用户 {} 提交工单 {} ({})，处理人 {:?}",
            user.id,
            pqr.id,
            pqr.kind.as_str(),
            pqr.assignee_id
        );
        Ok(HttpResponse::Created().json(ApiResponse::success(pqr, "工单提交成功")))
    }

    /// 协调员看到全部；其他人看到自己提交的或指派给自己的
    pub async fn list_pqrs(
        &self,
        request: &HttpRequest,
        query: PqrListParams,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let visible_to = (user.role != UserRole::Coordinator).then_some(user.id);
        let list_query = PqrListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            status: query.status,
            kind: query.kind,
            visible_to,
        };
        let response = storage.list_pqrs_with_pagination(list_query).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取工单列表成功")))
    }

    pub async fn get_pqr(&self, request: &HttpRequest, pqr_id: i64) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let pqr = load_pqr(&storage, pqr_id).await?;
        if !can_view(&user, &pqr) {
            return Err(forbidden(ErrorCode::Forbidden, "无权查看该工单"));
        }
        Ok(HttpResponse::Ok().json(ApiResponse::success(pqr, "获取工单成功")))
    }

    /// 处理人或协调员答复；改派处理人只有协调员可以
    pub async fn respond_pqr(
        &self,
        request: &HttpRequest,
        pqr_id: i64,
        mut body: RespondPqrRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let pqr = load_pqr(&storage, pqr_id).await?;
        if !can_respond(&user, &pqr) {
            return Err(forbidden(ErrorCode::Forbidden, "只有处理人或协调员可以答复"));
        }
        if pqr.status.is_final() {
            return Err(conflict(ErrorCode::PqrInvalid, "工单已结束"));
        }

        body.response = body.response.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        validate_response(&pqr, &body).map_err(|msg| bad_request(ErrorCode::PqrInvalid, msg))?;

        if let Some(assignee_id) = body.assignee_id {
            if user.role != UserRole::Coordinator {
                return Err(forbidden(ErrorCode::Forbidden, "只有协调员可以改派处理人"));
            }
            ensure_handler(&storage, assignee_id).await?;
        }

        let status = body.status;
        let pqr = storage
            .respond_pqr(pqr.id, user.id, body)
            .await?
            .ok_or_else(|| not_found(ErrorCode::PqrNotFound, "工单不存在"))?;
        info!("工单 {} 状态更新为 {} (处理人 {})", pqr.id, status.as_str(), user.id);
        Ok(HttpResponse::Ok().json(ApiResponse::success(pqr, "工单已更新")))
    }

    pub async fn delete_pqr(&self, request: &HttpRequest, pqr_id: i64) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        if !storage.delete_pqr(pqr_id).await? {
            return Err(not_found(ErrorCode::PqrNotFound, "工单不存在"));
        }
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("工单已删除")))
    }
}

async fn load_pqr(storage: &Arc<dyn Storage>, pqr_id: i64) -> ActixResult<Pqr> {
    storage
        .get_pqr(pqr_id)
        .await?
        .ok_or_else(|| not_found(ErrorCode::PqrNotFound, "工单不存在"))
}

/// 处理人必须是在职的教职人员
async fn ensure_handler(storage: &Arc<dyn Storage>, user_id: i64) -> ActixResult<()> {
    let handler = storage.get_user_by_id(user_id).await?;
    match handler {
        Some(u) if u.role.is_staff() && u.status == UserStatus::Active => Ok(()),
        _ => Err(bad_request(ErrorCode::PqrInvalid, "处理人必须是在职的教职人员")),
    }
}

pub(crate) fn can_view(user: &User, pqr: &Pqr) -> bool {
    user.role == UserRole::Coordinator
        || pqr.requester_id == user.id
        || pqr.assignee_id == Some(user.id)
}

pub(crate) fn can_respond(user: &User, pqr: &Pqr) -> bool {
    user.role == UserRole::Coordinator || pqr.assignee_id == Some(user.id)
}

/// 答复只能把工单推进到处理中或结束；标记为已解决时必须有答复内容
pub(crate) fn validate_response(pqr: &Pqr, body: &RespondPqrRequest) -> Result<(), String> {
    if body.status == PqrStatus::Open {
        return Err("不能将工单改回待处理".to_string());
    }
    validate_optional_text("答复", body.response.as_deref(), 4000)?;
    if body.status == PqrStatus::Resolved && body.response.is_none() && pqr.response.is_none() {
        return Err("标记为已解决时需要填写答复".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pqrs::entities::PqrKind;

    fn user(id: i64, role: UserRole) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            username: format!("u{id}"),
            email: format!("u{id}@school.test"),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            avatar_url: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn pqr(requester_id: i64, assignee_id: Option<i64>) -> Pqr {
        let now = chrono::Utc::now();
        Pqr {
            id: 1,
            requester_id,
            course_id: None,
            assignee_id,
            kind: PqrKind::Claim,
            subject: "Nota del parcial".to_string(),
            description: "Solicito revisión".to_string(),
            status: PqrStatus::Open,
            response: None,
            responded_by: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn respond(status: PqrStatus, response: Option<&str>) -> RespondPqrRequest {
        RespondPqrRequest {
            response: response.map(str::to_string),
            status,
            assignee_id: None,
        }
    }

    #[test]
    fn test_visibility() {
        let ticket = pqr(10, Some(20));
        assert!(can_view(&user(10, UserRole::Student), &ticket));
        assert!(can_view(&user(20, UserRole::Teacher), &ticket));
        assert!(can_view(&user(1, UserRole::Coordinator), &ticket));
        assert!(!can_view(&user(30, UserRole::Teacher), &ticket));

        assert!(!can_respond(&user(10, UserRole::Student), &ticket));
        assert!(can_respond(&user(20, UserRole::Teacher), &ticket));
        assert!(can_respond(&user(1, UserRole::Coordinator), &pqr(10, None)));
    }

    #[test]
    fn test_response_rules() {
        let ticket = pqr(10, Some(20));
        assert!(validate_response(&ticket, &respond(PqrStatus::InProgress, None)).is_ok());
        assert!(validate_response(&ticket, &respond(PqrStatus::Open, None)).is_err());
        assert!(validate_response(&ticket, &respond(PqrStatus::Resolved, None)).is_err());
        assert!(validate_response(&ticket, &respond(PqrStatus::Resolved, Some("Revisado"))).is_ok());
        assert!(validate_response(&ticket, &respond(PqrStatus::Closed, None)).is_ok());
    }
}
