//! 课程教职人员分配

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use crate::models::assignments::{
    entities::AssignmentRole, requests::AssignStaffRequest, responses::AssignmentListResponse,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

use super::{current_user, load_course};

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    pub async fn list_assignments(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let items = storage.list_course_assignments(course_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse { items },
            "获取课程教职人员成功",
        )))
    }

    /// 分配身份由用户的系统角色决定：教师为 teacher，助教为 assistant
    pub async fn assign_staff(
        &self,
        request: &HttpRequest,
        course_id: i64,
        assign_data: AssignStaffRequest,
    ) -> ActixResult<HttpResponse> {
        let operator = current_user(request)?;
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let Some(user) = storage.get_user_by_id(assign_data.user_id).await? else {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "用户不存在",
            )));
        };

        let Some(role) = assignment_role_for(user.role) else {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::UserRoleInvalid,
                "只能分配教师或助教",
            )));
        };

        if storage.get_course_assignment(course_id, user.id).await?.is_some() {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::AssignmentAlreadyExists,
                "该用户已分配到课程",
            )));
        }

        let assignment = storage.assign_course_staff(course_id, user.id, role).await?;
        info!(
            "用户 {} 以 {} 身份分配到课程 {}（操作人 {}）",
            user.id, role, course_id, operator.id
        );

        Ok(HttpResponse::Created().json(ApiResponse::success(assignment, "分配成功")))
    }

    pub async fn unassign_staff(
        &self,
        request: &HttpRequest,
        course_id: i64,
        user_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let course = load_course(&storage, course_id).await?;

        if course.teacher_id == Some(user_id) {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::CourseInvalid,
                "不能取消主讲教师的分配，请先更换主讲教师",
            )));
        }

        if storage.unassign_course_staff(course_id, user_id).await? {
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("已取消分配")))
        } else {
            Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "分配记录不存在",
            )))
        }
    }
}

fn assignment_role_for(role: UserRole) -> Option<AssignmentRole> {
    match role {
        UserRole::Teacher => Some(AssignmentRole::Teacher),
        UserRole::Assistant => Some(AssignmentRole::Assistant),
        UserRole::Coordinator | UserRole::Student => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_role_follows_user_role() {
        assert_eq!(
            assignment_role_for(UserRole::Teacher),
            Some(AssignmentRole::Teacher)
        );
        assert_eq!(
            assignment_role_for(UserRole::Assistant),
            Some(AssignmentRole::Assistant)
        );
        assert_eq!(assignment_role_for(UserRole::Student), None);
        assert_eq!(assignment_role_for(UserRole::Coordinator), None);
    }
}
