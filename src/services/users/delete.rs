use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_user;

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let operator = current_user(request)?;

    if user_id == operator.id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "不能删除当前登录的用户",
        )));
    }

    let storage = service.get_storage(request)?;

    if storage.delete_user(user_id).await? {
        info!("用户 {} 已被 {} 删除", user_id, operator.id);
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("用户删除成功")))
    } else {
        Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "用户不存在",
        )))
    }
}
