use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::middlewares::require_jwt::{bearer_token, invalidate_cached_user};
use crate::models::auth::requests::UpdateProfileRequest;
use crate::models::users::requests::UpdateUserRequest;
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_user;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_optional_text, validate_password};

use super::AuthService;

pub async fn handle_update_profile(
    service: &AuthService,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user = current_user(request)?;

    if let Some(ref email) = update_data.email {
        if let Err(msg) = validate_email(email) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
        }
        if let Some(existing) = storage.get_user_by_email(email).await?
            && existing.id != user.id
        {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "该邮箱已被使用",
            )));
        }
    }

    if let Err(msg) = validate_optional_text("显示名称", update_data.display_name.as_deref(), 64)
        .and_then(|_| validate_optional_text("头像地址", update_data.avatar_url.as_deref(), 512))
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let password_hash = match update_data.password {
        Some(ref password) => {
            if let Err(msg) = validate_password(password) {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::UserPasswordInvalid,
                    msg,
                )));
            }
            Some(hash_password(password)?)
        }
        None => None,
    };

    // 角色与状态只能由协调员修改
    let storage_update = UpdateUserRequest {
        email: update_data.email,
        password: password_hash,
        role: None,
        status: None,
        display_name: update_data.display_name,
        avatar_url: update_data.avatar_url,
    };

    match storage.update_user(user.id, storage_update).await? {
        Some(updated) => {
            // 缓存中的旧资料作废
            if let (Some(token), Some(cache)) = (
                bearer_token(request),
                request.app_data::<web::Data<Arc<dyn ObjectCache>>>(),
            ) {
                invalidate_cached_user(cache.get_ref(), token).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user: updated },
                "个人资料已更新",
            )))
        }
        None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "用户不存在",
        ))),
    }
}
