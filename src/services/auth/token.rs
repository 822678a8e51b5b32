use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::auth::responses::{
    RefreshTokenResponse, TokenVerificationResponse, UserInfoResponse,
};
use crate::models::users::entities::UserStatus;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_user;
use crate::utils::jwt;

use super::AuthService;

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let Some(refresh_token) = jwt::JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "未登录，请先登录",
        )));
    };

    let unauthorized = |message: &str| {
        // 同时清除无效的 cookie
        HttpResponse::Unauthorized()
            .cookie(jwt::JwtUtils::create_empty_refresh_token_cookie())
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, message))
    };

    let claims = match jwt::JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::info!("Refresh token 校验失败: {}", e);
            return Ok(unauthorized("登录已过期，请重新登录"));
        }
    };

    // 账号在 refresh token 有效期内被停用时不再续期
    let storage = service.get_storage(request)?;
    let user_id = claims.user_id().unwrap_or_default();
    match storage.get_user_by_id(user_id).await? {
        Some(user) if user.status == UserStatus::Active => {}
        _ => return Ok(unauthorized("账号不可用，请重新登录")),
    }

    match jwt::JwtUtils::refresh_access_token(&refresh_token) {
        Ok(access_token) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RefreshTokenResponse {
                access_token,
                expires_in: config.jwt.access_token_expiry * 60,
            },
            "令牌刷新成功",
        ))),
        Err(e) => {
            tracing::error!("生成 access token 失败: {}", e);
            Ok(unauthorized("登录已过期，请重新登录"))
        }
    }
}

pub async fn handle_verify_token(
    _service: &AuthService,
    _request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TokenVerificationResponse { is_valid: true },
        "令牌有效",
    )))
}

pub async fn handle_get_user(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserInfoResponse { user },
        "获取用户信息成功",
    )))
}
