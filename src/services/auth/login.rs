use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use crate::models::users::entities::UserStatus;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
};
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::AuthService;

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let config = service.get_config();

    // 1. 用户名或邮箱
    let user = storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await?;

    // 2. 校验密码（Argon2id）
    let Some(user) = user.filter(|u| verify_password(&login_request.password, &u.password_hash))
    else {
        info!("登录失败: {}", login_request.username);
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::AuthFailed,
            "用户名或密码错误",
        )));
    };

    // 3. 停用或封禁的账号不能登录
    if user.status != UserStatus::Active {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::UserInactive,
            format!("账号状态为 {}，无法登录", user.status),
        )));
    }

    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("更新最后登录时间失败: {}", e);
    }

    // 4. 生成令牌对，记住我时延长 refresh token 有效期
    let token_pair = match user.generate_token_pair(login_request.remember_me) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("生成 JWT 失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "登录失败，无法生成令牌",
                )),
            );
        }
    };

    info!("用户 {} 登录成功", user.username);

    let refresh_cookie = jwt::JwtUtils::create_refresh_token_cookie(&token_pair);

    let response = LoginResponse {
        access_token: token_pair.access_token,
        expires_in: config.jwt.access_token_expiry * 60,
        user,
        created_at: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "登录成功")))
}
