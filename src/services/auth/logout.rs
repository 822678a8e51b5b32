use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::middlewares::require_jwt::{bearer_token, invalidate_cached_user};
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

/// 清除 refresh token cookie，并丢弃当前 access token 的用户缓存
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    if let (Some(token), Some(cache)) = (
        bearer_token(request),
        request.app_data::<web::Data<Arc<dyn ObjectCache>>>(),
    ) {
        invalidate_cached_user(cache.get_ref(), token).await;
    }

    // max_age=0 让浏览器删除 cookie
    let empty_cookie = JwtUtils::create_empty_refresh_token_cookie();

    Ok(HttpResponse::Ok()
        .cookie(empty_cookie)
        .json(ApiResponse::<()>::success_empty("登出成功")))
}
