//! 将 actix 的 JSON / Query 反序列化错误改写为统一响应格式

use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("JSON 解析失败 {}: {}", req.path(), err);
    let message = match &err {
        JsonPayloadError::ContentType => "请求需要 application/json 内容类型".to_string(),
        JsonPayloadError::Overflow { limit } | JsonPayloadError::OverflowKnownLength { limit, .. } => {
            format!("请求体超过大小限制 ({limit} 字节)")
        }
        JsonPayloadError::Deserialize(e) => format!("请求参数错误: {e}"),
        _ => format!("请求体无效: {err}"),
    };
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(err, response).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Query 解析失败 {}: {}", req.path(), err);
    let message = match &err {
        QueryPayloadError::Deserialize(e) => format!("查询参数错误: {e}"),
        _ => format!("查询参数无效: {err}"),
    };
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(err, response).into()
}
