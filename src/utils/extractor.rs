//! 路径参数提取器
//!
//! 非法的 ID（非数字、非正数）在进入业务代码前就返回统一格式的 400 响应。

use actix_web::{HttpRequest, HttpResponse, error::InternalError};

use crate::models::{ApiResponse, ErrorCode};

fn bad_request(message: String) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

/// 从路径中读取正整数参数
pub fn parse_positive_i64(req: &HttpRequest, param: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(param).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(bad_request(format!("路径参数 {param} 无效: '{raw}'"))),
    }
}

#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = std::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                std::future::ready(
                    $crate::utils::extractor::parse_positive_i64(req, $param).map($name),
                )
            }
        }
    };
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeCourseIdI64, "course_id");
define_safe_i64_extractor!(SafeUserIdI64, "user_id");
define_safe_i64_extractor!(SafeEnrollmentIdI64, "enrollment_id");
define_safe_i64_extractor!(SafeLessonIdI64, "lesson_id");
define_safe_i64_extractor!(SafeExamIdI64, "exam_id");
define_safe_i64_extractor!(SafeSubmissionIdI64, "submission_id");
define_safe_i64_extractor!(SafeGradeIdI64, "grade_id");
define_safe_i64_extractor!(SafeAttendanceIdI64, "attendance_id");
define_safe_i64_extractor!(SafeReportIdI64, "report_id");

/// 文件下载令牌（UUID 字符集）
#[derive(Debug, Clone)]
pub struct SafeFileToken(pub String);

impl actix_web::FromRequest for SafeFileToken {
    type Error = actix_web::Error;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let raw = req.match_info().get("token").unwrap_or_default();
        let valid = !raw.is_empty()
            && raw.len() <= 64
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        std::future::ready(if valid {
            Ok(SafeFileToken(raw.to_string()))
        } else {
            Err(bad_request(format!("文件令牌无效: '{raw}'")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{FromRequest, test::TestRequest};

    #[actix_web::test]
    async fn test_positive_id_is_extracted() {
        let req = TestRequest::default()
            .param("course_id", "42")
            .to_http_request();
        let id = SafeCourseIdI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_invalid_ids_are_rejected() {
        for raw in ["0", "-3", "abc", ""] {
            let req = TestRequest::default().param("exam_id", raw).to_http_request();
            assert!(SafeExamIdI64::extract(&req).await.is_err(), "{raw}");
        }
    }

    #[actix_web::test]
    async fn test_file_token() {
        let req = TestRequest::default()
            .param("token", "0b6f1c3e-8f1a-4c55-9d7e-2f7f0a1b2c3d")
            .to_http_request();
        assert!(SafeFileToken::extract(&req).await.is_ok());

        let req = TestRequest::default()
            .param("token", "../etc/passwd")
            .to_http_request();
        assert!(SafeFileToken::extract(&req).await.is_err());
    }
}
