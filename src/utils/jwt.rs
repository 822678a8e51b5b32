//! 访问令牌与刷新令牌
//!
//! access token 放在 `Authorization` 头中，refresh token 只通过 HttpOnly cookie 下发。

use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use once_cell::sync::Lazy;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // 用户 ID
    pub role: String, // 签发时的全局角色
    #[serde(rename = "token_type")]
    pub kind: TokenKind,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    // refresh token 的有效期，决定 cookie 的 max-age
    pub refresh_ttl: chrono::Duration,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

// 未配置密钥时每次进程启动随机生成，重启后旧令牌全部失效
static KEYS: Lazy<SigningKeys> = Lazy::new(|| {
    let configured = AppConfig::get().jwt.secret.clone();
    let secret = if configured.is_empty() {
        warn!("jwt.secret 未配置，使用随机密钥，重启后所有登录会话失效");
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect()
    } else {
        configured
    };
    SigningKeys {
        encoding: EncodingKey::from_secret(secret.as_bytes()),
        decoding: DecodingKey::from_secret(secret.as_bytes()),
    }
});

pub struct JwtUtils;

impl JwtUtils {
    pub fn access_ttl() -> chrono::Duration {
        chrono::Duration::minutes(AppConfig::get().jwt.access_token_expiry)
    }

    /// 刷新令牌有效期；`remember_me` 时使用更长的配置值
    pub fn refresh_ttl(remember_me: bool) -> chrono::Duration {
        let jwt = &AppConfig::get().jwt;
        if remember_me {
            chrono::Duration::days(jwt.refresh_token_remember_me_expiry)
        } else {
            chrono::Duration::days(jwt.refresh_token_expiry)
        }
    }

    pub fn issue(
        user_id: i64,
        role: &str,
        kind: TokenKind,
        ttl: chrono::Duration,
    ) -> Result<String, JwtError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            kind,
            exp: (now + ttl).timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &KEYS.encoding)
    }

    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        remember_me: bool,
    ) -> Result<TokenPair, JwtError> {
        let refresh_ttl = Self::refresh_ttl(remember_me);
        Ok(TokenPair {
            access_token: Self::issue(user_id, role, TokenKind::Access, Self::access_ttl())?,
            refresh_token: Self::issue(user_id, role, TokenKind::Refresh, refresh_ttl)?,
            refresh_ttl,
        })
    }

    /// 校验签名、过期时间与令牌类型
    pub fn verify(token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &KEYS.decoding, &Validation::default())?.claims;
        if claims.kind != expected || claims.user_id().is_none() {
            return Err(JwtError::from(ErrorKind::InvalidToken));
        }
        Ok(claims)
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, JwtError> {
        Self::verify(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, JwtError> {
        Self::verify(token, TokenKind::Refresh)
    }

    /// 用刷新令牌换取新的 access token，角色沿用签发时的值
    pub fn refresh_access_token(refresh_token: &str) -> Result<String, JwtError> {
        let claims = Self::verify_refresh_token(refresh_token)?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| JwtError::from(ErrorKind::InvalidToken))?;
        Self::issue(user_id, &claims.role, TokenKind::Access, Self::access_ttl())
    }

    pub fn create_refresh_token_cookie(pair: &TokenPair) -> Cookie<'static> {
        refresh_cookie(
            pair.refresh_token.clone(),
            actix_web::cookie::time::Duration::seconds(pair.refresh_ttl.num_seconds()),
        )
    }

    /// 注销或令牌失效时覆盖浏览器中的 cookie
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        refresh_cookie(String::new(), actix_web::cookie::time::Duration::ZERO)
    }

    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

fn refresh_cookie(value: String, max_age: actix_web::cookie::time::Duration) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, value)
        .path("/api/v1/auth")
        .max_age(max_age)
        .same_site(SameSite::Strict)
        .http_only(true)
        .secure(AppConfig::get().is_production())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_types_are_not_interchangeable() {
        let pair = JwtUtils::generate_token_pair(7, "teacher", false).unwrap();

        let claims = JwtUtils::verify_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.role, "teacher");

        assert!(JwtUtils::verify_refresh_token(&pair.access_token).is_err());
        assert!(JwtUtils::verify_access_token(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_remember_me_extends_refresh_ttl() {
        let short = JwtUtils::generate_token_pair(1, "student", false).unwrap();
        let long = JwtUtils::generate_token_pair(1, "student", true).unwrap();
        assert!(long.refresh_ttl > short.refresh_ttl);

        let cookie = JwtUtils::create_refresh_token_cookie(&long);
        assert_eq!(
            cookie.max_age().map(|d| d.whole_seconds()),
            Some(long.refresh_ttl.num_seconds())
        );
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_refresh_issues_access_token() {
        let refresh =
            JwtUtils::issue(3, "student", TokenKind::Refresh, JwtUtils::refresh_ttl(false))
                .unwrap();
        let access = JwtUtils::refresh_access_token(&refresh).unwrap();
        let claims = JwtUtils::verify_access_token(&access).unwrap();
        assert_eq!(claims.user_id(), Some(3));
        assert_eq!(claims.role, "student");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = JwtUtils::issue(
            1,
            "coordinator",
            TokenKind::Access,
            chrono::Duration::minutes(-10),
        )
        .unwrap();
        assert!(JwtUtils::verify_access_token(&token).is_err());
    }

    #[test]
    fn test_empty_cookie_clears_value() {
        let cookie = JwtUtils::create_empty_refresh_token_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
    }
}
