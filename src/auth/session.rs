use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// 保存会话令牌的 cookie 名称
pub const SESSION_COOKIE: &str = "access_token";

/// 会话令牌的声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 id
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// 会话令牌的签发与解析（HS256）
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// 令牌有效期，与 cookie 的 max-age 一致
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 为用户签发会话令牌
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// 解析会话令牌，返回用户 id
    ///
    /// 格式错误、签名不符或已过期都返回 `None`，由调用方决定跳转登录页。
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims.sub.parse().ok(),
            Err(e) => {
                tracing::debug!(%e, "rejected session token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret", Duration::hours(24))
    }

    #[test]
    fn test_issue_and_resolve() {
        let user_id = Uuid::new_v4();
        let token = keys().issue(user_id).expect("签发失败");
        assert_eq!(keys().resolve(&token), Some(user_id));
    }

    #[test]
    fn test_resolve_malformed() {
        assert_eq!(keys().resolve("garbage"), None);
        assert_eq!(keys().resolve(""), None);
    }

    #[test]
    fn test_resolve_wrong_secret() {
        let token = keys().issue(Uuid::new_v4()).expect("签发失败");
        let other = SessionKeys::new(b"other-secret", Duration::hours(24));
        assert_eq!(other.resolve(&token), None);
    }

    #[test]
    fn test_resolve_expired() {
        let expired = SessionKeys::new(b"test-secret", Duration::hours(-2));
        let token = expired.issue(Uuid::new_v4()).expect("签发失败");
        assert_eq!(keys().resolve(&token), None);
    }
}
