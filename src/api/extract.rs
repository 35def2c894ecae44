use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::{
    auth::SESSION_COOKIE,
    error::{Error, PageError},
    service::{api_keys, identity},
    state::AppState,
    storage::{ApiKey, User},
};

/// 已登录用户，未登录时浏览器页面跳转到登录页
pub struct CurrentUser(pub User);

/// 可能已登录的用户
pub struct MaybeUser(pub Option<User>);

/// 通过 `Authorization: Bearer <key>` 认证的 API key
pub struct ApiKeyAuth(pub ApiKey);

async fn session_user(parts: &Parts, state: &AppState) -> Result<Option<User>, Error> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let mut db = state.db();
    identity::current_user(&mut db, state.sessions(), cookie.value()).await
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or(PageError(Error::Unauthorized("Not authenticated")))
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_user(parts, state).await?))
    }
}

/// 从请求头中取出 API key 明文
fn bearer_key(parts: &Parts) -> Result<&str, Error> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(Error::Unauthorized(
            "Missing Authorization header. Use: Authorization: Bearer <api_key>",
        ))?;

    let key = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(Error::Unauthorized(
            "Invalid Authorization format. Use: Authorization: Bearer <api_key>",
        ))?
        .trim();

    if key.is_empty() {
        return Err(Error::Unauthorized("API key is empty"));
    }
    Ok(key)
}

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = bearer_key(parts)?;
        let mut db = state.db();
        api_keys::verify(&mut db, raw)
            .await?
            .map(ApiKeyAuth)
            .ok_or(Error::Unauthorized("Invalid API key"))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(auth: Option<&str>) -> Parts {
        let mut builder = Request::get("/api/v1/posts");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_key() {
        assert_eq!(bearer_key(&parts(Some("Bearer cpk_abc "))).unwrap(), "cpk_abc");

        let message = |auth| match bearer_key(&parts(auth)) {
            Err(Error::Unauthorized(m)) => m,
            other => panic!("应返回 401: {other:?}"),
        };
        assert!(message(None).starts_with("Missing Authorization header"));
        assert!(message(Some("Token cpk_abc")).starts_with("Invalid Authorization format"));
        assert_eq!(message(Some("Bearer   ")), "API key is empty");
    }
}
