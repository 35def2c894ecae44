use std::io;

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;

pub type Result<T> = core::result::Result<T, Error>;

/// 应用统一错误类型
///
/// 业务错误（校验、认证、不存在、冲突）直接映射为对应的 HTTP 状态码，
/// 其余基础设施错误一律返回 500，并在响应边界记录日志。
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 输入格式或取值范围不合法，附带逐条提示
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// 邮箱或用户名已被占用
    #[error("conflict: {}", .0.join("; "))]
    Conflict(Vec<String>),

    /// 登录失败，不区分是邮箱还是密码错误
    #[error("Invalid email or password")]
    Auth,

    /// 缺少或无效的凭证
    #[error("{0}")]
    Unauthorized(&'static str),

    /// 资源不存在，或不属于当前用户
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hash: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),

    #[error(transparent)]
    Mail(#[from] lettre::transport::smtp::Error),

    #[error(transparent)]
    MailBuild(#[from] lettre::error::Error),

    #[error(transparent)]
    MailAddress(#[from] lettre::address::AddressError),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// 错误对应的 HTTP 状态码
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Auth | Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给客户端的提示信息，基础设施错误只给出通用描述
    pub fn messages(&self) -> Vec<String> {
        match self {
            Error::Validation(errors) | Error::Conflict(errors) => errors.clone(),
            Error::Auth | Error::Unauthorized(_) | Error::NotFound(_) | Error::BadRequest(_) => {
                vec![self.to_string()]
            }
            Error::Reqwest(_) => vec!["Bad Gateway".to_string()],
            _ => vec!["Internal Server Error".to_string()],
        }
    }

    fn log(&self) {
        match self {
            Error::Sqlx(e) => tracing::error!(%e, "sqlx error"),
            Error::Template(e) => tracing::error!(?e, "template error"),
            Error::Reqwest(e) => tracing::error!(%e, "markdown renderer error"),
            Error::Io(e) => tracing::error!(%e, "file io error"),
            e if e.status().is_server_error() => tracing::error!(%e, "internal error"),
            _ => (),
        }
    }
}

/// API 路由的错误响应，统一为 JSON
///
/// - 422：`{"errors": [...]}`
/// - 其他：`{"detail": "..."}`
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = match self {
            Error::Validation(errors) | Error::Conflict(errors) => json!({ "errors": errors }),
            e => json!({ "detail": e.messages().remove(0) }),
        };
        (status, Json(body)).into_response()
    }
}

/// 浏览器页面的错误包装
///
/// 401 重定向到登录页，其余错误渲染为简单的 HTML 错误页。
#[derive(Debug)]
pub struct PageError(pub Error);

impl From<Error> for PageError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<sqlx::Error> for PageError {
    fn from(e: sqlx::Error) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let PageError(error) = self;
        error.log();

        let status = error.status();
        if status == StatusCode::UNAUTHORIZED {
            return Redirect::to("/login").into_response();
        }

        let message = error.messages().join(" ");
        let page = format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{code}</title></head>\
             <body><h1>{code}</h1><p>{message}</p><p><a href=\"/\">Back home</a></p></body></html>",
            code = status,
            message = escape_html(&message),
        );
        (status, Html(page)).into_response()
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::Validation(vec!["x".into()]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::Conflict(vec!["x".into()]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(Error::Auth.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NotFound("Post not found").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Config("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_message_is_generic() {
        assert_eq!(Error::Auth.messages(), vec!["Invalid email or password"]);
    }

    #[tokio::test]
    async fn test_validation_response_lists_errors() {
        let resp = Error::Validation(vec!["title is required".into()]).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"][0], "title is required");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let resp = Error::Config("secret detail".into()).into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("secret detail"));
    }

    #[test]
    fn test_page_error_redirects_unauthorized() {
        let resp = PageError(Error::Unauthorized("Not authenticated")).into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], "/login");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href='x'>&"), "&lt;a href=&#39;x&#39;&gt;&amp;");
    }
}
