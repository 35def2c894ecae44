use axum::http::{HeaderMap, HeaderValue};
use reqwest::header;
use serde::Serialize;

use crate::error::{Error, Result};

use super::Renderer;

const GITHUB_MARKDOWN_RENDER_API: &str = "https://api.github.com/markdown";

/// 通过 GitHub Markdown API 渲染，支持 GitHub Flavored Markdown
#[derive(Clone)]
pub struct GithubApiRenderer {
    client: reqwest::Client,
}

impl GithubApiRenderer {
    /// 使用指定的 GitHub Token 创建渲染器
    ///
    /// ```ignore
    /// let renderer = GithubApiRenderer::new("your_token")?;
    /// ```
    pub fn new<T: AsRef<str>>(token: T) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token.as_ref()))
                .map_err(|_| Error::Config("invalid GitHub markdown token".to_string()))?,
        );

        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    text: &'a str,
    mode: &'a str,
}

impl Renderer for GithubApiRenderer {
    async fn render<T: AsRef<str> + Send>(&self, content: T) -> Result<String> {
        let text = content.as_ref().to_owned();
        let resp = self
            .client
            .post(GITHUB_MARKDOWN_RENDER_API)
            .json(&RequestBody {
                text: &text,
                mode: "gfm",
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }
}
