mod cmark;
mod github;

pub use self::{cmark::CmarkRenderer, github::GithubApiRenderer};

use crate::error::Result;

/// Markdown 渲染器
pub trait Renderer: Send + Sync {
    fn render<T: AsRef<str> + Send>(
        &self,
        content: T,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// 运行时选择的渲染器
///
/// 配置了 GitHub token 时使用 [`GithubApiRenderer`]，否则使用本地的 [`CmarkRenderer`]。
#[derive(Clone)]
pub enum MarkdownRenderer {
    Local(CmarkRenderer),
    Github(GithubApiRenderer),
}

impl MarkdownRenderer {
    pub fn from_token(token: Option<&str>) -> Result<Self> {
        match token {
            Some(token) => Ok(Self::Github(GithubApiRenderer::new(token)?)),
            None => Ok(Self::Local(CmarkRenderer)),
        }
    }
}

impl Renderer for MarkdownRenderer {
    async fn render<T: AsRef<str> + Send>(&self, content: T) -> Result<String> {
        match self {
            MarkdownRenderer::Local(r) => r.render(content).await,
            MarkdownRenderer::Github(r) => r.render(content).await,
        }
    }
}
