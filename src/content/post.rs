use crate::{
    content::{Category, slug},
    error::{Error, Result},
    render::Renderer,
};

pub const MAX_TITLE_LEN: usize = 300;

/// 尚未设置正文
pub struct NoBody;

/// Markdown 正文
pub struct Body(String);

/// 文章构建器
///
/// 先给出标题，再通过 [`PostBuilder::body`] 给出正文，最后
/// [`PostBuilder::build_with_renderer`] 完成校验和渲染。
pub struct PostBuilder<T> {
    title: String,
    category: Category,
    publish: bool,
    body: T,
}

/// 校验并渲染完成的文章内容
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    /// 由标题生成的基础 slug，冲突处理由存储层完成
    pub slug: String,
    pub body_markdown: String,
    pub body_html: String,
    pub category: Category,
    pub publish: bool,
}

impl PostBuilder<NoBody> {
    pub fn new(title: impl AsRef<str>) -> Self {
        Self {
            title: title.as_ref().trim().to_string(),
            category: Category::default(),
            publish: false,
            body: NoBody,
        }
    }

    pub fn body(self, body_markdown: impl AsRef<str>) -> PostBuilder<Body> {
        PostBuilder {
            title: self.title,
            category: self.category,
            publish: self.publish,
            body: Body(body_markdown.as_ref().trim().to_string()),
        }
    }
}

impl<T> PostBuilder<T> {
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// 创建后立即发布
    pub fn publish(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl PostBuilder<Body> {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.title.is_empty() {
            errors.push("Title is required".to_string());
        } else if self.title.chars().count() > MAX_TITLE_LEN {
            errors.push(format!("Title must be at most {MAX_TITLE_LEN} characters"));
        }
        if self.body.0.is_empty() {
            errors.push("Post body is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }

    /// 校验后渲染正文，校验失败时不会调用渲染器
    pub async fn build_with_renderer<R: Renderer>(self, renderer: &R) -> Result<PostDraft> {
        self.validate()?;

        let body_html = renderer.render(&self.body.0).await?;

        Ok(PostDraft {
            slug: slug::slugify(&self.title),
            title: self.title,
            body_markdown: self.body.0,
            body_html,
            category: self.category,
            publish: self.publish,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct FakeRenderer {
        calls: AtomicUsize,
    }

    impl Renderer for FakeRenderer {
        async fn render<T: AsRef<str> + Send>(&self, content: T) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("<rendered>{}</rendered>", content.as_ref()))
        }
    }

    #[tokio::test]
    async fn test_build_renders_body() {
        let renderer = FakeRenderer::default();
        let draft = PostBuilder::new("  Dark Mode is Here! ")
            .body("\n# Hello\n")
            .category(Category::NewFeature)
            .publish(true)
            .build_with_renderer(&renderer)
            .await
            .expect("构建文章失败");

        assert_eq!(draft.title, "Dark Mode is Here!");
        assert_eq!(draft.slug, "dark-mode-is-here");
        assert_eq!(draft.body_markdown, "# Hello");
        assert_eq!(draft.body_html, "<rendered># Hello</rendered>");
        assert_eq!(draft.category, Category::NewFeature);
        assert!(draft.publish);
    }

    #[tokio::test]
    async fn test_build_defaults() {
        let draft = PostBuilder::new("t")
            .body("b")
            .build_with_renderer(&FakeRenderer::default())
            .await
            .expect("构建文章失败");
        assert_eq!(draft.category, Category::Improvement);
        assert!(!draft.publish);
    }

    #[tokio::test]
    async fn test_validation_skips_render() {
        let renderer = FakeRenderer::default();
        let result = PostBuilder::new("")
            .body("   ")
            .build_with_renderer(&renderer)
            .await;

        match result {
            Err(Error::Validation(errors)) => {
                assert_eq!(errors, vec!["Title is required", "Post body is required"])
            }
            other => panic!("应返回校验错误: {other:?}"),
        }
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_title_length_limit() {
        let renderer = FakeRenderer::default();
        let ok = PostBuilder::new("x".repeat(MAX_TITLE_LEN))
            .body("b")
            .build_with_renderer(&renderer)
            .await;
        assert!(ok.is_ok());

        let too_long = PostBuilder::new("x".repeat(MAX_TITLE_LEN + 1))
            .body("b")
            .build_with_renderer(&renderer)
            .await;
        assert!(matches!(too_long, Err(Error::Validation(_))));
    }
}
