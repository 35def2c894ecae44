use std::{collections::HashMap, sync::Arc};

use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};

use crate::{content::Category, error::Result};

/// 编译进二进制的模板，名称以 `.html` 结尾的会自动转义
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("auth/login.html", include_str!("../templates/auth/login.html")),
    ("auth/register.html", include_str!("../templates/auth/register.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("projects/list.html", include_str!("../templates/projects/list.html")),
    ("projects/form.html", include_str!("../templates/projects/form.html")),
    ("projects/detail.html", include_str!("../templates/projects/detail.html")),
    ("projects/widget.html", include_str!("../templates/projects/widget.html")),
    ("posts/list.html", include_str!("../templates/posts/list.html")),
    ("posts/form.html", include_str!("../templates/posts/form.html")),
    ("posts/detail.html", include_str!("../templates/posts/detail.html")),
    ("subscribers.html", include_str!("../templates/subscribers.html")),
    ("api_keys.html", include_str!("../templates/api_keys.html")),
    ("analytics.html", include_str!("../templates/analytics.html")),
    ("changelog/layout.html", include_str!("../templates/changelog/layout.html")),
    ("changelog/public.html", include_str!("../templates/changelog/public.html")),
    ("changelog/post.html", include_str!("../templates/changelog/post.html")),
    (
        "changelog/subscribe_result.html",
        include_str!("../templates/changelog/subscribe_result.html"),
    ),
    (
        "changelog/unsubscribe.html",
        include_str!("../templates/changelog/unsubscribe.html"),
    ),
    ("widget/embed.js", include_str!("../templates/widget/embed.js")),
    (
        "email/notification.html",
        include_str!("../templates/email/notification.html"),
    ),
];

/// 页面中使用的分类信息
#[derive(Debug, Serialize)]
struct CategoryInfo {
    value: &'static str,
    label: &'static str,
    color: &'static str,
}

/// 模板集合，克隆开销很小
#[derive(Clone)]
pub struct Templates(Arc<Tera>);

impl Templates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self(Arc::new(tera)))
    }

    /// 带有分类信息的上下文
    ///
    /// - `categories`：分类列表，用于下拉框和过滤链接
    /// - `labels` / `colors`：按分类取值索引的名称和颜色
    pub fn context(&self) -> Context {
        let mut context = Context::new();
        let categories = Category::ALL
            .iter()
            .map(|c| CategoryInfo {
                value: c.as_str(),
                label: c.label(),
                color: c.color(),
            })
            .collect::<Vec<_>>();
        let labels: HashMap<_, _> = Category::ALL.iter().map(|c| (c.as_str(), c.label())).collect();
        let colors: HashMap<_, _> = Category::ALL.iter().map(|c| (c.as_str(), c.color())).collect();

        context.insert("categories", &categories);
        context.insert("labels", &labels);
        context.insert("colors", &colors);
        context
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        Ok(self.0.render(name, context)?)
    }

    /// 渲染为 HTML 响应
    pub fn page(&self, name: &str, context: &Context) -> Result<Html<String>> {
        self.render(name, context).map(Html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_parse() {
        let templates = Templates::new().expect("模板解析失败");
        for (name, _) in TEMPLATES {
            assert!(
                templates.0.get_template_names().any(|n| n == *name),
                "缺少模板 {name}"
            );
        }
    }

    #[test]
    fn test_login_page_escapes_input() {
        let templates = Templates::new().unwrap();
        let mut context = templates.context();
        context.insert("email", "<script>@x.com");
        context.insert("errors", &["Invalid email or password"]);

        let html = templates.render("auth/login.html", &context).unwrap();
        assert!(html.contains("&lt;script&gt;@x.com"));
        assert!(html.contains("Invalid email or password"));
        assert!(html.contains("href=\"/register\""));
    }

    #[test]
    fn test_embed_script_encodes_values() {
        let templates = Templates::new().unwrap();
        let mut context = Context::new();
        context.insert("slug", "acme");
        context.insert("accent_color", "#6366f1");
        context.insert("base_url", "https://changes.example.com");

        let js = templates.render("widget/embed.js", &context).unwrap();
        assert!(js.contains(r#"var SLUG = "acme";"#));
        assert!(js.contains(r#"var BASE_URL = "https://changes.example.com";"#));
    }
}
