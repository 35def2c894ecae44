use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    state::AppState,
    storage::{Post, PostStorage, Project, ProjectStorage},
};

const DEFAULT_LIMIT: i64 = 5;
const MAX_LIMIT: i64 = 20;
const EXCERPT_CHARS: usize = 150;

pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/api/widget/{project_slug}/posts", get(feed))
        .route("/api/widget/{project_slug}/embed.js", get(embed_script))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeedQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct FeedProject<'a> {
    name: &'a str,
    slug: &'a str,
    accent_color: &'a str,
}

#[derive(Debug, Serialize)]
struct FeedPost<'a> {
    title: &'a str,
    slug: &'a str,
    category: &'static str,
    category_label: &'static str,
    published_at: Option<DateTime<Utc>>,
    excerpt: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct Feed<'a> {
    project: FeedProject<'a>,
    posts: Vec<FeedPost<'a>>,
}

impl<'a> FeedPost<'a> {
    fn new(project: &Project, post: &'a Post) -> Self {
        let category = post.category();
        Self {
            title: &post.title,
            slug: &post.slug,
            category: category.as_str(),
            category_label: category.label(),
            published_at: post.published_at,
            excerpt: excerpt(&post.body_markdown),
            url: format!("/changelog/{}/{}", project.slug, post.slug),
        }
    }
}

/// Markdown 原文的前 150 个字符，截断时追加 `...`
fn excerpt(markdown: &str) -> String {
    match markdown.char_indices().nth(EXCERPT_CHARS) {
        Some((end, _)) => format!("{}...", &markdown[..end]),
        None => markdown.to_string(),
    }
}

async fn widget_project(state: &AppState, slug: &str) -> Result<Project> {
    let mut db = state.db();
    db.project_by_slug(slug)
        .await?
        .ok_or(Error::NotFound("Project not found"))
}

/// 挂件使用的最近文章，数量限制在 1 到 20 之间
async fn feed(
    State(state): State<AppState>,
    Path(project_slug): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<Response> {
    let project = widget_project(&state, &project_slug).await?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let mut db = state.db();
    let posts = db.published_posts(project.id, None, Some(limit)).await?;

    let feed = Feed {
        project: FeedProject {
            name: &project.name,
            slug: &project.slug,
            accent_color: &project.accent_color,
        },
        posts: posts.iter().map(|p| FeedPost::new(&project, p)).collect(),
    };
    Ok(([(header::CACHE_CONTROL, "public, max-age=60")], Json(feed)).into_response())
}

/// 嵌入脚本，写入项目 slug、主题色和站点地址
async fn embed_script(
    State(state): State<AppState>,
    Path(project_slug): Path<String>,
) -> Result<Response> {
    let project = widget_project(&state, &project_slug).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("slug", &project.slug);
    context.insert("accent_color", &project.accent_color);
    context.insert("base_url", state.config().base_url());
    let script = templates.render("widget/embed.js", &context)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        script,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short"), "short");
        assert_eq!(excerpt(&"a".repeat(EXCERPT_CHARS)), "a".repeat(EXCERPT_CHARS));

        let long = "é".repeat(EXCERPT_CHARS + 1);
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), EXCERPT_CHARS + 3, "按字符而不是字节截断");
    }
}
