use std::borrow::Cow;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::extract::ApiKeyAuth;
use crate::{
    content::{Category, MAX_TITLE_LEN, PostBuilder},
    error::{Error, Result},
    service::posts,
    state::AppState,
    storage::{Post, PostStorage, ProjectStorage},
};

pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/posts", get(list).post(create))
        .route("/api/v1/posts/{post_id}", get(detail))
}

/// 接口返回的文章
#[derive(Debug, Serialize)]
struct PostBody<'a> {
    id: Uuid,
    title: &'a str,
    slug: &'a str,
    body_markdown: &'a str,
    body_html: &'a str,
    category: &'static str,
    category_label: &'static str,
    is_published: bool,
    published_at: Option<DateTime<Utc>>,
    view_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Post> for PostBody<'a> {
    fn from(post: &'a Post) -> Self {
        let category = post.category();
        Self {
            id: post.id,
            title: &post.title,
            slug: &post.slug,
            body_markdown: &post.body_markdown,
            body_html: &post.body_html,
            category: category.as_str(),
            category_label: category.label(),
            is_published: post.is_published,
            published_at: post.published_at,
            view_count: post.view_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListQuery {
    published: Option<bool>,
}

/// 项目的文章列表，`published=true` 时只返回已发布文章
async fn list(
    State(state): State<AppState>,
    ApiKeyAuth(key): ApiKeyAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let mut db = state.db();
    let posts = db
        .posts_for_project(key.project_id, query.published.unwrap_or(false))
        .await?;

    let body: Vec<PostBody> = posts.iter().map(PostBody::from).collect();
    Ok(Json(json!({ "total": body.len(), "posts": body })))
}

async fn detail(
    State(state): State<AppState>,
    ApiKeyAuth(key): ApiKeyAuth,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let mut db = state.db();
    let post = db
        .post_in_project(key.project_id, post_id)
        .await?
        .ok_or(Error::NotFound("Post not found"))?;
    Ok(Json(json!({ "post": PostBody::from(&post) })))
}

/// 校验后的创建请求
#[derive(Debug)]
struct NewPost {
    title: String,
    body_markdown: String,
    category: Category,
    is_published: bool,
}

/// JSON 值的真假，规则与常见脚本语言一致
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// 取文本字段，数字和布尔值转为文本，其余类型按缺失处理
fn text<'a>(body: &'a Map<String, Value>, field: &str) -> Cow<'a, str> {
    match body.get(field) {
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(Value::Number(n)) => Cow::Owned(n.to_string()),
        Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
        _ => Cow::Borrowed(""),
    }
}

/// 解析并校验请求体，所有字段错误一次性返回
///
/// 与表单不同，未知分类会被拒绝。
fn parse_new_post(raw: &[u8]) -> Result<NewPost> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|_| Error::BadRequest("Invalid JSON body"))?;
    let Value::Object(body) = value else {
        return Err(Error::BadRequest("Request body must be a JSON object"));
    };

    let mut errors = Vec::new();

    let title = text(&body, "title");
    let title = title.trim();
    if title.is_empty() {
        errors.push("title is required".to_string());
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(format!("title must be at most {MAX_TITLE_LEN} characters"));
    }

    let body_markdown = text(&body, "body_markdown");
    let body_markdown = body_markdown.trim();
    if body_markdown.is_empty() {
        errors.push("body_markdown is required".to_string());
    }

    // 只有缺少该字段时使用默认分类，非字符串值视为非法分类
    let category = match body.get("category") {
        None => Some(Category::default()),
        Some(Value::String(value)) => Category::parse(value),
        Some(_) => None,
    };
    if category.is_none() {
        errors.push(format!("category must be one of: {}", Category::allowed()));
    }

    match category {
        Some(category) if errors.is_empty() => Ok(NewPost {
            title: title.to_string(),
            body_markdown: body_markdown.to_string(),
            category,
            is_published: body.get("is_published").is_some_and(truthy),
        }),
        _ => Err(Error::Validation(errors)),
    }
}

/// 创建文章，立即发布时通知订阅者
async fn create(
    State(state): State<AppState>,
    ApiKeyAuth(key): ApiKeyAuth,
    raw: Bytes,
) -> Result<Response> {
    let new_post = parse_new_post(&raw)?;
    let draft = PostBuilder::new(&new_post.title)
        .body(&new_post.body_markdown)
        .category(new_post.category)
        .publish(new_post.is_published)
        .build_with_renderer(state.renderer())
        .await?;

    let mut tx = state.db().begin().await?;
    let project = tx
        .project_by_id(key.project_id)
        .await?
        .ok_or(Error::NotFound("Project not found"))?;
    let (post, transition) = posts::create(&mut tx, &project, draft).await?;
    let announcement = posts::announcement(&mut tx, &project, &post, transition).await?;
    tx.commit().await?;

    tracing::info!(key = %key.key_prefix, post = %post.slug, "post created via api");
    if let Some(announcement) = announcement {
        state.notifier().dispatch(announcement);
    }

    let body = json!({ "post": PostBody::from(&post) });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(raw: &str) -> Vec<String> {
        match parse_new_post(raw.as_bytes()) {
            Err(Error::Validation(errors)) => errors,
            other => panic!("应返回校验错误: {other:?}"),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let post = parse_new_post(br#"{"title": " Hi ", "body_markdown": "body"}"#)
            .expect("解析失败");
        assert_eq!(post.title, "Hi");
        assert_eq!(post.category, Category::Improvement);
        assert!(!post.is_published);
    }

    #[test]
    fn test_parse_truthy_publish_flag() {
        let post = parse_new_post(
            br#"{"title": "t", "body_markdown": "b", "category": "bugfix", "is_published": 1}"#,
        )
        .expect("解析失败");
        assert_eq!(post.category, Category::Bugfix);
        assert!(post.is_published);
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let errors = errors(r#"{"title": "t", "body_markdown": "b", "category": "not_a_real_category"}"#);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("new_feature"), "应列出合法分类: {errors:?}");
    }

    #[test]
    fn test_parse_rejects_non_string_category() {
        for category in ["5", "null", r#"["bugfix"]"#, "true"] {
            let raw = format!(r#"{{"title": "t", "body_markdown": "b", "category": {category}}}"#);
            let errors = errors(&raw);
            assert_eq!(
                errors,
                vec![format!("category must be one of: {}", Category::allowed())],
                "分类 {category} 应被拒绝"
            );
        }
    }

    #[test]
    fn test_parse_coerces_scalar_text() {
        let post = parse_new_post(br#"{"title": 123, "body_markdown": true}"#).expect("解析失败");
        assert_eq!(post.title, "123");
        assert_eq!(post.body_markdown, "true");

        let errors = errors(r#"{"title": null, "body_markdown": ["b"]}"#);
        assert_eq!(errors, vec!["title is required", "body_markdown is required"]);
    }

    #[test]
    fn test_parse_collects_all_errors() {
        let errors = errors(r#"{"category": "nope"}"#);
        assert_eq!(
            errors,
            vec![
                "title is required".to_string(),
                "body_markdown is required".to_string(),
                format!("category must be one of: {}", Category::allowed()),
            ]
        );
    }

    #[test]
    fn test_parse_bad_bodies() {
        assert!(matches!(
            parse_new_post(b"{not json"),
            Err(Error::BadRequest("Invalid JSON body"))
        ));
        assert!(matches!(
            parse_new_post(b"[1, 2]"),
            Err(Error::BadRequest("Request body must be a JSON object"))
        ));
    }
}
