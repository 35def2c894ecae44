use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Response},
    routing::get,
};
use axum_extra::extract::Query;
use serde::Deserialize;

use super::page_with_status;
use crate::{
    content::Category,
    error::{Error, PageError},
    service::{
        posts, projects,
        subscribers::{self, Subscription},
    },
    state::AppState,
    storage::PostStorage,
};

const SUBSCRIBED: &str = "You're subscribed! You'll receive notifications for new updates.";

pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/changelog/{project_slug}", get(changelog))
        // 静态段优先匹配，slug 恰好为 `subscribe` 的文章仍可通过 GET 访问
        .route(
            "/changelog/{project_slug}/subscribe",
            get(subscribe_slug_post).post(subscribe),
        )
        .route("/changelog/{project_slug}/{post_slug}", get(post_detail))
        .route("/unsubscribe/{token}", get(unsubscribe))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChangelogQuery {
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubscribeForm {
    email: String,
}

/// 公开的更新日志，未知分类等同于不过滤
async fn changelog(
    State(state): State<AppState>,
    Path(project_slug): Path<String>,
    Query(query): Query<ChangelogQuery>,
) -> Result<Html<String>, PageError> {
    let mut db = state.db();
    let project = projects::by_slug(&mut db, &project_slug).await?;
    let category = query.category.as_deref().and_then(Category::parse);
    let posts = db.published_posts(project.id, category, None).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("project", &project);
    context.insert("posts", &posts);
    context.insert("active_category", &category.map(|c| c.as_str()));
    Ok(templates.page("changelog/public.html", &context)?)
}

/// 公开文章页，每次访问浏览次数加一
async fn render_post(
    state: &AppState,
    project_slug: &str,
    post_slug: &str,
) -> Result<Html<String>, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::by_slug(&mut tx, project_slug).await?;
    let mut post = posts::published_by_slug(&mut tx, &project, post_slug).await?;
    post.view_count = posts::record_view(&mut tx, &post).await?;
    tx.commit().await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("project", &project);
    context.insert("post", &post);
    Ok(templates.page("changelog/post.html", &context)?)
}

async fn post_detail(
    State(state): State<AppState>,
    Path((project_slug, post_slug)): Path<(String, String)>,
) -> Result<Html<String>, PageError> {
    render_post(&state, &project_slug, &post_slug).await
}

async fn subscribe_slug_post(
    State(state): State<AppState>,
    Path(project_slug): Path<String>,
) -> Result<Html<String>, PageError> {
    render_post(&state, &project_slug, "subscribe").await
}

/// 订阅项目更新
///
/// 新订阅和重复订阅展示相同的提示。
async fn subscribe(
    State(state): State<AppState>,
    Path(project_slug): Path<String>,
    Form(form): Form<SubscribeForm>,
) -> Result<Response, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::by_slug(&mut tx, &project_slug).await?;

    let subscribed = subscribers::subscribe(&mut tx, &project, &form.email).await;
    let (status, success, message) = match subscribed {
        Ok(Subscription::Created(_) | Subscription::AlreadySubscribed) => {
            (StatusCode::OK, true, SUBSCRIBED.to_string())
        }
        Err(Error::Validation(mut errors)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            false,
            errors.pop().unwrap_or_default(),
        ),
        Err(e) => return Err(e.into()),
    };
    tx.commit().await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("project", &project);
    context.insert("success", &success);
    context.insert("message", &message);
    Ok(page_with_status(
        templates,
        "changelog/subscribe_result.html",
        &context,
        status,
    )?)
}

/// 退订，令牌不存在时展示失败提示而不是报错
async fn unsubscribe(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Html<String>, PageError> {
    let mut tx = state.db().begin().await?;
    let removed = subscribers::unsubscribe_by_token(&mut tx, &token).await?;
    tx.commit().await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("success", &removed);
    Ok(templates.page("changelog/unsubscribe.html", &context)?)
}
