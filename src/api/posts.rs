use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{extract::CurrentUser, page_with_status};
use crate::{
    content::{Category, PostBuilder},
    error::{Error, PageError},
    service::{posts, projects},
    state::AppState,
    storage::{Post, PostStorage, Project, User},
};

pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/projects/{project_id}/posts", get(list))
        .route("/projects/{project_id}/posts/new", get(new_page).post(create))
        .route("/projects/{project_id}/posts/{post_id}", get(detail))
        .route(
            "/projects/{project_id}/posts/{post_id}/edit",
            get(edit_page).post(update),
        )
        .route(
            "/projects/{project_id}/posts/{post_id}/toggle-publish",
            post(toggle_publish),
        )
        .route("/projects/{project_id}/posts/{post_id}/delete", post(delete))
}

/// 文章表单，`action` 为 `publish` 时创建后立即发布
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct PostForm {
    title: String,
    body_markdown: String,
    category: String,
    action: String,
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body_markdown: post.body_markdown.clone(),
            category: post.category.clone(),
            action: String::new(),
        }
    }
}

fn form_page(
    state: &AppState,
    user: &User,
    project: &Project,
    post: Option<&Post>,
    form: &PostForm,
    errors: Option<&[String]>,
) -> Result<Response, PageError> {
    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", user);
    context.insert("project", project);
    context.insert("form", form);
    if let Some(post) = post {
        context.insert("post", post);
    }
    let status = match errors {
        Some(errors) => {
            context.insert("errors", errors);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        None => StatusCode::OK,
    };
    Ok(page_with_status(templates, "posts/form.html", &context, status)?)
}

fn post_url(project: &Project, post: &Post) -> String {
    format!("/projects/{}/posts/{}", project.id, post.id)
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<Html<String>, PageError> {
    let mut db = state.db();
    let project = projects::owned(&mut db, &user, project_id).await?;
    let posts = db.posts_for_project(project.id, false).await?;
    let counts = db.post_counts(project.id).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", &user);
    context.insert("project", &project);
    context.insert("posts", &posts);
    context.insert("counts", &counts);
    Ok(templates.page("posts/list.html", &context)?)
}

async fn new_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<Response, PageError> {
    let mut db = state.db();
    let project = projects::owned(&mut db, &user, project_id).await?;
    let form = PostForm {
        category: Category::default().to_string(),
        ..Default::default()
    };
    form_page(&state, &user, &project, None, &form, None)
}

/// 创建文章，表单中的未知分类按默认分类处理
async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
    Form(form): Form<PostForm>,
) -> Result<Response, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::owned(&mut tx, &user, project_id).await?;

    let built = PostBuilder::new(&form.title)
        .body(&form.body_markdown)
        .category(Category::parse_or_default(&form.category))
        .publish(form.action == "publish")
        .build_with_renderer(state.renderer())
        .await;
    let draft = match built {
        Ok(draft) => draft,
        Err(Error::Validation(errors)) => {
            return form_page(&state, &user, &project, None, &form, Some(&errors));
        }
        Err(e) => return Err(e.into()),
    };

    let (post, transition) = posts::create(&mut tx, &project, draft).await?;
    let announcement = posts::announcement(&mut tx, &project, &post, transition).await?;
    tx.commit().await?;

    if let Some(announcement) = announcement {
        state.notifier().dispatch(announcement);
    }
    Ok(Redirect::to(&post_url(&project, &post)).into_response())
}

async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Html<String>, PageError> {
    let mut db = state.db();
    let project = projects::owned(&mut db, &user, project_id).await?;
    let post = posts::owned(&mut db, &project, post_id).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", &user);
    context.insert("project", &project);
    context.insert("post", &post);
    Ok(templates.page("posts/detail.html", &context)?)
}

async fn edit_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, PageError> {
    let mut db = state.db();
    let project = projects::owned(&mut db, &user, project_id).await?;
    let post = posts::owned(&mut db, &project, post_id).await?;
    form_page(&state, &user, &project, Some(&post), &(&post).into(), None)
}

/// 更新文章，表单中的未知分类保留原分类
async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
    Form(form): Form<PostForm>,
) -> Result<Response, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::owned(&mut tx, &user, project_id).await?;
    let post = posts::owned(&mut tx, &project, post_id).await?;

    let built = PostBuilder::new(&form.title)
        .body(&form.body_markdown)
        .category(Category::parse(&form.category).unwrap_or(post.category()))
        .build_with_renderer(state.renderer())
        .await;
    let draft = match built {
        Ok(draft) => draft,
        Err(Error::Validation(errors)) => {
            return form_page(&state, &user, &project, Some(&post), &form, Some(&errors));
        }
        Err(e) => return Err(e.into()),
    };

    let post = posts::update(&mut tx, &post, draft).await?;
    tx.commit().await?;

    Ok(Redirect::to(&post_url(&project, &post)).into_response())
}

/// 切换发布状态，从草稿变为已发布时通知订阅者
async fn toggle_publish(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Redirect, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::owned(&mut tx, &user, project_id).await?;
    let post = posts::owned(&mut tx, &project, post_id).await?;

    let (post, transition) = posts::toggle_publish(&mut tx, &post).await?;
    let announcement = posts::announcement(&mut tx, &project, &post, transition).await?;
    tx.commit().await?;

    if let Some(announcement) = announcement {
        state.notifier().dispatch(announcement);
    }
    Ok(Redirect::to(&post_url(&project, &post)))
}

async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Redirect, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::owned(&mut tx, &user, project_id).await?;
    let post = posts::owned(&mut tx, &project, post_id).await?;
    posts::delete(&mut tx, post).await?;
    tx.commit().await?;

    Ok(Redirect::to(&format!("/projects/{}/posts", project.id)))
}
