use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use super::{extract::CurrentUser, page_with_status};
use crate::{
    content::{DEFAULT_ACCENT_COLOR, ProjectForm},
    error::{Error, PageError},
    service::projects,
    state::AppState,
    storage::{PostStorage, Project, User},
};

pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list))
        .route("/projects/new", get(new_page).post(create))
        .route("/projects/{project_id}", get(detail))
        .route("/projects/{project_id}/edit", get(edit_page).post(update))
        .route("/projects/{project_id}/delete", post(delete))
        .route("/projects/{project_id}/widget", get(widget_page))
}

/// 表单回显的字段
#[derive(Debug, Serialize)]
struct FormValues<'a> {
    name: &'a str,
    description: &'a str,
    website_url: &'a str,
    accent_color: &'a str,
}

impl<'a> From<&'a ProjectForm> for FormValues<'a> {
    fn from(form: &'a ProjectForm) -> Self {
        Self {
            name: &form.name,
            description: &form.description,
            website_url: &form.website_url,
            accent_color: &form.accent_color,
        }
    }
}

impl<'a> From<&'a Project> for FormValues<'a> {
    fn from(project: &'a Project) -> Self {
        Self {
            name: &project.name,
            description: project.description.as_deref().unwrap_or_default(),
            website_url: project.website_url.as_deref().unwrap_or_default(),
            accent_color: &project.accent_color,
        }
    }
}

fn form_page(
    state: &AppState,
    user: &User,
    project: Option<&Project>,
    values: FormValues<'_>,
    errors: Option<&[String]>,
) -> Result<Response, PageError> {
    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", user);
    context.insert("form", &values);
    if let Some(project) = project {
        context.insert("project", project);
    }
    let status = match errors {
        Some(errors) => {
            context.insert("errors", errors);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        None => StatusCode::OK,
    };
    Ok(page_with_status(templates, "projects/form.html", &context, status)?)
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, PageError> {
    let mut db = state.db();
    let projects = projects::list(&mut db, &user).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", &user);
    context.insert("projects", &projects);
    Ok(templates.page("projects/list.html", &context)?)
}

async fn new_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, PageError> {
    let values = FormValues {
        name: "",
        description: "",
        website_url: "",
        accent_color: DEFAULT_ACCENT_COLOR,
    };
    form_page(&state, &user, None, values, None)
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ProjectForm>,
) -> Result<Response, PageError> {
    let draft = match form.clone().validate() {
        Ok(draft) => draft,
        Err(Error::Validation(errors)) => {
            return form_page(&state, &user, None, (&form).into(), Some(&errors));
        }
        Err(e) => return Err(e.into()),
    };

    let mut tx = state.db().begin().await?;
    let project = projects::create(&mut tx, &user, draft).await?;
    tx.commit().await?;

    Ok(Redirect::to(&format!("/projects/{}", project.id)).into_response())
}

/// 项目详情：全部文章和统计
async fn detail(
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
    Ok(templates.page("projects/detail.html", &context)?)
}

async fn edit_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<Response, PageError> {
    let mut db = state.db();
    let project = projects::owned(&mut db, &user, project_id).await?;
    form_page(&state, &user, Some(&project), (&project).into(), None)
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
    Form(form): Form<ProjectForm>,
) -> Result<Response, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::owned(&mut tx, &user, project_id).await?;

    let draft = match form.clone().validate() {
        Ok(draft) => draft,
        Err(Error::Validation(errors)) => {
            return form_page(&state, &user, Some(&project), (&form).into(), Some(&errors));
        }
        Err(e) => return Err(e.into()),
    };

    projects::update(&mut tx, &project, draft).await?;
    tx.commit().await?;

    Ok(Redirect::to(&format!("/projects/{}", project.id)).into_response())
}

async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<Redirect, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::owned(&mut tx, &user, project_id).await?;
    projects::delete(&mut tx, project).await?;
    tx.commit().await?;

    Ok(Redirect::to("/projects"))
}

/// 挂件嵌入说明
async fn widget_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<Html<String>, PageError> {
    let mut db = state.db();
    let project = projects::owned(&mut db, &user, project_id).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", &user);
    context.insert("project", &project);
    context.insert("base_url", state.config().base_url());
    Ok(templates.page("projects/widget.html", &context)?)
}
