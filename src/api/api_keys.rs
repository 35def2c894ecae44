use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use super::{extract::CurrentUser, page_with_status};
use crate::{
    error::{Error, PageError},
    service::{api_keys, projects},
    state::AppState,
    storage::{Project, User},
};

pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/projects/{project_id}/api-keys", get(list).post(create))
        .route("/projects/{project_id}/api-keys/{key_id}/delete", post(delete))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeyForm {
    name: String,
}

/// 渲染 key 列表，`new_key` 为刚创建的明文，只展示这一次
async fn keys_page(
    state: &AppState,
    user: &User,
    project: &Project,
    new_key: Option<&str>,
    errors: Option<&[String]>,
) -> Result<Response, PageError> {
    let mut db = state.db();
    let keys = api_keys::list(&mut db, project).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", user);
    context.insert("project", project);
    context.insert("keys", &keys);
    context.insert("new_key", &new_key);
    let status = match errors {
        Some(errors) => {
            context.insert("errors", errors);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        None => StatusCode::OK,
    };
    Ok(page_with_status(templates, "api_keys.html", &context, status)?)
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<Response, PageError> {
    let mut db = state.db();
    let project = projects::owned(&mut db, &user, project_id).await?;
    keys_page(&state, &user, &project, None, None).await
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
    Form(form): Form<KeyForm>,
) -> Result<Response, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::owned(&mut tx, &user, project_id).await?;

    let created = api_keys::create(&mut tx, &project, &form.name).await;
    match created {
        Ok(created) => {
            tx.commit().await?;
            keys_page(&state, &user, &project, Some(&created.raw), None).await
        }
        Err(Error::Validation(errors)) => {
            drop(tx);
            keys_page(&state, &user, &project, None, Some(&errors)).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, key_id)): Path<(Uuid, Uuid)>,
) -> Result<Redirect, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::owned(&mut tx, &user, project_id).await?;
    api_keys::delete(&mut tx, &project, key_id).await?;
    tx.commit().await?;

    Ok(Redirect::to(&format!("/projects/{}/api-keys", project.id)))
}
