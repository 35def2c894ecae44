use axum::{
    Router,
    extract::{Path, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use uuid::Uuid;

use super::extract::CurrentUser;
use crate::{
    error::PageError,
    service::{projects, subscribers},
    state::AppState,
};

pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/projects/{project_id}/subscribers", get(list))
        .route(
            "/projects/{project_id}/subscribers/{subscriber_id}/delete",
            post(delete),
        )
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<Html<String>, PageError> {
    let mut db = state.db();
    let project = projects::owned(&mut db, &user, project_id).await?;
    let subscribers = subscribers::list(&mut db, &project).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", &user);
    context.insert("project", &project);
    context.insert("subscribers", &subscribers);
    Ok(templates.page("subscribers.html", &context)?)
}

async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((project_id, subscriber_id)): Path<(Uuid, Uuid)>,
) -> Result<Redirect, PageError> {
    let mut tx = state.db().begin().await?;
    let project = projects::owned(&mut tx, &user, project_id).await?;
    subscribers::delete(&mut tx, &project, subscriber_id).await?;
    tx.commit().await?;

    Ok(Redirect::to(&format!("/projects/{}/subscribers", project.id)))
}
