use axum::{
    Router,
    extract::State,
    response::{Html, Redirect},
    routing::get,
};

use super::extract::{CurrentUser, MaybeUser};
use crate::{error::PageError, service::projects, state::AppState, storage::PostStorage};

pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
}

async fn home(MaybeUser(user): MaybeUser) -> Redirect {
    match user {
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/login"),
    }
}

/// 控制台：项目列表和文章总数
async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, PageError> {
    let mut db = state.db();
    let projects = projects::list(&mut db, &user).await?;
    let total_posts = db.post_count_for_owner(user.id).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", &user);
    context.insert("projects", &projects);
    context.insert("total_posts", &total_posts);
    Ok(templates.page("dashboard.html", &context)?)
}
