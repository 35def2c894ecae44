use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;

use super::{extract::MaybeUser, page_with_status};
use crate::{
    auth::SESSION_COOKIE,
    content::{Credentials, Registration, email},
    error::{Error, PageError},
    service::identity,
    state::AppState,
    view::Templates,
};

pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterForm {
    email: String,
    username: String,
    password: String,
    display_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginForm {
    email: String,
    password: String,
}

/// 会话 cookie：HttpOnly、SameSite=Lax，有效期与令牌一致
fn session_cookie(token: String, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

async fn register_page(
    State(templates): State<Templates>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    if user.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    Ok(templates
        .page("auth/register.html", &templates.context())?
        .into_response())
}

async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    let result = async {
        let registration = Registration::new(
            &form.email,
            &form.username,
            &form.password,
            Some(&form.display_name),
        )?;

        let mut tx = state.db().begin().await?;
        let (_, token) = identity::register(&mut tx, state.sessions(), registration).await?;
        tx.commit().await?;
        Ok::<_, Error>(token)
    }
    .await;

    match result {
        Ok(token) => Ok((
            jar.add(session_cookie(token, state.sessions().ttl())),
            Redirect::to("/dashboard"),
        )
            .into_response()),

        Err(Error::Validation(errors) | Error::Conflict(errors)) => {
            let templates = state.templates();
            let mut context = templates.context();
            context.insert("errors", &errors);
            context.insert("email", &email::normalize(&form.email));
            context.insert("username", &form.username.trim().to_lowercase());
            context.insert("display_name", form.display_name.trim());
            Ok(page_with_status(
                templates,
                "auth/register.html",
                &context,
                StatusCode::UNPROCESSABLE_ENTITY,
            )?)
        }

        Err(e) => Err(e.into()),
    }
}

async fn login_page(
    State(templates): State<Templates>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    if user.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    Ok(templates
        .page("auth/login.html", &templates.context())?
        .into_response())
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let result = async {
        let credentials = Credentials::new(&form.email, &form.password)?;
        let mut db = state.db();
        let user = identity::authenticate(&mut db, credentials).await?;
        state.sessions().issue(user.id)
    }
    .await;

    match result {
        Ok(token) => Ok((
            jar.add(session_cookie(token, state.sessions().ttl())),
            Redirect::to("/dashboard"),
        )
            .into_response()),

        // 登录失败停留在登录页，而不是跳转
        Err(e @ (Error::Validation(_) | Error::Auth)) => {
            let templates = state.templates();
            let mut context = templates.context();
            context.insert("errors", &e.messages());
            context.insert("email", &email::normalize(&form.email));
            Ok(page_with_status(
                templates,
                "auth/login.html",
                &context,
                e.status(),
            )?)
        }

        Err(e) => Err(e.into()),
    }
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/login"),
    )
}
