mod analytics;
mod api_keys;
mod auth;
mod changelog;
mod dashboard;
mod extract;
mod health;
mod posts;
mod programmatic;
mod projects;
mod subscribers;
mod widget;

use axum::{
    Router,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use tera::Context;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::Result, state::AppState, view::Templates};

/// 组装全部路由
///
/// - 浏览器页面：注册登录、控制台、项目、文章、订阅者、API key、统计
/// - 公开页面：`/changelog/...`、`/unsubscribe/{token}`
/// - 挂件接口：`/api/widget/...`，允许跨域
/// - 编程接口：`/api/v1/...`，使用 API key 认证
pub fn setup_route(state: AppState) -> Router {
    let widget = widget::setup_route().layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers([header::CONTENT_TYPE]),
    );

    let router = Router::new()
        .merge(health::setup_route())
        .merge(auth::setup_route())
        .merge(dashboard::setup_route())
        .merge(projects::setup_route())
        .merge(posts::setup_route())
        .merge(subscribers::setup_route())
        .merge(api_keys::setup_route())
        .merge(analytics::setup_route())
        .merge(changelog::setup_route())
        .merge(programmatic::setup_route())
        .merge(widget)
        .with_state(state);

    add_middlewares(router)
}

pub async fn run_server(state: AppState) -> Result<()> {
    let listen = state.config().listen.clone();
    let router = setup_route(state);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    tracing::info!("listening on {listen}");
    axum::serve(listener, router).await?;
    Ok(())
}

fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {}),
    )
}

/// 以指定状态码渲染页面，用于表单校验失败后重新展示
fn page_with_status(
    templates: &Templates,
    name: &str,
    context: &Context,
    status: StatusCode,
) -> Result<Response> {
    Ok((status, templates.page(name, context)?).into_response())
}
