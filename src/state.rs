use std::sync::Arc;

use axum::extract::FromRef;
use chrono::Duration;

use crate::{
    auth::SessionKeys,
    config::Config,
    error::Result,
    notify::{Notifier, SmtpMailer},
    render::MarkdownRenderer,
    storage::Db,
    view::Templates,
};

/// 应用程序上下文
///
/// [`AppState`] 封装了数据库连接池、Markdown 渲染器、会话密钥、模板和通知发送器，
/// 提供统一访问入口。
#[derive(Clone, FromRef)]
pub struct AppState {
    pool: Db,
    renderer: MarkdownRenderer,
    sessions: Arc<SessionKeys>,
    templates: Templates,
    notifier: Notifier,
    config: Arc<Config>,
}

impl AppState {
    /// 按配置创建 [`AppState`]
    ///
    /// 未配置 SMTP 时通知只记录日志；未配置 GitHub token 时使用本地渲染。
    pub fn new(pool: Db, config: Config) -> Result<Self> {
        let renderer = MarkdownRenderer::from_token(config.github_markdown_token.as_deref())?;
        let sessions = SessionKeys::new(
            config.secret_key.as_bytes(),
            Duration::hours(config.session_hours),
        );
        let templates = Templates::new()?;
        let mailer = config.smtp().map(SmtpMailer::new).transpose()?;
        let notifier = Notifier::new(mailer, templates.clone(), config.base_url());

        Ok(Self {
            pool,
            renderer,
            sessions: Arc::new(sessions),
            templates,
            notifier,
            config: Arc::new(config),
        })
    }

    /// 获取连接池，只读查询直接使用
    pub fn db(&self) -> &Db {
        &self.pool
    }

    /// 获取 Markdown 渲染器
    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
