use std::{env, path::Path};

use serde::Deserialize;

use crate::error::{Error, Result};

const DEFAULT_SECRET_KEY: &str = "change-me-in-production-use-a-real-secret-key";

/// 服务配置
///
/// 先读取 `CHANGEPOST_CONFIG` 指向的 TOML 文件（可选），再用环境变量覆盖。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监听地址
    pub listen: String,
    /// Postgres 连接串，必填
    pub database_url: String,
    /// 会话令牌签名密钥
    pub secret_key: String,
    /// 公共页面的基础 URL，用于邮件和挂件中的绝对链接
    pub base_url: String,
    /// 会话有效期（小时）
    pub session_hours: i64,
    /// 设置后使用 GitHub Markdown API 渲染，否则本地渲染
    pub github_markdown_token: Option<String>,
    pub smtp: SmtpConfig,
}

/// SMTP 配置，`host` 为空表示未配置邮件发送
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    pub tls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            database_url: String::new(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            base_url: "http://localhost:3000".to_string(),
            session_hours: 24,
            github_markdown_token: None,
            smtp: SmtpConfig::default(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from: "noreply@changepost.app".to_string(),
            tls: true,
        }
    }
}

impl Config {
    /// 从配置文件和环境变量加载配置
    pub fn load() -> Result<Self> {
        let config = match env::var("CHANGEPOST_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        let config = config.with_overrides(|key| env::var(key).ok());
        config.check()?;

        if config.secret_key == DEFAULT_SECRET_KEY {
            tracing::warn!("using the default secret key, set CHANGEPOST_SECRET_KEY");
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Into::into)
    }

    /// 用 `lookup` 返回的值覆盖对应字段，空字符串视为未设置
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DATABASE_URL") {
            self.database_url = v;
        }
        if let Some(v) = get("CHANGEPOST_LISTEN") {
            self.listen = v;
        }
        if let Some(v) = get("CHANGEPOST_SECRET_KEY") {
            self.secret_key = v;
        }
        if let Some(v) = get("CHANGEPOST_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = get("CHANGEPOST_SESSION_HOURS").and_then(|v| v.parse().ok()) {
            self.session_hours = v;
        }
        if let Some(v) = get("GITHUB_MARKDOWN_RENDER_KEY") {
            self.github_markdown_token = Some(v);
        }
        if let Some(v) = get("SMTP_HOST") {
            self.smtp.host = v;
        }
        if let Some(v) = get("SMTP_PORT").and_then(|v| v.parse().ok()) {
            self.smtp.port = v;
        }
        if let Some(v) = get("SMTP_USER") {
            self.smtp.user = v;
        }
        if let Some(v) = get("SMTP_PASSWORD") {
            self.smtp.password = v;
        }
        if let Some(v) = get("SMTP_FROM") {
            self.smtp.from = v;
        }
        if let Some(v) = get("SMTP_TLS") {
            self.smtp.tls = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    fn check(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(Error::Config("DATABASE_URL not set".to_string()));
        }
        if self.session_hours <= 0 {
            return Err(Error::Config("session_hours must be positive".to_string()));
        }
        Ok(())
    }

    /// 未配置 SMTP 时返回 `None`
    pub fn smtp(&self) -> Option<&SmtpConfig> {
        (!self.smtp.host.trim().is_empty()).then_some(&self.smtp)
    }

    /// 去掉末尾 `/` 的基础 URL
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
