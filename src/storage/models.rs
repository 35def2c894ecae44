use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::content::Category;

/// 用户
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    /// 小写邮箱
    pub email: String,
    /// 小写用户名
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// 项目（租户）
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// 全局唯一
    pub slug: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub accent_color: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 文章
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    /// 项目内唯一
    pub slug: String,
    pub body_markdown: String,
    pub body_html: String,
    pub category: String,
    pub is_published: bool,
    /// 仅在已发布时有值
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// 数据库中的未知分类按 [`Category::Improvement`] 处理
    pub fn category(&self) -> Category {
        Category::parse_or_default(&self.category)
    }
}

/// 订阅者
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub project_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub unsubscribe_token: String,
    pub created_at: DateTime<Utc>,
}

/// API key，只保存哈希和展示用前缀
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub key_prefix: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 项目的文章统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct PostCounts {
    pub total: i64,
    pub published: i64,
    pub total_views: i64,
}

/// 已发布文章按分类的统计
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub count: i64,
    pub views: i64,
}
