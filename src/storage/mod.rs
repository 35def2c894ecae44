mod api_keys;
mod models;
mod posts;
mod postgres;
mod projects;
mod subscribers;
mod users;

use sqlx::PgExecutor;

pub use self::{
    api_keys::ApiKeyStorage,
    models::{ApiKey, CategoryStat, Post, PostCounts, Project, Subscriber, User},
    postgres::{Db, SCHEMA, migrate, new_db_pool},
    posts::PostStorage,
    projects::ProjectStorage,
    subscribers::SubscriberStorage,
    users::UserStorage,
};

/// 存储 trait 的基础：提供 SQL 执行器
///
/// 各表的操作以默认方法的形式定义在 [`UserStorage`]、[`ProjectStorage`] 等 trait 中，
/// 对所有 [`PgStore`] 自动实现。事务和连接池都可以作为 [`PgStore`] 使用。
pub trait PgStore: Send {
    /// 获取 SQL 执行器，用于 [`sqlx::query()`] 执行
    fn executor<'t>(&'t mut self) -> impl PgExecutor<'t>;
}

/// 为 [`sqlx::PgTransaction`] 实现 [`PgStore`]
impl PgStore for sqlx::PgTransaction<'_> {
    fn executor<'t>(&'t mut self) -> impl PgExecutor<'t> {
        self.as_mut()
    }
}

/// 为 [`Db`] 实现 [`PgStore`]，每条语句单独提交
impl PgStore for &'_ Db {
    fn executor<'t>(&'t mut self) -> impl PgExecutor<'t> {
        *self
    }
}
