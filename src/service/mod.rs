//! 业务规则
//!
//! 每个操作接收一个 [`PgStore`](crate::storage::PgStore)（通常是请求内的事务）和
//! 已经解析、已经校验过归属的实体，不依赖任何全局上下文。

pub mod api_keys;
pub mod identity;
pub mod posts;
pub mod projects;
pub mod subscribers;

/// 唯一约束冲突
fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
