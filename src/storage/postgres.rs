use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

/// 数据库连接池类型
pub type Db = sqlx::PgPool;

/// 建表语句
pub const SCHEMA: &str = include_str!("../../sql/01-CREATE_TABLE.sql");

/// 根据连接 URL 创建新的数据库连接池
///
/// 连接池配置：
///
/// - 最大空闲时间 60 秒
/// - 最大生存时间 1500 秒（约 25 分钟）
/// - 最大连接数 10
/// - 获取连接超时 2 秒
/// - 获取前测试连接
/// - 最小连接数 2
pub async fn new_db_pool(conn_url: &str) -> Result<Db, sqlx::Error> {
    PgPoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
        .connect(conn_url)
        .await
}

/// 执行迁移语句
///
/// 将内容按 `;` 分割，每条 SQL 单独执行。建表语句均为 `IF NOT EXISTS`，可重复执行。
pub async fn migrate(db: &Db, content: &str) -> Result<(), sqlx::Error> {
    for sql in content.split(';') {
        if sql.trim().is_empty() {
            continue;
        }
        sqlx::query(sql).execute(db).await?;
    }
    Ok(())
}
