use uuid::Uuid;

use super::{ApiKey, PgStore};

/// API key 表操作
pub trait ApiKeyStorage: PgStore {
    fn insert_api_key(
        &mut self,
        project_id: Uuid,
        name: &str,
        key_hash: &str,
        key_prefix: &str,
    ) -> impl Future<Output = Result<ApiKey, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, ApiKey>(
                "
                INSERT INTO api_keys (id, project_id, name, key_hash, key_prefix)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                ",
            )
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(name)
            .bind(key_hash)
            .bind(key_prefix)
            .fetch_one(self.executor())
            .await
        }
    }

    /// 项目的 API key，按创建时间倒序
    fn api_keys_for_project(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = Result<Vec<ApiKey>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, ApiKey>(
                "SELECT * FROM api_keys WHERE project_id = $1 ORDER BY created_at DESC",
            )
            .bind(project_id)
            .fetch_all(self.executor())
            .await
        }
    }

    /// 按哈希查找并更新最后使用时间，查找与更新在同一条语句中完成
    fn touch_api_key(
        &mut self,
        key_hash: &str,
    ) -> impl Future<Output = Result<Option<ApiKey>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, ApiKey>(
                "
                UPDATE api_keys
                SET last_used_at = now()
                WHERE key_hash = $1
                RETURNING *
                ",
            )
            .bind(key_hash)
            .fetch_optional(self.executor())
            .await
        }
    }

    /// 删除项目内的 API key，返回是否删除了记录
    fn delete_api_key(
        &mut self,
        project_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send {
        async move {
            let result = sqlx::query("DELETE FROM api_keys WHERE id = $1 AND project_id = $2")
                .bind(id)
                .bind(project_id)
                .execute(self.executor())
                .await?;
            Ok(result.rows_affected() > 0)
        }
    }
}

impl<T: PgStore> ApiKeyStorage for T {}
