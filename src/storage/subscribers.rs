use uuid::Uuid;

use super::{PgStore, Subscriber};

/// 订阅者表操作
pub trait SubscriberStorage: PgStore {
    /// 插入订阅者，(email, project_id) 已存在时返回 `None`
    fn insert_subscriber(
        &mut self,
        project_id: Uuid,
        email: &str,
        unsubscribe_token: &str,
    ) -> impl Future<Output = Result<Option<Subscriber>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Subscriber>(
                "
                INSERT INTO subscribers (id, project_id, email, unsubscribe_token)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (email, project_id) DO NOTHING
                RETURNING *
                ",
            )
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(email)
            .bind(unsubscribe_token)
            .fetch_optional(self.executor())
            .await
        }
    }

    /// 项目的订阅者，按订阅时间倒序
    fn subscribers_for_project(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Subscriber>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Subscriber>(
                "SELECT * FROM subscribers WHERE project_id = $1 ORDER BY created_at DESC",
            )
            .bind(project_id)
            .fetch_all(self.executor())
            .await
        }
    }

    fn subscriber_count(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send {
        async move {
            sqlx::query_scalar("SELECT COUNT(*) FROM subscribers WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(self.executor())
                .await
        }
    }

    /// 按退订令牌删除，返回是否删除了记录
    fn delete_subscriber_by_token(
        &mut self,
        token: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send {
        async move {
            let result = sqlx::query("DELETE FROM subscribers WHERE unsubscribe_token = $1")
                .bind(token)
                .execute(self.executor())
                .await?;
            Ok(result.rows_affected() > 0)
        }
    }

    /// 删除项目内的订阅者，返回是否删除了记录
    fn delete_subscriber(
        &mut self,
        project_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send {
        async move {
            let result = sqlx::query("DELETE FROM subscribers WHERE id = $1 AND project_id = $2")
                .bind(id)
                .bind(project_id)
                .execute(self.executor())
                .await?;
            Ok(result.rows_affected() > 0)
        }
    }
}

impl<T: PgStore> SubscriberStorage for T {}
