use uuid::Uuid;

use super::{PgStore, User};

/// 用户表操作
pub trait UserStorage: PgStore {
    /// 插入新用户，邮箱和用户名须已规范化
    fn insert_user(
        &mut self,
        email: &str,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<User, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, User>(
                "
                INSERT INTO users (id, email, username, display_name, password_hash)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                ",
            )
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(username)
            .bind(display_name)
            .bind(password_hash)
            .fetch_one(self.executor())
            .await
        }
    }

    fn user_by_id(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(self.executor())
                .await
        }
    }

    /// 按邮箱查找，大小写不敏感
    fn user_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(self.executor())
                .await
        }
    }

    /// 按用户名查找，大小写不敏感
    fn user_by_username(
        &mut self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(username) = lower($1)")
                .bind(username)
                .fetch_optional(self.executor())
                .await
        }
    }
}

impl<T: PgStore> UserStorage for T {}
