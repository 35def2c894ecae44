use uuid::Uuid;

use crate::content::ProjectDraft;

use super::{PgStore, Project};

/// 项目表操作
pub trait ProjectStorage: PgStore {
    /// 插入项目，slug 已被占用时返回 `None`
    fn insert_project(
        &mut self,
        owner_id: Uuid,
        slug: &str,
        draft: &ProjectDraft,
    ) -> impl Future<Output = Result<Option<Project>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Project>(
                "
                INSERT INTO projects
                    (id, name, slug, description, website_url, accent_color, owner_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (slug) DO NOTHING
                RETURNING *
                ",
            )
            .bind(Uuid::new_v4())
            .bind(&draft.name)
            .bind(slug)
            .bind(&draft.description)
            .bind(&draft.website_url)
            .bind(&draft.accent_color)
            .bind(owner_id)
            .fetch_optional(self.executor())
            .await
        }
    }

    /// 更新项目字段，slug 保持不变
    fn update_project(
        &mut self,
        id: Uuid,
        draft: &ProjectDraft,
    ) -> impl Future<Output = Result<Project, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Project>(
                "
                UPDATE projects
                SET
                    name = $2,
                    description = $3,
                    website_url = $4,
                    accent_color = $5,
                    updated_at = now()
                WHERE id = $1
                RETURNING *
                ",
            )
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(&draft.website_url)
            .bind(&draft.accent_color)
            .fetch_one(self.executor())
            .await
        }
    }

    /// 删除项目及其全部文章、订阅者和 API key
    fn delete_project(&mut self, id: Uuid) -> impl Future<Output = Result<(), sqlx::Error>> + Send {
        async move {
            for sql in [
                "DELETE FROM posts WHERE project_id = $1",
                "DELETE FROM subscribers WHERE project_id = $1",
                "DELETE FROM api_keys WHERE project_id = $1",
                "DELETE FROM projects WHERE id = $1",
            ] {
                sqlx::query(sql).bind(id).execute(self.executor()).await?;
            }
            Ok(())
        }
    }

    /// 查询属于指定用户的项目，不属于该用户时返回 `None`
    fn owned_project(
        &mut self,
        id: Uuid,
        owner_id: Uuid,
    ) -> impl Future<Output = Result<Option<Project>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(self.executor())
                .await
        }
    }

    fn project_by_id(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Project>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
                .bind(id)
                .fetch_optional(self.executor())
                .await
        }
    }

    fn project_by_slug(
        &mut self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Project>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE slug = $1")
                .bind(slug)
                .fetch_optional(self.executor())
                .await
        }
    }

    fn project_slug_exists(
        &mut self,
        slug: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send {
        async move {
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM projects WHERE slug = $1)")
                .bind(slug)
                .fetch_one(self.executor())
                .await
        }
    }

    /// 用户的全部项目，按创建时间倒序
    fn projects_for_owner(
        &mut self,
        owner_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Project>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Project>(
                "SELECT * FROM projects WHERE owner_id = $1 ORDER BY created_at DESC",
            )
            .bind(owner_id)
            .fetch_all(self.executor())
            .await
        }
    }
}

impl<T: PgStore> ProjectStorage for T {}
