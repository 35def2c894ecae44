use uuid::Uuid;

use crate::content::{Category, PostDraft};

use super::{CategoryStat, PgStore, Post, PostCounts};

/// 文章表操作
pub trait PostStorage: PgStore {
    /// 插入文章，`draft.publish` 为真时同时写入发布时间
    ///
    /// slug 在项目内已被占用时返回 `None`。
    fn insert_post(
        &mut self,
        project_id: Uuid,
        slug: &str,
        draft: &PostDraft,
    ) -> impl Future<Output = Result<Option<Post>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Post>(
                "
                INSERT INTO posts
                    (id, project_id, title, slug, body_markdown, body_html, category,
                     is_published, published_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $8 THEN now() ELSE NULL END)
                ON CONFLICT (project_id, slug) DO NOTHING
                RETURNING *
                ",
            )
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(&draft.title)
            .bind(slug)
            .bind(&draft.body_markdown)
            .bind(&draft.body_html)
            .bind(draft.category.as_str())
            .bind(draft.publish)
            .fetch_optional(self.executor())
            .await
        }
    }

    /// 更新标题、正文和分类，slug 与发布状态保持不变
    fn update_post(
        &mut self,
        id: Uuid,
        draft: &PostDraft,
    ) -> impl Future<Output = Result<Post, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Post>(
                "
                UPDATE posts
                SET
                    title = $2,
                    body_markdown = $3,
                    body_html = $4,
                    category = $5,
                    updated_at = now()
                WHERE id = $1
                RETURNING *
                ",
            )
            .bind(id)
            .bind(&draft.title)
            .bind(&draft.body_markdown)
            .bind(&draft.body_html)
            .bind(draft.category.as_str())
            .fetch_one(self.executor())
            .await
        }
    }

    /// 设置发布状态：发布时写入当前时间，撤回时清空发布时间
    fn set_published(
        &mut self,
        id: Uuid,
        published: bool,
    ) -> impl Future<Output = Result<Post, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Post>(
                "
                UPDATE posts
                SET
                    is_published = $2,
                    published_at = CASE WHEN $2 THEN now() ELSE NULL END,
                    updated_at = now()
                WHERE id = $1
                RETURNING *
                ",
            )
            .bind(id)
            .bind(published)
            .fetch_one(self.executor())
            .await
        }
    }

    fn delete_post(&mut self, id: Uuid) -> impl Future<Output = Result<(), sqlx::Error>> + Send {
        async move {
            sqlx::query("DELETE FROM posts WHERE id = $1")
                .bind(id)
                .execute(self.executor())
                .await?;
            Ok(())
        }
    }

    /// 浏览次数加一，返回新的计数
    fn increment_view_count(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send {
        async move {
            sqlx::query_scalar(
                "UPDATE posts SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
            )
            .bind(id)
            .fetch_one(self.executor())
            .await
        }
    }

    /// 查询项目内的文章，不属于该项目时返回 `None`
    fn post_in_project(
        &mut self,
        project_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Post>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1 AND project_id = $2")
                .bind(id)
                .bind(project_id)
                .fetch_optional(self.executor())
                .await
        }
    }

    fn post_by_slug(
        &mut self,
        project_id: Uuid,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Post>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE project_id = $1 AND slug = $2")
                .bind(project_id)
                .bind(slug)
                .fetch_optional(self.executor())
                .await
        }
    }

    fn post_slug_exists(
        &mut self,
        project_id: Uuid,
        slug: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send {
        async move {
            sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM posts WHERE project_id = $1 AND slug = $2)",
            )
            .bind(project_id)
            .bind(slug)
            .fetch_one(self.executor())
            .await
        }
    }

    /// 项目的文章列表
    ///
    /// - `published_only`：只返回已发布文章，按发布时间倒序
    /// - 否则返回全部文章，按创建时间倒序
    fn posts_for_project(
        &mut self,
        project_id: Uuid,
        published_only: bool,
    ) -> impl Future<Output = Result<Vec<Post>, sqlx::Error>> + Send {
        async move {
            let sql = if published_only {
                "
                SELECT * FROM posts
                WHERE project_id = $1 AND is_published = TRUE
                ORDER BY published_at DESC
                "
            } else {
                "SELECT * FROM posts WHERE project_id = $1 ORDER BY created_at DESC"
            };
            sqlx::query_as::<_, Post>(sql)
                .bind(project_id)
                .fetch_all(self.executor())
                .await
        }
    }

    /// 已发布文章，可按分类过滤并限制数量，按发布时间倒序
    fn published_posts(
        &mut self,
        project_id: Uuid,
        category: Option<Category>,
        limit: Option<i64>,
    ) -> impl Future<Output = Result<Vec<Post>, sqlx::Error>> + Send {
        async move {
            let mut builder = sqlx::QueryBuilder::new("SELECT * FROM posts WHERE project_id = ");
            builder.push_bind(project_id);
            builder.push(" AND is_published = TRUE");
            if let Some(category) = category {
                builder.push(" AND category = ").push_bind(category.as_str());
            }
            builder.push(" ORDER BY published_at DESC");
            if let Some(limit) = limit {
                builder.push(" LIMIT ").push_bind(limit);
            }

            builder
                .build_query_as::<Post>()
                .fetch_all(self.executor())
                .await
        }
    }

    /// 浏览量最高的已发布文章
    fn top_posts(
        &mut self,
        project_id: Uuid,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Post>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, Post>(
                "
                SELECT * FROM posts
                WHERE project_id = $1 AND is_published = TRUE
                ORDER BY view_count DESC, published_at DESC
                LIMIT $2
                ",
            )
            .bind(project_id)
            .bind(limit)
            .fetch_all(self.executor())
            .await
        }
    }

    /// 文章总数、已发布数、总浏览量
    fn post_counts(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = Result<PostCounts, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, PostCounts>(
                "
                SELECT
                    COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE is_published) AS published,
                    COALESCE(SUM(view_count), 0)::BIGINT AS total_views
                FROM posts
                WHERE project_id = $1
                ",
            )
            .bind(project_id)
            .fetch_one(self.executor())
            .await
        }
    }

    /// 已发布文章按分类的数量和浏览量
    fn category_stats(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = Result<Vec<CategoryStat>, sqlx::Error>> + Send {
        async move {
            sqlx::query_as::<_, CategoryStat>(
                "
                SELECT
                    category,
                    COUNT(*) AS count,
                    COALESCE(SUM(view_count), 0)::BIGINT AS views
                FROM posts
                WHERE project_id = $1 AND is_published = TRUE
                GROUP BY category
                ",
            )
            .bind(project_id)
            .fetch_all(self.executor())
            .await
        }
    }

    /// 用户所有项目的文章总数
    fn post_count_for_owner(
        &mut self,
        owner_id: Uuid,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send {
        async move {
            sqlx::query_scalar(
                "
                SELECT COUNT(*)
                FROM posts p
                INNER JOIN projects pr ON p.project_id = pr.id
                WHERE pr.owner_id = $1
                ",
            )
            .bind(owner_id)
            .fetch_one(self.executor())
            .await
        }
    }
}

impl<T: PgStore> PostStorage for T {}
