use uuid::Uuid;

use crate::{
    content::{PostDraft, slug},
    error::{Error, Result},
    notify::Announcement,
    storage::{PgStore, Post, PostStorage, Project, SubscriberStorage},
};

/// 发布状态的变化
///
/// 只有 [`Transition::Published`] 会触发订阅通知。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 草稿 -> 已发布
    Published,
    /// 已发布 -> 草稿
    Unpublished,
    Unchanged,
}

impl Transition {
    pub fn between(was_published: bool, is_published: bool) -> Self {
        match (was_published, is_published) {
            (false, true) => Transition::Published,
            (true, false) => Transition::Unpublished,
            _ => Transition::Unchanged,
        }
    }
}

/// 在项目内创建文章，slug 在项目内冲突时追加随机后缀
pub async fn create<S: PgStore>(
    store: &mut S,
    project: &Project,
    draft: PostDraft,
) -> Result<(Post, Transition)> {
    let mut slug = draft.slug.clone();
    let post = loop {
        if !slug.is_empty() && !store.post_slug_exists(project.id, &slug).await? {
            if let Some(post) = store.insert_post(project.id, &slug, &draft).await? {
                break post;
            }
        }
        slug = slug::suffixed(&draft.slug);
    };

    tracing::info!(project = %project.slug, post = %post.slug, published = post.is_published, "post created");
    let transition = Transition::between(false, post.is_published);
    Ok((post, transition))
}

/// 查询项目内的文章
///
/// 文章不存在和不属于该项目返回同样的 [`Error::NotFound`]。
pub async fn owned<S: PgStore>(store: &mut S, project: &Project, id: Uuid) -> Result<Post> {
    store
        .post_in_project(project.id, id)
        .await?
        .ok_or(Error::NotFound("Post not found"))
}

/// 更新标题、正文和分类，slug 和发布状态不变
pub async fn update<S: PgStore>(store: &mut S, post: &Post, draft: PostDraft) -> Result<Post> {
    Ok(store.update_post(post.id, &draft).await?)
}

/// 切换发布状态
pub async fn toggle_publish<S: PgStore>(store: &mut S, post: &Post) -> Result<(Post, Transition)> {
    let updated = store.set_published(post.id, !post.is_published).await?;
    let transition = Transition::between(post.is_published, updated.is_published);
    tracing::info!(post = %updated.slug, ?transition, "post publish state toggled");
    Ok((updated, transition))
}

pub async fn delete<S: PgStore>(store: &mut S, post: Post) -> Result<()> {
    store.delete_post(post.id).await?;
    Ok(())
}

/// 公开页面的一次浏览，返回新的浏览次数
pub async fn record_view<S: PgStore>(store: &mut S, post: &Post) -> Result<i64> {
    Ok(store.increment_view_count(post.id).await?)
}

/// 公开页面按 slug 查询文章，草稿视为不存在
pub async fn published_by_slug<S: PgStore>(
    store: &mut S,
    project: &Project,
    slug: &str,
) -> Result<Post> {
    store
        .post_by_slug(project.id, slug)
        .await?
        .filter(|post| post.is_published)
        .ok_or(Error::NotFound("Post not found"))
}

/// 发布后需要发送的通知
///
/// 在同一个事务中读取订阅者；未发生发布或没有订阅者时返回 `None`。
pub async fn announcement<S: PgStore>(
    store: &mut S,
    project: &Project,
    post: &Post,
    transition: Transition,
) -> Result<Option<Announcement>> {
    if transition != Transition::Published {
        return Ok(None);
    }

    let subscribers = store.subscribers_for_project(project.id).await?;
    if subscribers.is_empty() {
        return Ok(None);
    }
    Ok(Some(Announcement::new(project, post, subscribers)))
}
