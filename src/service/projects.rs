use uuid::Uuid;

use crate::{
    content::{ProjectDraft, slug},
    error::{Error, Result},
    storage::{PgStore, Project, ProjectStorage, User},
};

/// 创建项目，slug 由名称生成，全局冲突时追加随机后缀
pub async fn create<S: PgStore>(store: &mut S, owner: &User, draft: ProjectDraft) -> Result<Project> {
    let base = slug::slugify(&draft.name);
    let mut slug = base.clone();
    let project = loop {
        if !slug.is_empty() && !store.project_slug_exists(&slug).await? {
            // 并发创建时以唯一约束为准，插入冲突则换一个后缀
            if let Some(project) = store.insert_project(owner.id, &slug, &draft).await? {
                break project;
            }
        }
        slug = slug::suffixed(&base);
    };
    tracing::info!(project = %project.slug, owner = %owner.username, "project created");
    Ok(project)
}

/// 查询当前用户拥有的项目
///
/// 项目不存在和不属于当前用户返回同样的 [`Error::NotFound`]。
pub async fn owned<S: PgStore>(store: &mut S, owner: &User, id: Uuid) -> Result<Project> {
    store
        .owned_project(id, owner.id)
        .await?
        .ok_or(Error::NotFound("Project not found"))
}

/// 更新已校验归属的项目
pub async fn update<S: PgStore>(
    store: &mut S,
    project: &Project,
    draft: ProjectDraft,
) -> Result<Project> {
    Ok(store.update_project(project.id, &draft).await?)
}

/// 删除项目及其全部文章、订阅者和 API key
pub async fn delete<S: PgStore>(store: &mut S, project: Project) -> Result<()> {
    store.delete_project(project.id).await?;
    tracing::info!(project = %project.slug, "project deleted");
    Ok(())
}

/// 用户的项目列表，最新的在前
pub async fn list<S: PgStore>(store: &mut S, owner: &User) -> Result<Vec<Project>> {
    Ok(store.projects_for_owner(owner.id).await?)
}

/// 按 slug 查询公开项目
pub async fn by_slug<S: PgStore>(store: &mut S, slug: &str) -> Result<Project> {
    store
        .project_by_slug(slug)
        .await?
        .ok_or(Error::NotFound("Changelog not found"))
}
