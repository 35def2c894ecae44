use axum::{
    Router,
    extract::{Path, State},
    response::Html,
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use super::extract::CurrentUser;
use crate::{
    content::Category,
    error::PageError,
    service::projects,
    state::AppState,
    storage::{CategoryStat, PostStorage, SubscriberStorage},
};

const TOP_POSTS: i64 = 10;

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/projects/{project_id}/analytics", get(analytics))
}

/// 分类统计的一行，没有文章的分类计为 0
#[derive(Debug, Serialize)]
struct CategoryRow {
    category: &'static str,
    label: &'static str,
    color: &'static str,
    count: i64,
    views: i64,
}

fn category_rows(stats: &[CategoryStat]) -> Vec<CategoryRow> {
    Category::ALL
        .iter()
        .map(|category| {
            let stat = stats.iter().find(|s| s.category == category.as_str());
            CategoryRow {
                category: category.as_str(),
                label: category.label(),
                color: category.color(),
                count: stat.map_or(0, |s| s.count),
                views: stat.map_or(0, |s| s.views),
            }
        })
        .collect()
}

/// 项目统计：总浏览量、文章数、订阅数、热门文章和分类分布
async fn analytics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<Html<String>, PageError> {
    let mut db = state.db();
    let project = projects::owned(&mut db, &user, project_id).await?;
    let counts = db.post_counts(project.id).await?;
    let subscriber_count = db.subscriber_count(project.id).await?;
    let top_posts = db.top_posts(project.id, TOP_POSTS).await?;
    let stats = db.category_stats(project.id).await?;

    let templates = state.templates();
    let mut context = templates.context();
    context.insert("user", &user);
    context.insert("project", &project);
    context.insert("counts", &counts);
    context.insert("subscriber_count", &subscriber_count);
    context.insert("top_posts", &top_posts);
    context.insert("category_stats", &category_rows(&stats));
    Ok(templates.page("analytics.html", &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_rows_fill_missing() {
        let stats = vec![CategoryStat {
            category: "bugfix".to_string(),
            count: 2,
            views: 7,
        }];
        let rows = category_rows(&stats);

        assert_eq!(rows.len(), 4);
        let bugfix = rows.iter().find(|r| r.category == "bugfix").unwrap();
        assert_eq!((bugfix.count, bugfix.views), (2, 7));
        assert!(rows.iter().filter(|r| r.category != "bugfix").all(|r| r.count == 0));
    }
}
