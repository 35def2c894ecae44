use uuid::Uuid;

use crate::{
    content::email,
    error::{Error, Result},
    storage::{PgStore, Project, Subscriber, SubscriberStorage},
};

/// 订阅结果
///
/// 两种结果对外展示相同的成功提示，避免泄露某个邮箱是否已订阅。
#[derive(Debug)]
pub enum Subscription {
    Created(Subscriber),
    AlreadySubscribed,
}

/// 新的退订令牌，32 位十六进制
fn unsubscribe_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 订阅项目更新，同一邮箱重复订阅不报错
pub async fn subscribe<S: PgStore>(
    store: &mut S,
    project: &Project,
    address: &str,
) -> Result<Subscription> {
    let address = email::normalize(address);
    if !email::is_valid_email(&address) {
        return Err(Error::Validation(vec![
            "Please enter a valid email address.".to_string(),
        ]));
    }

    let token = unsubscribe_token();
    match store.insert_subscriber(project.id, &address, &token).await? {
        Some(subscriber) => {
            tracing::info!(project = %project.slug, "new subscriber");
            Ok(Subscription::Created(subscriber))
        }
        None => Ok(Subscription::AlreadySubscribed),
    }
}

/// 按令牌退订，返回是否找到并删除了订阅者
pub async fn unsubscribe_by_token<S: PgStore>(store: &mut S, token: &str) -> Result<bool> {
    Ok(store.delete_subscriber_by_token(token).await?)
}

/// 项目所有者删除订阅者
pub async fn delete<S: PgStore>(store: &mut S, project: &Project, id: Uuid) -> Result<()> {
    if store.delete_subscriber(project.id, id).await? {
        Ok(())
    } else {
        Err(Error::NotFound("Subscriber not found"))
    }
}

pub async fn list<S: PgStore>(store: &mut S, project: &Project) -> Result<Vec<Subscriber>> {
    Ok(store.subscribers_for_project(project.id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsubscribe_token_shape() {
        let token = unsubscribe_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, unsubscribe_token());
    }
}
