use crate::{
    auth::{SessionKeys, password},
    content::{Credentials, Registration},
    error::{Error, Result},
    storage::{PgStore, User, UserStorage},
};

/// 注册新用户，成功后返回用户和会话令牌
///
/// 格式校验由 [`Registration::new`] 完成，这里只检查邮箱和用户名是否已被占用。
pub async fn register<S: PgStore>(
    store: &mut S,
    sessions: &SessionKeys,
    registration: Registration,
) -> Result<(User, String)> {
    let mut conflicts = Vec::new();
    if store.user_by_email(&registration.email).await?.is_some() {
        conflicts.push("An account with this email already exists".to_string());
    }
    if store.user_by_username(&registration.username).await?.is_some() {
        conflicts.push("This username is already taken".to_string());
    }
    if !conflicts.is_empty() {
        return Err(Error::Conflict(conflicts));
    }

    let Registration {
        email,
        username,
        password,
        display_name,
    } = registration;
    let password_hash =
        tokio::task::spawn_blocking(move || password::hash_password(&password)).await??;

    // 并发注册时以唯一索引为准
    let user = store
        .insert_user(&email, &username, &display_name, &password_hash)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                Error::Conflict(vec![
                    "An account with this email or username already exists".to_string(),
                ])
            } else {
                e.into()
            }
        })?;

    let token = sessions.issue(user.id)?;
    tracing::info!(user = %user.username, "user registered");
    Ok((user, token))
}

/// 校验邮箱和密码
///
/// 用户不存在和密码错误返回同一个 [`Error::Auth`]。
pub async fn authenticate<S: PgStore>(store: &mut S, credentials: Credentials) -> Result<User> {
    let Some(user) = store.user_by_email(&credentials.email).await? else {
        return Err(Error::Auth);
    };

    let hash = user.password_hash.clone();
    let password = credentials.password;
    let verified =
        tokio::task::spawn_blocking(move || password::verify_password(&password, &hash)).await?;

    if verified { Ok(user) } else { Err(Error::Auth) }
}

/// 由会话令牌解析当前用户
///
/// 令牌无效或用户已不存在时返回 `None`。
pub async fn current_user<S: PgStore>(
    store: &mut S,
    sessions: &SessionKeys,
    token: &str,
) -> Result<Option<User>> {
    match sessions.resolve(token) {
        Some(id) => Ok(store.user_by_id(id).await?),
        None => Ok(None),
    }
}
