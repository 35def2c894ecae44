use uuid::Uuid;

use crate::{
    auth::api_key,
    error::{Error, Result},
    storage::{ApiKey, ApiKeyStorage, PgStore, Project},
};

const MAX_NAME_LEN: usize = 200;

/// 新建的 API key 和它的明文
///
/// 明文只在这里出现一次，之后的列表只展示前缀。
#[derive(Debug)]
pub struct CreatedKey {
    pub key: ApiKey,
    pub raw: String,
}

/// 校验 key 的名称
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        Err(Error::Validation(vec!["Key name is required".to_string()]))
    } else if name.chars().count() > MAX_NAME_LEN {
        Err(Error::Validation(vec![format!(
            "Key name must be at most {MAX_NAME_LEN} characters"
        )]))
    } else {
        Ok(name.to_string())
    }
}

/// 为项目创建 API key
pub async fn create<S: PgStore>(store: &mut S, project: &Project, name: &str) -> Result<CreatedKey> {
    let name = validate_name(name)?;
    let generated = api_key::generate();
    let key = store
        .insert_api_key(project.id, &name, &generated.hash, &generated.prefix)
        .await?;
    tracing::info!(project = %project.slug, prefix = %key.key_prefix, "api key created");

    Ok(CreatedKey {
        key,
        raw: generated.raw,
    })
}

/// 校验明文 key，成功时更新最后使用时间
///
/// 未找到返回 `None`，由调用方决定 HTTP 层的处理。
pub async fn verify<S: PgStore>(store: &mut S, raw: &str) -> Result<Option<ApiKey>> {
    Ok(store.touch_api_key(&api_key::hash_key(raw)).await?)
}

pub async fn list<S: PgStore>(store: &mut S, project: &Project) -> Result<Vec<ApiKey>> {
    Ok(store.api_keys_for_project(project.id).await?)
}

/// 删除项目内的 API key
pub async fn delete<S: PgStore>(store: &mut S, project: &Project, id: Uuid) -> Result<()> {
    if store.delete_api_key(project.id, id).await? {
        Ok(())
    } else {
        Err(Error::NotFound("API key not found"))
    }
}
