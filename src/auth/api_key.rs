use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

/// 所有 API key 的固定前缀
pub const KEY_TAG: &str = "cpk_";

/// 列表中展示的前缀长度
pub const PREFIX_LEN: usize = 12;

/// 新生成的 API key
///
/// `raw` 只在创建时返回给调用方一次，数据库只保存 `hash` 和 `prefix`。
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    pub raw: String,
    pub hash: String,
    pub prefix: String,
}

/// 生成 32 字节随机密钥
pub fn generate() -> GeneratedKey {
    let bytes: [u8; 32] = rand::random();
    let raw = format!("{KEY_TAG}{}", URL_SAFE_NO_PAD.encode(bytes));

    GeneratedKey {
        hash: hash_key(&raw),
        prefix: raw[..PREFIX_LEN].to_string(),
        raw,
    }
}

/// SHA-256 十六进制摘要
pub fn hash_key(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let key = generate();
        assert!(key.raw.starts_with(KEY_TAG));
        assert_eq!(key.raw.len(), KEY_TAG.len() + 43);
        assert_eq!(key.prefix.len(), PREFIX_LEN);
        assert!(key.raw.starts_with(&key.prefix));
        assert_eq!(key.hash.len(), 64);
        assert_eq!(key.hash, hash_key(&key.raw));
    }

    #[test]
    fn test_generate_is_random() {
        assert_ne!(generate().raw, generate().raw);
    }

    #[test]
    fn test_hash_known_value() {
        assert_eq!(
            hash_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
