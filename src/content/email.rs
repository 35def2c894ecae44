use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("invalid email regex")
});

/// 邮箱规范化：去除首尾空白并转小写
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 订阅邮箱的格式检查
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// 注册邮箱的宽松检查：包含 `@`，且域名部分包含 `.`
pub fn looks_like_email(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("dev@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.io"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("foo@bar.com"));
        assert!(!looks_like_email("foo@bar"));
        assert!(!looks_like_email("@bar.com"));
        assert!(!looks_like_email("foobar.com"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Foo@Bar.COM "), "foo@bar.com");
    }
}
