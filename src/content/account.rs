use crate::{
    content::email,
    error::{Error, Result},
};

/// 通过格式校验的注册信息
///
/// 邮箱和用户名已规范化为小写，显示名为空时使用用户名。
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub display_name: String,
}

impl Registration {
    /// 规范化并校验注册表单，返回全部错误而不是第一个
    pub fn new(
        email: &str,
        username: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Self> {
        let email = email::normalize(email);
        let username = username.trim().to_lowercase();
        let mut errors = Vec::new();

        if email.is_empty() || !email::looks_like_email(&email) {
            errors.push("Valid email is required".to_string());
        } else if email.len() > 255 {
            errors.push("Email must be at most 255 characters".to_string());
        }

        let username_len = username.chars().count();
        if username_len < 3 {
            errors.push("Username must be at least 3 characters".to_string());
        } else if username_len > 50 {
            errors.push("Username must be at most 50 characters".to_string());
        } else if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            errors.push(
                "Username can only contain letters, numbers, hyphens, and underscores".to_string(),
            );
        }

        let password_len = password.chars().count();
        if password_len < 8 {
            errors.push("Password must be at least 8 characters".to_string());
        } else if password_len > 128 {
            errors.push("Password must be at most 128 characters".to_string());
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| name.chars().take(200).collect())
            .unwrap_or_else(|| username.clone());

        Ok(Self {
            email,
            username,
            password: password.to_string(),
            display_name,
        })
    }
}

/// 登录凭证，只检查非空
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Result<Self> {
        let email = email::normalize(email);
        let mut errors = Vec::new();
        if email.is_empty() {
            errors.push("Email is required".to_string());
        }
        if password.is_empty() {
            errors.push("Password is required".to_string());
        }
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok(Self {
            email,
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_of(result: Result<Registration>) -> Vec<String> {
        match result {
            Err(Error::Validation(errors)) => errors,
            other => panic!("应返回校验错误: {other:?}"),
        }
    }

    #[test]
    fn test_registration_normalizes() {
        let reg = Registration::new(" Foo@Bar.com ", " Alice ", "password123", None)
            .expect("注册信息应合法");
        assert_eq!(reg.email, "foo@bar.com");
        assert_eq!(reg.username, "alice");
        assert_eq!(reg.display_name, "alice", "显示名默认使用用户名");
    }

    #[test]
    fn test_registration_keeps_display_name() {
        let reg = Registration::new("a@b.io", "alice", "password123", Some("  Alice L. "))
            .expect("注册信息应合法");
        assert_eq!(reg.display_name, "Alice L.");
    }

    #[test]
    fn test_registration_collects_all_errors() {
        let errors = errors_of(Registration::new("nope", "ab", "short", None));
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("email"));
        assert!(errors[1].contains("Username"));
        assert!(errors[2].contains("Password"));
    }

    #[test]
    fn test_registration_email_needs_domain_dot() {
        let errors = errors_of(Registration::new("user@localhost", "alice", "password123", None));
        assert_eq!(errors, vec!["Valid email is required"]);
    }

    #[test]
    fn test_registration_username_charset() {
        let errors = errors_of(Registration::new("a@b.io", "bad name!", "password123", None));
        assert!(errors[0].contains("letters, numbers"));
    }

    #[test]
    fn test_credentials_require_both_fields() {
        match Credentials::new("  ", "") {
            Err(Error::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("应返回校验错误: {other:?}"),
        }
        let creds = Credentials::new("Foo@Bar.com", "x").expect("凭证应合法");
        assert_eq!(creds.email, "foo@bar.com");
    }
}
