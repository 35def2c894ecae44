use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_ACCENT_COLOR: &str = "#6366f1";

/// 项目表单，创建和编辑共用
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub website_url: String,
    pub accent_color: String,
}

/// 通过校验的项目字段
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub accent_color: String,
}

impl ProjectForm {
    /// 校验并规范化表单
    ///
    /// 名称必填且不超过 200 字符；强调色须为 `#` 加 6 位十六进制，留空时使用默认色；
    /// 空的可选字段保存为 `None`。
    pub fn validate(self) -> Result<ProjectDraft> {
        let name = self.name.trim().to_string();
        let accent_color = match self.accent_color.trim() {
            "" => DEFAULT_ACCENT_COLOR.to_string(),
            color => color.to_lowercase(),
        };
        let mut errors = Vec::new();

        if name.is_empty() {
            errors.push("Project name is required".to_string());
        } else if name.chars().count() > 200 {
            errors.push("Project name must be at most 200 characters".to_string());
        }

        if !is_hex_color(&accent_color) {
            errors.push("Color must be a valid hex color (e.g. #6366f1)".to_string());
        }

        let website_url = non_empty(self.website_url);
        if website_url.as_ref().is_some_and(|url| url.len() > 500) {
            errors.push("Website URL must be at most 500 characters".to_string());
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(ProjectDraft {
            name,
            description: non_empty(self.description),
            website_url,
            accent_color,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str) -> ProjectForm {
        ProjectForm {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_and_empty_fields() {
        let draft = form("  Analytics Test ").validate().expect("表单应合法");
        assert_eq!(draft.name, "Analytics Test");
        assert_eq!(draft.accent_color, DEFAULT_ACCENT_COLOR);
        assert_eq!(draft.description, None);
        assert_eq!(draft.website_url, None);
    }

    #[test]
    fn test_name_required_and_bounded() {
        assert!(matches!(form("   ").validate(), Err(Error::Validation(_))));
        assert!(matches!(form(&"x".repeat(201)).validate(), Err(Error::Validation(_))));
        assert!(form(&"x".repeat(200)).validate().is_ok());
    }

    #[test]
    fn test_accent_color() {
        let mut f = form("p");
        f.accent_color = "#ABCDEF".to_string();
        assert_eq!(f.clone().validate().unwrap().accent_color, "#abcdef");

        f.accent_color = "red".to_string();
        match f.validate() {
            Err(Error::Validation(errors)) => assert!(errors[0].contains("hex color")),
            other => panic!("应返回校验错误: {other:?}"),
        }
    }
}
