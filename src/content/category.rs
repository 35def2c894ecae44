use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// 文章分类
///
/// 固定的四种分类，数据库中以 snake_case 字符串保存。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    NewFeature,
    #[default]
    Improvement,
    Bugfix,
    Announcement,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::NewFeature,
        Category::Improvement,
        Category::Bugfix,
        Category::Announcement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::NewFeature => "new_feature",
            Category::Improvement => "improvement",
            Category::Bugfix => "bugfix",
            Category::Announcement => "announcement",
        }
    }

    /// 展示用名称
    pub fn label(&self) -> &'static str {
        match self {
            Category::NewFeature => "New Feature",
            Category::Improvement => "Improvement",
            Category::Bugfix => "Bug Fix",
            Category::Announcement => "Announcement",
        }
    }

    /// 页面徽标颜色
    pub fn color(&self) -> &'static str {
        match self {
            Category::NewFeature => "emerald",
            Category::Improvement => "blue",
            Category::Bugfix => "red",
            Category::Announcement => "purple",
        }
    }

    /// 严格解析，未知值返回 `None`
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    /// 宽松解析，未知值回退为 [`Category::Improvement`]
    ///
    /// 表单提交使用此策略，编程接口使用 [`Category::parse`] 并拒绝未知值。
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// 所有合法取值，以逗号分隔
    pub fn allowed() -> String {
        Self::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownCategory;

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(UnknownCategory)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse(" bugfix "), Some(Category::Bugfix));
    }

    #[test]
    fn test_parse_unknown_value() {
        assert_eq!(Category::parse("not_a_real_category"), None);
        assert_eq!(Category::parse("Bugfix"), None, "大小写敏感");
    }

    #[test]
    fn test_parse_or_default_coerces() {
        assert_eq!(
            Category::parse_or_default("not_a_real_category"),
            Category::Improvement
        );
        assert_eq!(Category::parse_or_default("announcement"), Category::Announcement);
    }

    #[test]
    fn test_allowed_lists_all() {
        assert_eq!(
            Category::allowed(),
            "new_feature, improvement, bugfix, announcement"
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(Category::Bugfix.label(), "Bug Fix");
        assert_eq!(Category::NewFeature.to_string(), "new_feature");
    }
}
