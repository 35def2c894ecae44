/// 由显示名称生成 slug
///
/// 规则：转小写并去除首尾空白，丢弃字母数字、空白、`_`、`-` 以外的字符，
/// 连续的空白、`_`、`-` 合并为一个 `-`，最后去掉首尾的 `-`。
/// 只保留 ASCII 字母数字，保证结果可直接放进 URL。
pub fn slugify(text: impl AsRef<str>) -> String {
    let mut slug = String::with_capacity(text.as_ref().len());

    for c in text.as_ref().trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if (c.is_whitespace() || c == '_' || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.trim_matches('-').to_string()
}

/// 冲突时使用的 slug：追加 6 位随机十六进制后缀
///
/// `base` 为空时（例如标题全是符号）只使用后缀。
pub fn suffixed(base: &str) -> String {
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..6];
    if base.is_empty() {
        suffix.to_string()
    } else {
        format!("{base}-{suffix}")
    }
}
