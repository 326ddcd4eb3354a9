// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库，语言文件位于 locales/
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（如 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use showroom_import::i18n::t;
/// let msg = t("validation.name_required");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数，占位符形如 %{name}）
///
/// # 示例
/// ```no_run
/// use showroom_import::i18n::t_with_args;
/// let msg = t_with_args("upsert.already_exists", &[("name", "Kitchen Sink")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_simple() {
        assert_eq!(t("validation.name_required"), "Product name is required");
    }

    #[test]
    fn test_translate_with_args() {
        let msg = t_with_args("upsert.already_exists", &[("name", "Kitchen Sink")]);
        assert_eq!(msg, "Product \"Kitchen Sink\" already exists");

        let msg = t_with_args(
            "duplicates.found",
            &[("name", "Sink"), ("rows", "1, 2")],
        );
        assert_eq!(msg, "Duplicate product name \"Sink\" found in rows 1, 2");
    }

    #[test]
    fn test_default_locale_is_english() {
        assert_eq!(current_locale(), "en");
    }
}
