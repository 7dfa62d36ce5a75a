pub mod logger;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BritexError {
    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML解析错误: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML序列化错误: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("匹配模式错误: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("路径既不是文件也不是目录: {0}")]
    InvalidPath(String),
}

pub type BritexResult<T> = Result<T, BritexError>;

/// 按字符截断，超出部分以 "..." 结尾
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("ALGEBRA", 200), "ALGEBRA");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("ÆTNA, a mountain", 4), "ÆTNA...");
    }
}
