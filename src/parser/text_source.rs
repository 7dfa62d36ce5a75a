use std::path::Path;
use tracing::info;

use crate::utils::BritexResult;

pub struct TextSource;

impl TextSource {
    pub fn new() -> Self {
        Self
    }

    /// 逐行读取并去掉行尾空白，非法 UTF-8 按替换字符处理
    pub fn read(&self, path: &Path) -> BritexResult<Vec<String>> {
        info!("读取文本: {}", path.display());
        let bytes = std::fs::read(path)?;
        let lines = split_lines(&String::from_utf8_lossy(&bytes));
        info!("读取 {} 行文本", lines.len());
        Ok(lines)
    }
}

pub fn split_lines(content: &str) -> Vec<String> {
    content.lines().map(|l| l.trim_end().to_string()).collect()
}
