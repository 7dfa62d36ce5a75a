use crate::config::ParserConfig;

/// 版权页、卷标、索引页眉等固定短语，区分大小写的子串匹配
pub struct HeaderFilter {
    patterns: Vec<String>,
}

impl HeaderFilter {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.header_patterns.clone())
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| line.contains(p.as_str()))
    }

    /// 按原顺序保留非噪声行
    pub fn filter<'a>(&'a self, lines: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        lines
            .iter()
            .map(String::as_str)
            .filter(move |line| !self.is_noise(line))
    }
}
