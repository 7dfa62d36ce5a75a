use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::ParserConfig;

/// 标题 + 逗号/句号 + 空白 + 正文
static SINGLE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][A-Z\s\-]*)[,.]\s+(\S.*)$").unwrap());
/// 整行只有大写标题，以逗号或句号结尾
static TITLE_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][A-Z\s\-,]*?)[.,]\s*$").unwrap());
/// OCR 把宽字母单独切成一个词: "A BBOT", "M, ..."
static SPLIT_INITIAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][ ,]").unwrap());
static UPPERCASE_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]{3,}").unwrap());

/// 标题行的两种形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleShape {
    SingleLine,
    TitleOnly,
}

/// 一行被识别为新词条时的提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    pub shape: TitleShape,
    pub title: String,
    /// 正文在原行中的字节偏移，仅标题行为行尾
    pub body_offset: usize,
}

/// 标题校验阈值
#[derive(Debug, Clone)]
pub struct TitleRules {
    pub min_len: usize,
    pub min_len_title_only: usize,
    pub max_spaces: usize,
}

impl TitleRules {
    pub fn alto(config: &ParserConfig) -> Self {
        Self {
            min_len: config.min_title_len,
            min_len_title_only: config.min_title_len,
            max_spaces: config.max_title_spaces,
        }
    }

    pub fn plain_text(config: &ParserConfig) -> Self {
        Self {
            min_len: config.min_title_len,
            min_len_title_only: config.min_title_len_plain,
            max_spaces: config.max_title_spaces,
        }
    }
}

impl Default for TitleRules {
    fn default() -> Self {
        Self {
            min_len: 5,
            min_len_title_only: 5,
            max_spaces: 10,
        }
    }
}

pub fn is_too_short(title: &str, min_len: usize) -> bool {
    title.chars().count() < min_len
}

pub fn starts_with_split_initial(title: &str) -> bool {
    SPLIT_INITIAL_RE.is_match(title)
}

pub fn is_single_char(title: &str) -> bool {
    title.chars().count() == 1
}

/// "M A G N E T I S M" 一类的字距伪影
pub fn has_excess_spaces(title: &str, max_spaces: usize) -> bool {
    title.chars().filter(|c| *c == ' ').count() > max_spaces
}

pub fn has_uppercase_word(title: &str) -> bool {
    UPPERCASE_WORD_RE.is_match(title)
}

/// 去掉标题尾部的逗号和句号
pub fn normalize_title(title: &str) -> String {
    title
        .trim()
        .trim_end_matches([',', '.'])
        .trim()
        .to_string()
}

/// 单行词条：返回 (标题, 正文偏移)
pub fn extract_single_line(line: &str) -> Option<(String, usize)> {
    let caps = SINGLE_LINE_RE.captures(line)?;
    let title = caps.get(1)?.as_str().trim().to_string();
    let body = caps.get(2)?;
    Some((title, body.start()))
}

/// 仅标题行：返回去掉尾部标点的标题
pub fn extract_title_only(line: &str) -> Option<String> {
    let caps = TITLE_ONLY_RE.captures(line)?;
    Some(normalize_title(caps.get(1)?.as_str()))
}

pub struct TitleClassifier {
    rules: TitleRules,
}

impl TitleClassifier {
    pub fn new(rules: TitleRules) -> Self {
        Self { rules }
    }

    /// 判断一行（已 trim）是否开启新词条
    pub fn classify(&self, line: &str) -> Option<TitleMatch> {
        if let Some((title, body_offset)) = extract_single_line(line) {
            if self.accepts(&title, self.rules.min_len) {
                return Some(TitleMatch {
                    shape: TitleShape::SingleLine,
                    title,
                    body_offset,
                });
            }
            debug!("单行词条标题未通过校验: {}", title);
        }

        if let Some(title) = extract_title_only(line) {
            if self.accepts(&title, self.rules.min_len_title_only) {
                return Some(TitleMatch {
                    shape: TitleShape::TitleOnly,
                    title,
                    body_offset: line.len(),
                });
            }
            debug!("标题行未通过校验: {}", title);
        }

        None
    }

    fn accepts(&self, title: &str, min_len: usize) -> bool {
        !is_too_short(title, min_len)
            && !starts_with_split_initial(title)
            && !is_single_char(title)
            && !has_excess_spaces(title, self.rules.max_spaces)
            && has_uppercase_word(title)
    }
}
