use tracing::debug;

use super::entry_validator::EntryValidator;
use super::title_classifier::{TitleClassifier, TitleMatch, TitleRules};
use super::{Entry, SourceKind};
use crate::config::AppConfig;

/// 正在累积的词条
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub title: String,
    /// 以开启词条的那一行开头，后续行以单个空格拼接
    pub text: String,
    body_start: usize,
}

impl Span {
    fn open(line: &str, title_match: TitleMatch) -> Self {
        Self {
            title: title_match.title,
            text: line.to_string(),
            body_start: title_match.body_offset,
        }
    }

    fn append(&mut self, line: &str) {
        self.text.push(' ');
        self.text.push_str(line);
    }

    /// 标题行之后的正文
    pub fn body(&self) -> &str {
        self.text[self.body_start..].trim()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SpanState {
    #[default]
    NoOpenEntry,
    OpenEntry(Span),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentState {
    pub span: SpanState,
    /// 纯文本来源在第一个标题出现前为 true，期间的行全部丢弃
    pub pre_content: bool,
}

impl SegmentState {
    pub fn initial(kind: SourceKind) -> Self {
        Self {
            span: SpanState::NoOpenEntry,
            pre_content: kind == SourceKind::PlainText,
        }
    }
}

/// 逐行分段的状态机，单遍扫描，无前瞻
pub struct Segmenter {
    kind: SourceKind,
    classifier: TitleClassifier,
    /// 仅纯文本来源做最小内容校验
    validator: Option<EntryValidator>,
    min_artifact_len: usize,
}

impl Segmenter {
    pub fn new(kind: SourceKind, config: &AppConfig) -> Self {
        match kind {
            SourceKind::Alto => Self {
                kind,
                classifier: TitleClassifier::new(TitleRules::alto(&config.parser)),
                validator: None,
                min_artifact_len: 0,
            },
            SourceKind::PlainText => Self {
                kind,
                classifier: TitleClassifier::new(TitleRules::plain_text(&config.parser)),
                validator: Some(EntryValidator::new(&config.validator)),
                min_artifact_len: config.parser.min_artifact_len,
            },
        }
    }

    /// 状态转移：(状态, 行) -> (新状态, 关闭的词条)
    pub fn step(&self, state: SegmentState, line: &str) -> (SegmentState, Option<Entry>) {
        let line = line.trim();
        if line.is_empty() {
            return (state, None);
        }

        let SegmentState { span, pre_content } = state;

        if let Some(title_match) = self.classifier.classify(line) {
            debug!("新词条 {:?}: {}", title_match.shape, title_match.title);
            let emitted = match span {
                SpanState::OpenEntry(open) => self.close(open),
                SpanState::NoOpenEntry => None,
            };
            let next = SegmentState {
                span: SpanState::OpenEntry(Span::open(line, title_match)),
                pre_content: false,
            };
            return (next, emitted);
        }

        match span {
            SpanState::OpenEntry(mut open) => {
                if line.chars().count() > self.min_artifact_len {
                    open.append(line);
                } else {
                    debug!("跳过碎片行: {}", line);
                }
                (
                    SegmentState {
                        span: SpanState::OpenEntry(open),
                        pre_content,
                    },
                    None,
                )
            }
            SpanState::NoOpenEntry => {
                if pre_content {
                    debug!("正文开始前的行: {}", line);
                } else {
                    debug!("无打开词条，丢弃: {}", line);
                }
                (
                    SegmentState {
                        span: SpanState::NoOpenEntry,
                        pre_content,
                    },
                    None,
                )
            }
        }
    }

    /// 文档结束时关闭最后一个词条
    pub fn finish(&self, state: SegmentState) -> Option<Entry> {
        match state.span {
            SpanState::OpenEntry(open) => self.close(open),
            SpanState::NoOpenEntry => None,
        }
    }

    pub fn segment<'a, I>(&self, lines: I) -> Vec<Entry>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = SegmentState::initial(self.kind);
        let mut entries = Vec::new();

        for line in lines {
            let (next, emitted) = self.step(state, line);
            state = next;
            entries.extend(emitted);
        }
        entries.extend(self.finish(state));

        entries
    }

    fn close(&self, span: Span) -> Option<Entry> {
        let body = span.body();
        if body.is_empty() {
            debug!("丢弃空词条: {}", span.title);
            return None;
        }
        if let Some(validator) = &self.validator {
            if !validator.is_valid(body) {
                debug!("词条未通过内容校验: {}", span.title);
                return None;
            }
        }
        Some(Entry::segmented(span.title, span.text))
    }
}

/// 没有切分出任何词条时，把全部非碎片行合成一个 "Unknown" 词条
pub fn fallback_entry(raw_lines: &[String], min_artifact_len: usize) -> Option<Entry> {
    let content: Vec<&str> = raw_lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| l.chars().count() > min_artifact_len)
        .collect();

    if content.is_empty() {
        return None;
    }
    Some(Entry::fallback(content.join(" ")))
}
