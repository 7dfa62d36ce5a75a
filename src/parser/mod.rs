pub mod alto_source;
pub mod entry_validator;
pub mod header_filter;
pub mod image_locator;
pub mod merger;
pub mod segmenter;
pub mod text_source;
pub mod title_classifier;

pub use alto_source::AltoSource;
pub use header_filter::HeaderFilter;
pub use image_locator::ImageLocator;
pub use merger::DuplicateMerger;
pub use segmenter::Segmenter;
pub use text_source::TextSource;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::crawler::collection_id_for;
use crate::utils::BritexResult;

/// 输入格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Alto,
    PlainText,
}

impl SourceKind {
    pub fn extension(self) -> &'static str {
        match self {
            SourceKind::Alto => "xml",
            SourceKind::PlainText => "txt",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("xml") {
            Some(SourceKind::Alto)
        } else if ext.eq_ignore_ascii_case("txt") {
            Some(SourceKind::PlainText)
        } else {
            None
        }
    }
}

/// 词条来源：正常切分，或整篇兜底
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Segmented,
    Fallback,
}

/// 百科词条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    pub text: String,
    pub confidence: Confidence,
}

impl Entry {
    pub fn segmented(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            confidence: Confidence::Segmented,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            title: "Unknown".to_string(),
            text: text.into(),
            confidence: Confidence::Fallback,
        }
    }
}

/// 单个文档的解析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub source_path: String,
    pub source_kind: SourceKind,
    /// 本地找到的图像文件
    pub image_path: Option<String>,
    /// ALTO 元数据中记录的图像路径
    pub image_path_xml: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub collection_id: Option<String>,
    pub entries: Vec<Entry>,
}

/// 统一提取管道：读行 -> 过滤 -> 切分/校验 -> 兜底 -> 合并 -> 组装
pub struct EntryPipeline {
    alto_source: AltoSource,
    text_source: TextSource,
    header_filter: HeaderFilter,
    alto_segmenter: Segmenter,
    text_segmenter: Segmenter,
    merger: DuplicateMerger,
    image_locator: ImageLocator,
    alto_dir_name: String,
    min_artifact_len: usize,
}

impl EntryPipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            alto_source: AltoSource::new(),
            text_source: TextSource::new(),
            header_filter: HeaderFilter::from_config(&config.parser),
            alto_segmenter: Segmenter::new(SourceKind::Alto, config),
            text_segmenter: Segmenter::new(SourceKind::PlainText, config),
            merger: DuplicateMerger::new(),
            image_locator: ImageLocator::new(&config.scan),
            alto_dir_name: config.scan.alto_dir_name.clone(),
            min_artifact_len: config.parser.min_artifact_len,
        }
    }

    /// 解析一个文档文件
    pub fn process(&self, path: &Path, kind: SourceKind) -> BritexResult<DocumentRecord> {
        info!("开始提取管道: {}", path.display());

        let (lines, image_path_xml, image_path) = match kind {
            SourceKind::Alto => {
                let page = self.alto_source.read(path)?;
                let image = self.image_locator.find(path);
                (page.lines, page.file_name, image)
            }
            SourceKind::PlainText => (self.text_source.read(path)?, None, None),
        };

        let entries = self.extract_entries(&lines, kind);
        info!("提取到 {} 个词条", entries.len());

        Ok(DocumentRecord {
            source_path: path.display().to_string(),
            source_kind: kind,
            image_path: image_path.map(|p| p.display().to_string()),
            image_path_xml,
            collection_id: collection_id_for(path, &self.alto_dir_name),
            entries,
        })
    }

    /// 不涉及文件 IO 的核心部分
    pub fn extract_entries(&self, lines: &[String], kind: SourceKind) -> Vec<Entry> {
        let segmenter = match kind {
            SourceKind::Alto => &self.alto_segmenter,
            SourceKind::PlainText => &self.text_segmenter,
        };

        let mut entries = segmenter.segment(self.header_filter.filter(lines));

        if entries.is_empty() {
            match segmenter::fallback_entry(lines, self.min_artifact_len) {
                Some(entry) => {
                    warn!("未识别出词条，整篇作为 Unknown 处理");
                    entries.push(entry);
                }
                None => warn!("文档没有可用文本"),
            }
        }

        self.merger.merge(entries)
    }
}
