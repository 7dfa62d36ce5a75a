use serde::{Deserialize, Serialize};

use crate::parser::{Confidence, DocumentRecord};

/// 扁平化输出中的一条记录；text-only 模式下只保留标题、正文和馆藏编号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub collection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_path: Option<String>,
}

/// text-only 模式下的文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOnlyRecord {
    pub entries: Vec<FlatEntry>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub collection_id: Option<String>,
}

impl TextOnlyRecord {
    pub fn from_record(record: &DocumentRecord) -> Self {
        Self {
            entries: record
                .entries
                .iter()
                .map(|e| FlatEntry {
                    title: e.title.clone(),
                    text: e.text.clone(),
                    collection_id: None,
                    confidence: None,
                    source_path: None,
                })
                .collect(),
            collection_id: record.collection_id.clone(),
        }
    }
}

/// 去掉文档层级，每个词条带上馆藏编号
pub fn flatten(records: &[DocumentRecord], text_only: bool) -> Vec<FlatEntry> {
    records
        .iter()
        .flat_map(|record| {
            record.entries.iter().map(move |e| FlatEntry {
                title: e.title.clone(),
                text: e.text.clone(),
                collection_id: record.collection_id.clone(),
                confidence: (!text_only).then_some(e.confidence),
                source_path: (!text_only).then(|| record.source_path.clone()),
            })
        })
        .collect()
}
