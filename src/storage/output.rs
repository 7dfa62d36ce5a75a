use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use super::models::{flatten, TextOnlyRecord};
use crate::parser::{DocumentRecord, SourceKind};
use crate::utils::{preview, BritexResult};

const BANNER_WIDTH: usize = 80;

#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub json: Option<PathBuf>,
    pub text_only: bool,
    pub flatten: bool,
    /// 每个文件最多的词条数，仅扁平化输出使用
    pub split: Option<usize>,
    pub preview_chars: usize,
}

impl OutputOptions {
    fn wants_json(&self) -> bool {
        self.json.is_some() || self.flatten || self.text_only
    }
}

/// 按选项输出解析结果：控制台文本、JSON 文件或分片 JSON 文件
pub fn emit(records: &[DocumentRecord], options: &OutputOptions) -> BritexResult<()> {
    if !options.wants_json() {
        print!("{}", render_console(records, options.preview_chars));
        return Ok(());
    }

    if options.flatten {
        let entries = flatten(records, options.text_only);
        return match (&options.json, options.split) {
            (Some(path), Some(chunk)) => {
                let written = write_split(path, &entries, chunk)?;
                println!("Wrote {} entries to {} file(s)", entries.len(), written.len());
                Ok(())
            }
            (Some(path), None) => {
                write_json(path, &entries)?;
                println!("Wrote {} entries to {}", entries.len(), path.display());
                Ok(())
            }
            (None, _) => print_json(&entries),
        };
    }

    if options.text_only {
        let filtered: Vec<TextOnlyRecord> = records.iter().map(TextOnlyRecord::from_record).collect();
        return write_or_print(options.json.as_deref(), &filtered, filtered.len());
    }

    write_or_print(options.json.as_deref(), &records, records.len())
}

fn write_or_print<T: Serialize + ?Sized>(path: Option<&Path>, value: &T, count: usize) -> BritexResult<()> {
    match path {
        Some(path) => {
            write_json(path, value)?;
            println!("Wrote {} result(s) to {}", count, path.display());
            Ok(())
        }
        None => print_json(value),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> BritexResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> BritexResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    info!("已写入: {}", path.display());
    Ok(())
}

/// out.json -> out_1.json, out_2.json, ...
pub fn split_path(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "entries".to_string());
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    base.with_file_name(name)
}

/// 每个文件最多 chunk_size 个元素，编号从 1 开始
pub fn write_split<T: Serialize>(base: &Path, items: &[T], chunk_size: usize) -> BritexResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (i, chunk) in items.chunks(chunk_size.max(1)).enumerate() {
        let path = split_path(base, i + 1);
        write_json(&path, chunk)?;
        written.push(path);
    }
    Ok(written)
}

pub fn render_console(records: &[DocumentRecord], preview_chars: usize) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let rule = "-".repeat(BANNER_WIDTH);
    let mut out = String::new();

    for record in records {
        let image = record.image_path.as_deref().unwrap_or("None");
        let _ = writeln!(out, "\n{}", banner);
        let _ = writeln!(out, "Source File: {}", record.source_path);
        let _ = writeln!(out, "Image File: {}", image);
        if let Some(id) = &record.collection_id {
            let _ = writeln!(out, "Collection: {}", id);
        }
        let _ = writeln!(out, "Number of entries: {}", record.entries.len());
        let _ = writeln!(out, "{}\n", banner);

        for entry in &record.entries {
            let _ = writeln!(out, "Title: {}", entry.title);
            let _ = writeln!(out, "Text: {}", preview(&entry.text, preview_chars));
            if record.source_kind == SourceKind::Alto {
                let _ = writeln!(out, "Image: {}", image);
            }
            let _ = writeln!(out, "{}\n", rule);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Entry;
    use crate::storage::models::FlatEntry;

    fn record(id: Option<&str>, entries: Vec<Entry>) -> DocumentRecord {
        DocumentRecord {
            source_path: "vol1/alto/1.xml".to_string(),
            source_kind: SourceKind::Alto,
            image_path: None,
            image_path_xml: None,
            collection_id: id.map(str::to_string),
            entries,
        }
    }

    #[test]
    fn split_paths_are_numbered_from_one() {
        assert_eq!(split_path(Path::new("out/entries.json"), 1), PathBuf::from("out/entries_1.json"));
        assert_eq!(split_path(Path::new("dump"), 3), PathBuf::from("dump_3"));
    }

    #[test]
    fn write_split_respects_chunk_size() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("entries.json");
        let items: Vec<u32> = (0..5).collect();

        let written = write_split(&base, &items, 2).unwrap();
        assert_eq!(
            written,
            vec![
                dir.path().join("entries_1.json"),
                dir.path().join("entries_2.json"),
                dir.path().join("entries_3.json"),
            ]
        );
        let last: Vec<u32> =
            serde_json::from_str(&std::fs::read_to_string(&written[2]).unwrap()).unwrap();
        assert_eq!(last, vec![4]);
    }

    #[test]
    fn flatten_annotates_collection_id() {
        let records = vec![
            record(Some("144133901"), vec![Entry::segmented("ALGEBRA", "ALGEBRA, a science.")]),
            record(None, vec![Entry::fallback("loose text")]),
        ];

        let flat = flatten(&records, true);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].collection_id.as_deref(), Some("144133901"));
        assert!(flat[0].confidence.is_none());
        assert!(flat[1].collection_id.is_none());

        let json = serde_json::to_value(&flat[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "ALGEBRA", "text": "ALGEBRA, a science.", "collection_id": "144133901"})
        );

        let full: Vec<FlatEntry> = flatten(&records, false);
        assert_eq!(full[1].source_path.as_deref(), Some("vol1/alto/1.xml"));
        assert_eq!(
            serde_json::to_value(&full[1]).unwrap()["confidence"],
            serde_json::json!("fallback")
        );
    }

    #[test]
    fn flattened_split_output_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("flat.json");
        let records = vec![record(
            Some("7"),
            vec![
                Entry::segmented("ABBEY", "ABBEY, a monastery."),
                Entry::segmented("ABBOT", "ABBOT, its head."),
                Entry::segmented("ACADEMY", "ACADEMY, a society."),
            ],
        )];
        let options = OutputOptions {
            json: Some(base.clone()),
            flatten: true,
            split: Some(2),
            ..Default::default()
        };

        emit(&records, &options).unwrap();

        let first: Vec<FlatEntry> =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("flat_1.json")).unwrap()).unwrap();
        let second: Vec<FlatEntry> =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("flat_2.json")).unwrap()).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "ACADEMY");
        assert!(!base.exists());
    }

    #[test]
    fn text_only_keeps_collection_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let records = vec![record(Some("42"), vec![Entry::segmented("ANGLE", "ANGLE, a corner.")])];
        let options = OutputOptions {
            json: Some(path.clone()),
            text_only: true,
            ..Default::default()
        };

        emit(&records, &options).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "entries": [{"title": "ANGLE", "text": "ANGLE, a corner."}],
                "collection_id": "42"
            }])
        );
    }

    #[test]
    fn console_output_previews_long_text() {
        let long = format!("ALGEBRA, {}", "x".repeat(300));
        let out = render_console(&[record(None, vec![Entry::segmented("ALGEBRA", long)])], 200);
        assert!(out.contains("Source File: vol1/alto/1.xml"));
        assert!(out.contains("Number of entries: 1"));
        assert!(out.contains("Title: ALGEBRA"));
        let text_line = out.lines().find(|l| l.starts_with("Text: ")).unwrap();
        assert_eq!(text_line.chars().count(), "Text: ".len() + 200 + 3);
        assert!(text_line.ends_with("..."));
    }

    #[test]
    fn console_lists_image_per_alto_entry() {
        let mut alto = record(
            Some("7"),
            vec![
                Entry::segmented("ABBEY", "ABBEY, a monastery."),
                Entry::segmented("ABBOT", "ABBOT, its head."),
            ],
        );
        alto.image_path = Some("7/image/1.3.jpg".to_string());
        let out = render_console(&[alto], 200);
        assert!(out.contains("Image File: 7/image/1.3.jpg"));
        assert!(out.contains("Collection: 7"));
        assert!(out.contains("Number of entries: 2"));
        assert_eq!(out.matches("Image: 7/image/1.3.jpg").count(), 2);

        let mut text = record(None, vec![Entry::segmented("ANGLE", "ANGLE, a corner.")]);
        text.source_kind = SourceKind::PlainText;
        let out = render_console(&[text], 200);
        assert!(out.contains("Image File: None"));
        assert!(!out.contains("Image: "));
    }
}
