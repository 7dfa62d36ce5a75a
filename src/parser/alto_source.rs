use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use tracing::{debug, info};

use crate::utils::BritexResult;

/// 一页 ALTO 中提取出的文本行和图像文件名
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AltoPage {
    pub lines: Vec<String>,
    /// `<fileName>` 里记录的原始扫描图像路径
    pub file_name: Option<String>,
}

pub struct AltoSource;

impl AltoSource {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> BritexResult<AltoPage> {
        info!("解析ALTO: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let page = self.parse_str(&content)?;
        info!("提取 {} 行文本", page.lines.len());
        Ok(page)
    }

    /// 每个 TextLine 的 String@CONTENT 按文档顺序以空格拼接；
    /// 按本地名匹配，忽略 ALTO 命名空间版本
    pub fn parse_str(&self, content: &str) -> BritexResult<AltoPage> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);

        let mut page = AltoPage::default();
        let mut buf = Vec::new();
        let mut words: Option<Vec<String>> = None;
        let mut in_file_name = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"TextLine" => words = Some(Vec::new()),
                    b"String" => push_content(&e, &mut words)?,
                    b"fileName" => in_file_name = true,
                    _ => {}
                },
                // 空的 <TextLine/> 不产生文本行
                Event::Empty(e) if e.local_name().as_ref() == b"String" => {
                    push_content(&e, &mut words)?
                }
                Event::Text(e) if in_file_name => {
                    let name = e.unescape()?.trim().to_string();
                    if !name.is_empty() {
                        page.file_name = Some(name);
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"TextLine" => {
                        if let Some(line_words) = words.take() {
                            if !line_words.is_empty() {
                                page.lines.push(line_words.join(" "));
                            }
                        }
                    }
                    b"fileName" => in_file_name = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        debug!("ALTO fileName: {:?}", page.file_name);
        Ok(page)
    }
}

fn push_content(e: &BytesStart, words: &mut Option<Vec<String>>) -> BritexResult<()> {
    let Some(words) = words.as_mut() else {
        return Ok(());
    };
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == b"CONTENT" {
            let value = attr.unescape_value()?;
            if !value.is_empty() {
                words.push(value.into_owned());
            }
        }
    }
    Ok(())
}
