use glob::{glob, Pattern};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::parser::SourceKind;
use crate::utils::{BritexError, BritexResult};

/// 馆藏中的一个编号目录: <base>/<ID>/{alto,image}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionDir {
    pub id: String,
    pub path: String,
    pub alto_dir: Option<String>,
    pub image_dir: Option<String>,
    pub xml_count: usize,
    pub image_count: usize,
}

/// 列出 base 下所有纯数字命名的子目录，按编号排序
pub fn scan_collection(base: &Path, scan: &ScanConfig) -> BritexResult<Vec<CollectionDir>> {
    if !base.is_dir() {
        return Err(BritexError::InvalidPath(base.display().to_string()));
    }

    let mut dirs = Vec::new();
    for item in std::fs::read_dir(base)? {
        let path = item?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_dir() || !is_collection_id(name) {
            continue;
        }

        let alto_dir = path.join(&scan.alto_dir_name);
        let image_dir = path.join(&scan.image_dir_name);
        let alto_dir = alto_dir.is_dir().then_some(alto_dir);
        let image_dir = image_dir.is_dir().then_some(image_dir);

        let xml_count = match &alto_dir {
            Some(dir) => count_matches(dir, "*.xml")?,
            None => 0,
        };
        let image_count = match &image_dir {
            Some(dir) => count_matches(dir, "*.*")?,
            None => 0,
        };

        dirs.push(CollectionDir {
            id: name.to_string(),
            path: path.display().to_string(),
            alto_dir: alto_dir.map(|d| d.display().to_string()),
            image_dir: image_dir.map(|d| d.display().to_string()),
            xml_count,
            image_count,
        });
    }

    dirs.sort_by(|a, b| a.id.cmp(&b.id));
    info!("发现 {} 个编号目录", dirs.len());
    Ok(dirs)
}

/// 文件直接返回；目录按扩展名匹配，结果排序以保证输出稳定
pub fn discover(path: &Path, kinds: &[SourceKind], recursive: bool) -> BritexResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(BritexError::InvalidPath(path.display().to_string()));
    }

    let prefix = if recursive { "**/" } else { "" };
    let mut files = Vec::new();
    for kind in kinds {
        let pattern = format!("{}*.{}", prefix, kind.extension());
        files.extend(glob_files(path, &pattern)?);
    }

    files.sort();
    files.dedup();
    debug!("{} 下匹配到 {} 个文件", path.display(), files.len());
    Ok(files)
}

/// `<ID>/alto/page.xml` 中的 ID
pub fn collection_id_for(path: &Path, alto_dir_name: &str) -> Option<String> {
    let parent = path.parent()?;
    if parent.file_name()?.to_str()? != alto_dir_name {
        return None;
    }
    let id = parent.parent()?.file_name()?.to_str()?;
    is_collection_id(id).then(|| id.to_string())
}

fn is_collection_id(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_digit())
}

fn glob_files(dir: &Path, pattern: &str) -> BritexResult<Vec<PathBuf>> {
    let full = format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), pattern);
    let mut files = Vec::new();
    for entry in glob(&full)? {
        match entry {
            Ok(p) if p.is_file() => files.push(p),
            Ok(_) => {}
            Err(e) => warn!("无法读取目录项: {}", e),
        }
    }
    Ok(files)
}

fn count_matches(dir: &Path, pattern: &str) -> BritexResult<usize> {
    Ok(glob_files(dir, pattern)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn scan_lists_numeric_dirs_sorted() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("200/alto/a.xml"));
        touch(&root.path().join("200/alto/b.xml"));
        touch(&root.path().join("200/image/a.3.jpg"));
        touch(&root.path().join("100/alto/c.xml"));
        touch(&root.path().join("notes/alto/d.xml"));
        touch(&root.path().join("300/readme.txt"));

        let dirs = scan_collection(root.path(), &AppConfig::default().scan).unwrap();
        let ids: Vec<&str> = dirs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["100", "200", "300"]);

        assert_eq!(dirs[0].xml_count, 1);
        assert!(dirs[0].image_dir.is_none());
        assert_eq!(dirs[1].xml_count, 2);
        assert_eq!(dirs[1].image_count, 1);
        assert!(dirs[2].alto_dir.is_none());
        assert_eq!(dirs[2].xml_count, 0);

        let json = serde_json::to_value(&dirs[0]).unwrap();
        assert_eq!(json["id"], "100");
        assert_eq!(json["xml_count"], 1);
        assert!(json["image_dir"].is_null());
    }

    #[test]
    fn discover_recurses_in_sorted_order() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("b/2.xml"));
        touch(&root.path().join("a/1.xml"));
        touch(&root.path().join("top.xml"));
        touch(&root.path().join("a/notes.txt"));

        let files = discover(root.path(), &[SourceKind::Alto], true).unwrap();
        assert_eq!(
            files,
            vec![
                root.path().join("a/1.xml"),
                root.path().join("b/2.xml"),
                root.path().join("top.xml"),
            ]
        );

        let shallow = discover(root.path(), &[SourceKind::Alto], false).unwrap();
        assert_eq!(shallow, vec![root.path().join("top.xml")]);

        let both = discover(root.path(), &[SourceKind::Alto, SourceKind::PlainText], true).unwrap();
        assert_eq!(both.len(), 4);
    }

    #[test]
    fn discover_single_file() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("page.txt");
        touch(&file);
        assert_eq!(discover(&file, &[SourceKind::Alto], true).unwrap(), vec![file]);
    }

    #[test]
    fn invalid_path_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("missing");
        assert!(matches!(
            discover(&missing, &[SourceKind::Alto], true),
            Err(BritexError::InvalidPath(_))
        ));
    }

    #[test]
    fn collection_id_from_layout() {
        assert_eq!(
            collection_id_for(Path::new("/data/144133901/alto/188084090.34.xml"), "alto"),
            Some("144133901".to_string())
        );
        assert_eq!(collection_id_for(Path::new("/data/misc/alto/x.xml"), "alto"), None);
        assert_eq!(collection_id_for(Path::new("/data/144133901/x.xml"), "alto"), None);
    }
}
