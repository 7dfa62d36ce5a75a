use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ScanConfig;

/// 按目录约定查找页面图像: <ID>/alto/<base>.xx.xml -> <ID>/image/<base><suffix><ext>
pub struct ImageLocator {
    image_dir_name: String,
    extensions: Vec<String>,
    suffixes: Vec<String>,
}

impl ImageLocator {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            image_dir_name: config.image_dir_name.clone(),
            extensions: config.image_extensions.clone(),
            suffixes: config.image_suffixes.clone(),
        }
    }

    pub fn find(&self, xml_path: &Path) -> Option<PathBuf> {
        let stem = xml_path.file_stem()?.to_str()?;
        // 188084090.34 -> 188084090
        let base = stem.split('.').next()?;
        let image_dir = xml_path.parent()?.parent()?.join(&self.image_dir_name);

        if !image_dir.is_dir() {
            debug!("图像目录不存在: {}", image_dir.display());
            return None;
        }

        for ext in &self.extensions {
            for suffix in &self.suffixes {
                let candidate = image_dir.join(format!("{}{}{}", base, suffix, ext));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        debug!("未找到图像: {}", base);
        None
    }
}
