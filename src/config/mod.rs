use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::BritexResult;

pub const DEFAULT_CONFIG_PATH: &str = "config/settings.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub parser: ParserConfig,
    pub validator: ValidatorConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

/// 标题识别与噪声过滤参数
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParserConfig {
    pub header_patterns: Vec<String>,
    pub min_title_len: usize,
    /// 纯文本来源的"仅标题行"使用更宽松的下限
    pub min_title_len_plain: usize,
    pub max_title_spaces: usize,
    /// 纯文本中不超过该长度的续行视为OCR碎片
    pub min_artifact_len: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidatorConfig {
    pub min_chars: usize,
    pub min_words: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    pub alto_dir_name: String,
    pub image_dir_name: String,
    pub image_extensions: Vec<String>,
    pub image_suffixes: Vec<String>,
    pub parallel: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub preview_chars: usize,
}

impl AppConfig {
    /// 默认值 < 配置文件 < BRITEX_ 环境变量
    pub fn load(path: Option<&Path>) -> BritexResult<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("BRITEX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn save(&self, path: &Path) -> BritexResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig {
                header_patterns: [
                    "ENCYCLOPAEDIA BRITANNICA",
                    "SEVENTH EDITION",
                    "DICTIONARY",
                    "VOLUME",
                    "SCIENCES",
                    "LITERATURE",
                    "DISSERTATIONS",
                    "SUPPLEMENT",
                    "GENERAL INDEX",
                    "ENGRAVINGS",
                    "EDINBURGH",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                min_title_len: 5,
                min_title_len_plain: 3,
                max_title_spaces: 10,
                min_artifact_len: 2,
            },
            validator: ValidatorConfig {
                min_chars: 20,
                min_words: 5,
            },
            scan: ScanConfig {
                alto_dir_name: "alto".to_string(),
                image_dir_name: "image".to_string(),
                image_extensions: [".jpg", ".jpeg", ".png", ".jp2"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                image_suffixes: [".3", ".34", ""].iter().map(|s| s.to_string()).collect(),
                parallel: true,
            },
            output: OutputConfig { preview_chars: 200 },
        }
    }
}
