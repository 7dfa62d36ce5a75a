mod config;
mod crawler;
mod parser;
mod storage;
mod utils;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::parser::{DocumentRecord, EntryPipeline, SourceKind};
use crate::storage::OutputOptions;
use crate::utils::logger;

#[derive(Parser)]
#[command(name = "britex")]
#[command(about = "从百科全书扫描页 OCR 结果中提取词条", long_about = None)]
struct Cli {
    /// 配置文件路径 (默认 config/settings.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 生成默认配置文件
    Init,
    /// 解析单个文件或目录
    Parse {
        /// ALTO XML / 纯文本文件，或包含它们的目录
        path: PathBuf,
        /// 输入格式，auto 按扩展名判断
        #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
        format: InputFormat,
        /// 只匹配目录第一层
        #[arg(long)]
        no_recursive: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// 解析馆藏目录下全部 <ID>/alto/*.xml
    Collection {
        base: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// 列出馆藏编号目录
    Scan {
        base: PathBuf,
        /// 以 JSON 输出目录清单，可选写入文件
        #[arg(short, long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
        json: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    Auto,
    Alto,
    Text,
}

#[derive(Args)]
struct OutputArgs {
    /// 写入 JSON 文件而不是打印到控制台
    #[arg(short, long, value_name = "FILE")]
    json: Option<PathBuf>,
    /// 每个词条只保留标题和正文
    #[arg(long)]
    text_only: bool,
    /// 去掉文档层级，输出一个词条数组
    #[arg(long)]
    flatten: bool,
    /// 扁平化输出按每 N 个词条拆分成多个文件
    #[arg(long, value_name = "N", requires = "flatten", requires = "json", value_parser = parse_split)]
    split: Option<usize>,
}

impl OutputArgs {
    fn into_options(self, app_config: &AppConfig) -> OutputOptions {
        OutputOptions {
            json: self.json,
            text_only: self.text_only,
            flatten: self.flatten,
            split: self.split,
            preview_chars: app_config.output.preview_chars,
        }
    }
}

fn parse_split(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("拆分大小必须是正整数: {}", s)),
    }
}

fn main() -> Result<()> {
    logger::init_logger();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init => {
            init_command(config_path)?;
        }
        Commands::Parse {
            path,
            format,
            no_recursive,
            output,
        } => {
            let app_config = AppConfig::load(config_path)?;
            parse_command(&app_config, &path, format, !no_recursive, output)?;
        }
        Commands::Collection { base, output } => {
            let app_config = AppConfig::load(config_path)?;
            collection_command(&app_config, &base, output)?;
        }
        Commands::Scan { base, json } => {
            let app_config = AppConfig::load(config_path)?;
            scan_command(&app_config, &base, json.as_deref())?;
        }
    }

    Ok(())
}

fn init_command(config_path: Option<&Path>) -> Result<()> {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    AppConfig::default().save(path)?;
    info!("已生成配置文件: {}", path.display());
    Ok(())
}

fn parse_command(
    app_config: &AppConfig,
    path: &Path,
    format: InputFormat,
    recursive: bool,
    output: OutputArgs,
) -> Result<()> {
    let kinds = match format {
        InputFormat::Auto => vec![SourceKind::Alto, SourceKind::PlainText],
        InputFormat::Alto => vec![SourceKind::Alto],
        InputFormat::Text => vec![SourceKind::PlainText],
    };

    let files = crawler::discover(path, &kinds, recursive)?;
    let mut jobs = Vec::with_capacity(files.len());
    for file in files {
        let kind = match format {
            InputFormat::Alto => SourceKind::Alto,
            InputFormat::Text => SourceKind::PlainText,
            InputFormat::Auto => match SourceKind::from_path(&file) {
                Some(kind) => kind,
                None => bail!("无法从扩展名判断格式，请使用 --format: {}", file.display()),
            },
        };
        jobs.push((file, kind));
    }
    info!("共 {} 个待解析文件", jobs.len());

    let pipeline = EntryPipeline::new(app_config);
    let records = parse_files(&pipeline, &jobs, app_config.scan.parallel);
    info!("成功解析 {}/{} 个文件", records.len(), jobs.len());

    storage::emit(&records, &output.into_options(app_config))?;
    Ok(())
}

fn collection_command(app_config: &AppConfig, base: &Path, output: OutputArgs) -> Result<()> {
    let records = parse_collection(app_config, base)?;
    storage::emit(&records, &output.into_options(app_config))?;
    Ok(())
}

/// 逐个编号目录解析 alto/*.xml，记录打上目录编号
fn parse_collection(app_config: &AppConfig, base: &Path) -> Result<Vec<DocumentRecord>> {
    let dirs = crawler::scan_collection(base, &app_config.scan)?;
    let total_xml: usize = dirs.iter().map(|d| d.xml_count).sum();
    info!("发现 {} 个编号目录, 共 {} 个 XML 文件", dirs.len(), total_xml);

    let pipeline = EntryPipeline::new(app_config);
    let mut records = Vec::new();

    for dir in &dirs {
        let Some(alto_dir) = &dir.alto_dir else {
            continue;
        };
        info!("解析编号 {}: {} 个文件", dir.id, dir.xml_count);

        let files = crawler::discover(Path::new(alto_dir), &[SourceKind::Alto], false)?;
        let jobs: Vec<(PathBuf, SourceKind)> =
            files.into_iter().map(|f| (f, SourceKind::Alto)).collect();

        for mut record in parse_files(&pipeline, &jobs, app_config.scan.parallel) {
            record.collection_id = Some(dir.id.clone());
            records.push(record);
        }
    }

    Ok(records)
}

fn scan_command(app_config: &AppConfig, base: &Path, json: Option<&Path>) -> Result<()> {
    let dirs = crawler::scan_collection(base, &app_config.scan)?;

    match json {
        Some(path) if path == Path::new("-") => {
            storage::output::print_json(&dirs)?;
            return Ok(());
        }
        Some(path) => {
            storage::output::write_json(path, &dirs)?;
            println!("Wrote {} directories to {}", dirs.len(), path.display());
            return Ok(());
        }
        None => {}
    }

    if dirs.is_empty() {
        println!("No collection directories found.");
        return Ok(());
    }

    println!("{:<16} | {:>6} | {:>6} | {}", "ID", "XML", "Images", "Path");
    println!("{}", "-".repeat(60));
    for d in &dirs {
        println!("{:<16} | {:>6} | {:>6} | {}", d.id, d.xml_count, d.image_count, d.path);
    }
    let total_xml: usize = dirs.iter().map(|d| d.xml_count).sum();
    println!("\n{} directories, {} XML files", dirs.len(), total_xml);
    Ok(())
}

/// 单个文档失败只记录警告，不影响其余文档
fn parse_files(
    pipeline: &EntryPipeline,
    jobs: &[(PathBuf, SourceKind)],
    parallel: bool,
) -> Vec<DocumentRecord> {
    let parse_one = |(path, kind): &(PathBuf, SourceKind)| match pipeline.process(path, *kind) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("解析失败 {}: {}", path.display(), e);
            None
        }
    };

    if parallel {
        jobs.par_iter().filter_map(parse_one).collect()
    } else {
        jobs.iter().filter_map(parse_one).collect()
    }
}
