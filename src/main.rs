//! Comic Reader：按「章节文件夹 → 页面文件」两级结构分页浏览漫画。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志/阅读进度持久化等基础设施
//! - `library`：数据源列举、章节与页面排序、页面索引构建、页码导航
//! - `web`：axum 服务、页面模板与本地图片的静态服务
//!
//! 启动顺序：日志 → 配置（文件 + 环境变量 + 命令行）→ 构建页面索引（阻塞）→ 启动 Web 服务。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{info, warn};

mod base_system;
mod library;
mod web;

use base_system::config::load_or_create_with_base;
use base_system::context::{Config, SourceKind};
use base_system::logging::{LogOptions, LogSystem};
use base_system::page_state::PageStateStore;
use library::drive::{DriveConfig, DriveFolderLister};
use library::index::{BuildOptions, PageIndex, PageIndexBuilder};
use library::lister::FolderLister;
use library::local::LocalFolderLister;
use library::navigator::PageNavigator;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "comic-reader")]
#[command(about = "Paginated comic reader over a chapter/page folder tree")]
struct Cli {
    /// 启用调试日志输出
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,

    /// 数据目录路径（存放 config.yml、logs 和阅读进度文件）
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// 覆盖配置中的数据源
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// 覆盖监听地址，例如 127.0.0.1:8082
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("Comic Reader v{}", VERSION);
        return Ok(());
    }

    let data_dir = cli.data_dir.as_deref();
    let log = init_logging(cli.debug, data_dir)?;
    info!(target: "startup", logs = %log.logs_dir().display(), "comic reader v{VERSION}");

    let config = load_config(&cli, data_dir)?;
    let bind = config.socket_addr().map_err(|e| anyhow!(e.to_string()))?;

    let index = build_index(&config, data_dir)?;
    if index.is_empty() {
        warn!(target: "startup", "no pages found; every page request will report no content");
    }

    let page_state = PageStateStore::new(config.state_path(data_dir));
    info!(target: "startup", state = %page_state.path().display(), "page state file");

    web::run(
        bind,
        PageNavigator::new(index),
        page_state,
        config.assets_path(data_dir),
    )
}

fn init_logging(debug: bool, base_dir: Option<&Path>) -> Result<LogSystem> {
    let opts = LogOptions {
        debug,
        ..LogOptions::default()
    };
    LogSystem::init(opts, base_dir).map_err(|e| anyhow!(e))
}

fn load_config(cli: &Cli, data_dir: Option<&Path>) -> Result<Config> {
    let mut config = load_or_create_with_base::<Config>(None, data_dir)
        .map_err(|e| anyhow!(e.to_string()))?;
    config
        .apply_env(|key| std::env::var(key).ok())
        .map_err(|e| anyhow!(e.to_string()))?;

    if let Some(source) = cli.source {
        config.source = source;
    }
    if let Some(bind) = &cli.bind {
        config.bind_addr = bind.clone();
    }

    config.validate().map_err(|e| anyhow!(e.to_string()))?;
    Ok(config)
}

/// 任何致命错误（根目录不可读、数据源不可达或超时、章节名缺少标记）都会终止启动。
fn build_index(config: &Config, data_dir: Option<&Path>) -> Result<PageIndex> {
    let options = BuildOptions {
        chapter_marker: config.chapter_marker.clone(),
        chapter_order: config.chapter_order,
    };

    match config.source {
        SourceKind::Local => {
            let lister = LocalFolderLister::new(config.assets_path(data_dir));
            build_with(&lister, options)
        }
        SourceKind::Drive => {
            let mut drive = DriveConfig::new(
                config.drive_api_key.clone(),
                config.drive_folder_id.clone(),
            );
            drive.page_size = config.drive_page_size;
            drive.request_timeout = config.request_timeout();
            let lister = DriveFolderLister::new(drive).context("create drive client")?;
            info!(target: "startup", "connected to drive client");
            build_with(&lister, options)
        }
    }
}

fn build_with<L: FolderLister>(lister: &L, options: BuildOptions) -> Result<PageIndex> {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template("{prefix} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_prefix("章节索引");

    let result = PageIndexBuilder::new(lister, options)
        .on_progress(|p| {
            pb.set_length(p.total as u64);
            pb.set_position(p.current as u64);
            match p.pages {
                Some(_) => pb.set_message(p.name),
                None => pb.set_message(format!("{} (skipped)", p.name)),
            }
        })
        .build();
    pb.finish_and_clear();

    result.with_context(|| format!("failed to build page index from {}", lister.describe()))
}
