//! PalmAI服务器主程序

use anyhow::{Context, Result};
use clap::Parser;
use palm_admin::{init_logging, CatalogConfig, ConfigManager};
use palm_catalog::{BundledCatalogSource, CatalogSource, DiseaseCatalog, FileCatalogSource, HttpCatalogSource};
use palm_report::FileExportSurface;
use palm_web::{AppState, ThemeStore, WebServer};
use palm_workflow::{AnalysisWorkflow, NotificationQueue, UploadValidator};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// PalmAI服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "palm-server")]
#[command(about = "PalmAI 棕榈树病害识别服务")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 监听地址
    #[arg(long)]
    host: Option<String>,

    /// 服务器端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 病害目录URL
    #[arg(long)]
    catalog_url: Option<String>,

    /// 病害目录文件
    #[arg(long)]
    catalog_path: Option<String>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let manager = ConfigManager::new(args.config.as_deref())?;
    let mut config = manager.get_config().await;

    // 命令行参数优先于配置文件
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(url) = args.catalog_url {
        config.catalog.url = Some(url);
    }
    if let Some(path) = args.catalog_path {
        config.catalog.path = Some(path);
    }

    // 初始化日志
    init_logging(&config.logging)?;

    info!("启动PalmAI服务器...");

    let source = catalog_source(&config.catalog)?;
    info!("加载病害目录: {}", source.describe());
    let catalog = Arc::new(DiseaseCatalog::load(source.as_ref()).await);
    if catalog.is_fallback() {
        warn!("病害目录不可用，仅使用默认条目");
    }

    let notifications = Arc::new(NotificationQueue::new());
    let workflow = AnalysisWorkflow::new(catalog.clone(), notifications.clone())
        .with_validator(UploadValidator::new(config.upload.policy()))
        .with_timing(config.analysis.timing());

    let theme = ThemeStore::load(&config.theme.storage_path, config.theme.storage_key.clone()).await;
    let print_surface = Arc::new(FileExportSurface::new(&config.report.output_dir));
    let state = AppState::new(workflow, notifications, theme, print_surface);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;

    info!("PalmAI服务器配置:");
    info!("  监听地址: {}", addr);
    info!("  病害条目: {}", catalog.len());
    info!("  分析耗时: {}ms", config.analysis.delay_ms);
    info!("  报告目录: {}", config.report.output_dir);

    let server = WebServer::new(addr, state, &config.server.static_dir);

    if let Err(e) = server.run().await {
        error!("服务器启动失败: {}", e);
        return Err(e);
    }

    Ok(())
}

/// 按 URL → 本地文件 → 内置数据 的顺序选择病害目录来源
fn catalog_source(config: &CatalogConfig) -> Result<Box<dyn CatalogSource>> {
    if let Some(url) = &config.url {
        let source = HttpCatalogSource::new(url.clone(), Duration::from_millis(config.fetch_timeout_ms))?;
        return Ok(Box::new(source));
    }

    if let Some(path) = &config.path {
        return Ok(Box::new(FileCatalogSource::new(path)));
    }

    Ok(Box::new(BundledCatalogSource))
}
