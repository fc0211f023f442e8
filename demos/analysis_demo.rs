//! 分析工作流演示程序
//!
//! 展示上传校验、模拟分析、阶段进度、相机拍照和报告生成

use async_trait::async_trait;
use palm_catalog::{BundledCatalogSource, DiseaseCatalog};
use palm_core::ImagePayload;
use palm_report::{render_on_screen, render_printable, CardIndex};
use palm_workflow::{
    AnalysisOutcome, AnalysisTiming, AnalysisWorkflow, CameraDevice, CameraSession, FacingMode, Frame,
    NotificationQueue, SimulatedAnalyzer, VideoStream,
};
use std::sync::Arc;
use std::time::Duration;

/// 生成渐变画面的演示相机
struct DemoCamera;

struct DemoStream;

#[async_trait]
impl CameraDevice for DemoCamera {
    async fn open_stream(&self, _facing: FacingMode) -> palm_core::Result<Box<dyn VideoStream>> {
        Ok(Box::new(DemoStream))
    }
}

impl VideoStream for DemoStream {
    fn grab_frame(&mut self) -> palm_core::Result<Frame> {
        let (width, height) = (64u32, 48u32);
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                rgb.extend_from_slice(&[(x * 4) as u8, 160, (y * 5) as u8]);
            }
        }
        Ok(Frame { width, height, rgb })
    }

    fn stop(&mut self) {}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    println!("🌴 PalmAI 分析工作流演示\n");

    // 1. 加载病害目录
    let catalog = Arc::new(DiseaseCatalog::load(&BundledCatalogSource).await);
    println!("✅ 病害目录加载完成，共 {} 个条目", catalog.len());

    let cards = CardIndex::from_catalog(&catalog);
    for card in cards.cards(&catalog) {
        println!("   [{}] {} ({})", card.slot, card.name, card.severity);
    }

    // 2. 创建工作流
    let notifications = Arc::new(NotificationQueue::new());
    let mut workflow = AnalysisWorkflow::new(catalog.clone(), notifications.clone())
        .with_analyzer(SimulatedAnalyzer::seeded(2024))
        .with_timing(AnalysisTiming {
            delay: Duration::from_millis(600),
            stage_interval: Duration::from_millis(200),
            ..AnalysisTiming::default()
        });

    // 3. 上传校验
    println!("\n📤 上传不支持的文件...");
    if let Err(reason) = workflow.select_image(ImagePayload::new("notes.pdf", "application/pdf", vec![0u8; 16])) {
        println!("   ❌ 已拒绝: {}", reason.user_message());
    }

    println!("📤 上传叶片照片...");
    workflow.select_image(ImagePayload::new("leaf.png", "image/png", vec![0x89, b'P', b'N', b'G']))?;
    println!("   当前状态: {}", workflow.state());

    // 4. 模拟分析
    println!("\n🔬 开始分析...");
    let mut progress = workflow.subscribe_progress();
    let watcher = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let snapshot = progress.borrow().clone();
            if let Some(stage) = &snapshot.current {
                println!("   ⏳ {} ({}/{})", stage, snapshot.active, snapshot.total);
            }
            if snapshot.is_complete() {
                break;
            }
        }
    });

    if let AnalysisOutcome::Completed(result) = workflow.start_analysis().await {
        let report = render_on_screen(&result);
        println!("\n📊 分析结果:");
        println!("   病害: {}", report.name);
        println!("   置信度: {}%", report.confidence_percent);
        println!("   严重程度: {}", report.severity);
        println!("   治疗建议: {}", report.treatment.join("; "));

        let printable = render_printable(&result);
        println!("\n🖨️  可打印报告: {} ({} 字节)", printable.title, printable.html.len());
    }
    watcher.abort();

    // 5. 相机拍照
    println!("\n📷 使用相机拍照...");
    workflow.new_analysis();
    if let Some(session) = CameraSession::open(&DemoCamera, notifications.as_ref()).await {
        workflow.select_camera_capture(session)?;
        if let Some(image) = workflow.pending_image() {
            println!("   已拍摄 {} ({} 字节, {})", image.name, image.size, image.media_type);
        }
    }

    // 6. 通知
    println!("\n🔔 通知:");
    for notification in notifications.drain() {
        println!("   [{:?}] {}", notification.level, notification.message);
    }

    println!("\n🎉 演示完成");
    Ok(())
}
