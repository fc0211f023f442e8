//! 共享应用状态

use crate::theme::ThemeStore;
use palm_catalog::DiseaseCatalog;
use palm_report::{CardIndex, PrintSurface};
use palm_workflow::{AnalysisWorkflow, Notification, NotificationQueue, Notifier, CATALOG_FALLBACK_MESSAGE};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 处理器共享状态
///
/// 工作流由外壳显式持有，同一时刻只有一个请求修改它。
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Mutex<AnalysisWorkflow>>,
    pub catalog: Arc<DiseaseCatalog>,
    pub cards: Arc<CardIndex>,
    pub notifications: Arc<NotificationQueue>,
    pub theme: Arc<ThemeStore>,
    pub print_surface: Arc<dyn PrintSurface>,
}

impl AppState {
    /// `workflow` 应以 `notifications` 作为通知器构造，否则通知接口取不到消息
    pub fn new(
        workflow: AnalysisWorkflow,
        notifications: Arc<NotificationQueue>,
        theme: ThemeStore,
        print_surface: Arc<dyn PrintSurface>,
    ) -> Self {
        let catalog = workflow.catalog().clone();
        let cards = CardIndex::from_catalog(&catalog);

        // 目录加载失败只在启动时提示一次
        if catalog.is_fallback() {
            notifications.notify(Notification::error(CATALOG_FALLBACK_MESSAGE));
        }

        Self {
            workflow: Arc::new(Mutex::new(workflow)),
            catalog,
            cards: Arc::new(cards),
            notifications,
            theme: Arc::new(theme),
            print_surface,
        }
    }
}
