use std::path::PathBuf;
use std::sync::Arc;

use crate::base_system::page_state::PageStateStore;
use crate::library::navigator::PageNavigator;

/// 所有请求共享的只读状态；页面索引启动后不再变化，因此无需加锁。
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) navigator: Arc<PageNavigator>,
    pub(crate) page_state: Arc<PageStateStore>,
    /// 启动时读到的上次页码。
    pub(crate) resume_page: Option<i64>,
    pub(crate) assets_root: Arc<PathBuf>,
}

impl AppState {
    pub(crate) fn new(
        navigator: PageNavigator,
        page_state: PageStateStore,
        assets_root: PathBuf,
    ) -> Self {
        let resume_page = page_state.load();
        Self {
            navigator: Arc::new(navigator),
            page_state: Arc::new(page_state),
            resume_page,
            assets_root: Arc::new(assets_root),
        }
    }
}
