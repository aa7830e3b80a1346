//! 阅读器 Web 服务：页面渲染、重定向与本地图片的静态服务。

mod router;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing::info;

use crate::base_system::page_state::PageStateStore;
use crate::library::navigator::PageNavigator;
use state::AppState;

/// 启动 tokio 运行时并阻塞到服务退出。索引必须在此之前构建完成。
pub(crate) fn run(
    bind: SocketAddr,
    navigator: PageNavigator,
    page_state: PageStateStore,
    assets_root: PathBuf,
) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let state = AppState::new(navigator, page_state, assets_root);
    match state.resume_page {
        Some(page) => info!(target: "web", page, "restored last page"),
        None => info!(target: "web", "no saved page"),
    }

    rt.block_on(run_async(bind, state))
}

async fn run_async(bind: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow!(e).context(format!("bind failed: {bind}")))?;

    info!(target: "web", "reader listening on http://{bind}/");
    println!("Comic reader listening on http://{bind}/");
    println!("Press Ctrl+C to stop.");

    let app = router::build_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!(target: "web", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    println!("Stopping server...");
}
