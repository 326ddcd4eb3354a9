// ==========================================
// 厨卫展厅管理后台 - HTTP 服务主入口
// ==========================================
// 环境变量: SHOWROOM_DB_PATH / SHOWROOM_BIND_ADDR / SHOWROOM_LOCALE
// 日志: RUST_LOG / SHOWROOM_LOG_FORMAT
// ==========================================

use anyhow::Context;
use showroom_import::app::{router, AppState, BULK_IMPORT_PATH};
use showroom_import::config::{ImportConfigReader, ServerSettings};
use showroom_import::{i18n, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", showroom_import::APP_NAME);
    tracing::info!("系统版本: {}", showroom_import::VERSION);
    tracing::info!("==================================================");

    let settings = ServerSettings::from_env();
    i18n::set_locale(&settings.locale);
    tracing::info!(db_path = %settings.db_path, locale = %settings.locale, "settings loaded");

    let state = AppState::new(settings.db_path.clone()).map_err(anyhow::Error::msg)?;

    let max_file_bytes = state
        .config
        .get_max_file_bytes()
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .context("failed to read import.max_file_bytes")?;

    let app = router(state, max_file_bytes);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    tracing::info!(
        addr = %settings.bind_addr,
        path = BULK_IMPORT_PATH,
        max_file_bytes,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
