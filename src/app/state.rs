// ==========================================
// 厨卫展厅管理后台 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::import_api::DefaultProductImporter;
use crate::api::ImportApi;
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::importer::ProductImporterImpl;
use crate::repository::{ProductRepositoryImpl, SessionRepository};

/// 应用状态
///
/// 作为 axum State 在各处理函数之间共享（Clone 只复制 Arc）
#[derive(Clone)]
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 批量导入API
    pub import_api: Arc<ImportApi>,

    /// 会话仓储（认证中间件使用）
    pub session_repo: Arc<SessionRepository>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的应用状态
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 初始化成功
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "initializing application state");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("failed to open database: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("failed to initialize schema: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let product_repo = Arc::new(ProductRepositoryImpl::from_connection(conn.clone()));
        let session_repo = Arc::new(SessionRepository::from_connection(conn.clone()));
        let config = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("failed to create ConfigManager: {}", e))?,
        );

        let importer: Arc<DefaultProductImporter> = Arc::new(ProductImporterImpl::new(
            product_repo.clone(),
            config.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(importer, product_repo, config.clone()));

        Ok(Self {
            db_path,
            import_api,
            session_repo,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_app_state_initializes_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert!(state.session_repo.find_by_token("missing").unwrap().is_none());
    }
}
