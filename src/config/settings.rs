// ==========================================
// 厨卫展厅管理后台 - 进程级设置
// ==========================================
// 来源: 环境变量（未设置时使用默认值）
// - SHOWROOM_DB_PATH   数据库文件路径
// - SHOWROOM_BIND_ADDR HTTP 监听地址
// - SHOWROOM_LOCALE    提示信息语言
// ==========================================

use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "SHOWROOM_DB_PATH";
pub const ENV_BIND_ADDR: &str = "SHOWROOM_BIND_ADDR";
pub const ENV_LOCALE: &str = "SHOWROOM_LOCALE";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub db_path: String,
    pub bind_addr: String,
    pub locale: String,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 按给定的查找函数读取设置（空白值视为未设置）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            db_path: read(ENV_DB_PATH).unwrap_or_else(get_default_db_path),
            bind_addr: read(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            locale: read(ENV_LOCALE).unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
        }
    }
}

/// 默认数据库路径：用户数据目录下的 showroom-admin/showroom.db
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./showroom.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("showroom-admin-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("showroom-admin");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("showroom.db");
    }

    path.to_string_lossy().to_string()
}
