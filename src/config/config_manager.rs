// ==========================================
// 厨卫展厅管理后台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| format!("failed to acquire lock: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("failed to acquire lock: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("failed to acquire lock: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 所有 global 配置（按键排序）
    pub fn list_global_configs(&self) -> ConfigResult<HashMap<String, String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("failed to acquire lock: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 读取数值配置；缺失或格式错误时回落到默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + std::fmt::Display + Copy,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "invalid config value, falling back to default"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_upsert_chunk_size(&self) -> ConfigResult<usize> {
        let size = self.get_parsed_or_default(
            config_keys::UPSERT_CHUNK_SIZE,
            defaults::UPSERT_CHUNK_SIZE,
        )?;
        // 0 会导致分块死循环
        Ok(size.max(1))
    }

    async fn get_max_file_bytes(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::MAX_FILE_BYTES, defaults::MAX_FILE_BYTES)
    }

    async fn get_preview_rows(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::PREVIEW_ROWS, defaults::PREVIEW_ROWS)
    }

    async fn get_name_max_len(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::NAME_MAX_LEN, defaults::NAME_MAX_LEN)
    }

    async fn get_description_max_len(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(
            config_keys::DESCRIPTION_MAX_LEN,
            defaults::DESCRIPTION_MAX_LEN,
        )
    }

    async fn get_price_max(&self) -> ConfigResult<f64> {
        self.get_parsed_or_default(config_keys::PRICE_MAX, defaults::PRICE_MAX)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 批量写入
    pub const UPSERT_CHUNK_SIZE: &str = "import.upsert_chunk_size";

    // 上传
    pub const MAX_FILE_BYTES: &str = "import.max_file_bytes";
    pub const PREVIEW_ROWS: &str = "import.preview_rows";

    // 校验
    pub const NAME_MAX_LEN: &str = "validation.name_max_len";
    pub const DESCRIPTION_MAX_LEN: &str = "validation.description_max_len";
    pub const PRICE_MAX: &str = "validation.price_max";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const UPSERT_CHUNK_SIZE: usize = 50;
    pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
    pub const PREVIEW_ROWS: usize = 10;
    pub const NAME_MAX_LEN: usize = 200;
    pub const DESCRIPTION_MAX_LEN: usize = 5000;
    pub const PRICE_MAX: f64 = 1_000_000.0;
}
