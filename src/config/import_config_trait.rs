// ==========================================
// 厨卫展厅管理后台 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 批量写入 =====

    /// 每个分块的行数
    ///
    /// # 默认值
    /// - 50
    async fn get_upsert_chunk_size(&self) -> ConfigResult<usize>;

    // ===== 上传限制 =====

    /// 上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 10 MB
    async fn get_max_file_bytes(&self) -> ConfigResult<usize>;

    /// 预览模式返回的数据行数
    ///
    /// # 默认值
    /// - 10
    async fn get_preview_rows(&self) -> ConfigResult<usize>;

    // ===== 校验阈值 =====

    /// 名称最大长度（字符）
    async fn get_name_max_len(&self) -> ConfigResult<usize>;

    /// 描述最大长度（字符）
    async fn get_description_max_len(&self) -> ConfigResult<usize>;

    /// 价格上限
    async fn get_price_max(&self) -> ConfigResult<f64>;
}
