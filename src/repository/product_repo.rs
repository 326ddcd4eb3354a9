// ==========================================
// 厨卫展厅管理后台 - 产品 Repository Trait
// ==========================================
// 职责: 定义产品数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::product::{ImportBatchSummary, Product};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ProductRepository Trait
// ==========================================
// 用途: 批量导入写入 + 导入历史查询
// 实现者: ProductRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 按名称精确查找未删除的产品
    ///
    /// # 返回
    /// - Ok(Some(product)): 找到（同名多条时取最早创建的一条）
    /// - Ok(None): 不存在或已软删除
    async fn find_active_by_name(&self, name: &str) -> RepositoryResult<Option<Product>>;

    /// 插入新产品
    async fn insert(&self, product: &Product) -> RepositoryResult<()>;

    /// 按 id 整行覆盖更新（字段合并由调用方完成）
    async fn update(&self, product: &Product) -> RepositoryResult<()>;

    /// 查询某批次导入的全部产品（按创建时间升序）
    async fn list_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<Product>>;

    /// 按批次聚合的导入历史（最近的批次在前）
    async fn list_import_batches(&self) -> RepositoryResult<Vec<ImportBatchSummary>>;

    /// 未删除产品总数
    async fn count_active(&self) -> RepositoryResult<i64>;
}
