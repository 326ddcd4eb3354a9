// ==========================================
// 厨卫展厅管理后台 - 产品 Repository 实现
// ==========================================
// 职责: 实现产品数据访问（使用 rusqlite）
// 存储: products 表；tags / specifications 以 JSON 文本存放
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::product::{ImportBatchSummary, Product, Specifications};
use crate::domain::types::ProductStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_repo::ProductRepository;
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, compare_price, sku, tags, \
     specifications, in_stock, stock_quantity, status, product_type, category_id, brand_id, \
     bulk_import_batch, created_at, updated_at, deleted_at";

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

/// products 行 → Product（列顺序与 PRODUCT_COLUMNS 一致）
fn map_product_row(row: &Row) -> rusqlite::Result<Product> {
    let tags_raw: String = row.get(7)?;
    let tags: Vec<String> = serde_json::from_str(&tags_raw).map_err(|e| conversion_error(7, e))?;

    let specs_raw: Option<String> = row.get(8)?;
    let specifications = specs_raw
        .map(|raw| serde_json::from_str::<Specifications>(&raw))
        .transpose()
        .map_err(|e| conversion_error(8, e))?;

    let status_raw: String = row.get(11)?;
    let status: ProductStatus = status_raw.parse().map_err(|e: String| conversion_error(11, e))?;

    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        compare_price: row.get(5)?,
        sku: row.get(6)?,
        tags,
        specifications,
        in_stock: row.get::<_, i64>(9)? != 0,
        stock_quantity: row.get(10)?,
        status,
        product_type: row.get(12)?,
        category_id: row.get(13)?,
        brand_id: row.get(14)?,
        bulk_import_batch: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
        deleted_at: row.get(18)?,
    })
}

// ==========================================
// ProductRepositoryImpl
// ==========================================
pub struct ProductRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepositoryImpl {
    /// 创建新的 Repository 实例（建表幂等）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn encode_json_columns(product: &Product) -> RepositoryResult<(String, Option<String>)> {
        let tags = serde_json::to_string(&product.tags)?;
        let specs = product
            .specifications
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        Ok((tags, specs))
    }
}

#[async_trait]
impl ProductRepository for ProductRepositoryImpl {
    async fn find_active_by_name(&self, name: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM products WHERE name = ?1 AND deleted_at IS NULL \
             ORDER BY created_at ASC LIMIT 1",
            PRODUCT_COLUMNS
        );
        let product = conn
            .query_row(&sql, params![name], map_product_row)
            .optional()?;
        Ok(product)
    }

    async fn insert(&self, product: &Product) -> RepositoryResult<()> {
        let (tags, specs) = Self::encode_json_columns(product)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO products (
                id, name, slug, description, price, compare_price, sku, tags,
                specifications, in_stock, stock_quantity, status, product_type,
                category_id, brand_id, bulk_import_batch, created_at, updated_at, deleted_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19
            )
            "#,
            params![
                product.id,
                product.name,
                product.slug,
                product.description,
                product.price,
                product.compare_price,
                product.sku,
                tags,
                specs,
                product.in_stock as i64,
                product.stock_quantity,
                product.status.as_str(),
                product.product_type,
                product.category_id,
                product.brand_id,
                product.bulk_import_batch,
                product.created_at,
                product.updated_at,
                product.deleted_at,
            ],
        )?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> RepositoryResult<()> {
        let (tags, specs) = Self::encode_json_columns(product)?;
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE products SET
                name = ?2, description = ?3, price = ?4, compare_price = ?5, sku = ?6,
                tags = ?7, specifications = ?8, in_stock = ?9, stock_quantity = ?10,
                status = ?11, product_type = ?12, category_id = ?13, brand_id = ?14,
                bulk_import_batch = ?15, updated_at = ?16
            WHERE id = ?1
            "#,
            params![
                product.id,
                product.name,
                product.description,
                product.price,
                product.compare_price,
                product.sku,
                tags,
                specs,
                product.in_stock as i64,
                product.stock_quantity,
                product.status.as_str(),
                product.product_type,
                product.category_id,
                product.brand_id,
                product.bulk_import_batch,
                product.updated_at,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: product.id.clone(),
            });
        }
        Ok(())
    }

    async fn list_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM products WHERE bulk_import_batch = ?1 AND deleted_at IS NULL \
             ORDER BY created_at ASC, name ASC",
            PRODUCT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let products = stmt
            .query_map(params![batch_id], map_product_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    async fn list_import_batches(&self) -> RepositoryResult<Vec<ImportBatchSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT bulk_import_batch, COUNT(*), MIN(updated_at), MAX(updated_at)
            FROM products
            WHERE bulk_import_batch IS NOT NULL AND deleted_at IS NULL
            GROUP BY bulk_import_batch
            ORDER BY MAX(updated_at) DESC
            "#,
        )?;
        let batches = stmt
            .query_map([], |row| {
                Ok(ImportBatchSummary {
                    batch_id: row.get(0)?,
                    product_count: row.get(1)?,
                    first_imported_at: row.get(2)?,
                    last_imported_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    async fn count_active(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM products WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
