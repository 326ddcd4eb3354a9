// ==========================================
// 厨卫展厅管理后台 - 批量写入驱动
// ==========================================
// 阶段 4: 分块 upsert
// 规则: 块与块之间顺序执行；块内各行并发执行（join_all）
// 红线: 单行失败只记入 errors，绝不影响同块其他行
// ==========================================

use crate::domain::product::{ImportOptions, ImportedProduct, Product, UpsertSummary};
use crate::i18n::t_with_args;
use crate::repository::ProductRepository;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 单行写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Imported,
    Updated,
    Skipped,
}

/// 生成 slug：小写，非字母数字的连续片段折叠为 "-"，去首尾 "-"，追加毫秒时间戳
pub fn slugify(name: &str, now: DateTime<Utc>) -> String {
    let mut base = String::with_capacity(name.len());
    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            base.push(ch);
        } else if !base.ends_with('-') {
            base.push('-');
        }
    }
    let base = base.trim_matches('-');

    if base.is_empty() {
        format!("product-{}", now.timestamp_millis())
    } else {
        format!("{}-{}", base, now.timestamp_millis())
    }
}

/// 新建产品记录（缺省值：draft / 有货 / 库存 0）
fn build_new_product(
    row: &ImportedProduct,
    options: &ImportOptions,
    batch_id: &str,
    now: DateTime<Utc>,
) -> Product {
    Product {
        id: Uuid::new_v4().to_string(),
        name: row.name.trim().to_string(),
        slug: slugify(&row.name, now),
        description: row.description.clone(),
        price: row.price,
        compare_price: row.compare_price,
        sku: row.sku.clone(),
        tags: row.tags.clone().unwrap_or_default(),
        specifications: row.specifications.clone(),
        in_stock: row.in_stock.unwrap_or(true),
        stock_quantity: row.stock_quantity.unwrap_or(0),
        status: row.status.or(options.default_status).unwrap_or_default(),
        product_type: row.product_type.clone(),
        category_id: options.default_category_id.clone(),
        brand_id: options.default_brand_id.clone(),
        bulk_import_batch: Some(batch_id.to_string()),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// 字段级合并：文件里有值的字段覆盖，缺失字段保留原值
fn merge_into_existing(
    existing: Product,
    row: &ImportedProduct,
    options: &ImportOptions,
    batch_id: &str,
    now: DateTime<Utc>,
) -> Product {
    Product {
        id: existing.id,
        name: existing.name,
        slug: existing.slug,
        description: row.description.clone().or(existing.description),
        price: row.price.or(existing.price),
        compare_price: row.compare_price.or(existing.compare_price),
        sku: row.sku.clone().or(existing.sku),
        tags: row.tags.clone().unwrap_or(existing.tags),
        specifications: row.specifications.clone().or(existing.specifications),
        in_stock: row.in_stock.unwrap_or(existing.in_stock),
        stock_quantity: row.stock_quantity.unwrap_or(existing.stock_quantity),
        status: row.status.unwrap_or(existing.status),
        product_type: row.product_type.clone().or(existing.product_type),
        category_id: options.default_category_id.clone().or(existing.category_id),
        brand_id: options.default_brand_id.clone().or(existing.brand_id),
        bulk_import_batch: Some(batch_id.to_string()),
        created_at: existing.created_at,
        updated_at: now,
        deleted_at: existing.deleted_at,
    }
}

// ==========================================
// BatchUpsertDriver
// ==========================================
pub struct BatchUpsertDriver<R>
where
    R: ProductRepository,
{
    product_repo: Arc<R>,
    chunk_size: usize,
}

impl<R> BatchUpsertDriver<R>
where
    R: ProductRepository,
{
    pub fn new(product_repo: Arc<R>, chunk_size: usize) -> Self {
        Self {
            product_repo,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// 执行批量 upsert
    ///
    /// # 返回
    /// - UpsertSummary: imported + updated + skipped + errors.len() == total
    pub async fn run(
        &self,
        rows: &[ImportedProduct],
        options: &ImportOptions,
        batch_id: &str,
    ) -> UpsertSummary {
        let mut summary = UpsertSummary {
            total: rows.len(),
            ..Default::default()
        };

        info!(
            batch_id = %batch_id,
            total = rows.len(),
            chunk_size = self.chunk_size,
            "starting batch upsert"
        );

        for (chunk_idx, chunk) in rows.chunks(self.chunk_size).enumerate() {
            let outcomes = join_all(
                chunk
                    .iter()
                    .map(|row| self.upsert_row(row, options, batch_id)),
            )
            .await;

            for outcome in outcomes {
                match outcome {
                    Ok(UpsertOutcome::Imported) => summary.imported += 1,
                    Ok(UpsertOutcome::Updated) => summary.updated += 1,
                    Ok(UpsertOutcome::Skipped) => summary.skipped += 1,
                    Err(message) => summary.errors.push(message),
                }
            }

            debug!(
                batch_id = %batch_id,
                chunk = chunk_idx,
                rows = chunk.len(),
                "chunk finished"
            );
        }

        info!(
            batch_id = %batch_id,
            imported = summary.imported,
            updated = summary.updated,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "batch upsert finished"
        );

        summary
    }

    /// 单行 upsert；失败以错误描述返回
    async fn upsert_row(
        &self,
        row: &ImportedProduct,
        options: &ImportOptions,
        batch_id: &str,
    ) -> Result<UpsertOutcome, String> {
        let name = row.name.trim();
        let row_failed = |err: &dyn std::fmt::Display| {
            warn!(product = %name, error = %err, "row upsert failed");
            t_with_args(
                "upsert.row_failed",
                &[("name", name), ("error", &err.to_string())],
            )
        };

        let existing = self
            .product_repo
            .find_active_by_name(name)
            .await
            .map_err(|e| row_failed(&e))?;

        let now = Utc::now();
        match existing {
            Some(existing) if options.update_existing => {
                let merged = merge_into_existing(existing, row, options, batch_id, now);
                self.product_repo
                    .update(&merged)
                    .await
                    .map_err(|e| row_failed(&e))?;
                Ok(UpsertOutcome::Updated)
            }
            Some(_) if options.skip_duplicates => Ok(UpsertOutcome::Skipped),
            Some(_) => Err(t_with_args("upsert.already_exists", &[("name", name)])),
            None => {
                let product = build_new_product(row, options, batch_id, now);
                self.product_repo
                    .insert(&product)
                    .await
                    .map_err(|e| row_failed(&e))?;
                Ok(UpsertOutcome::Imported)
            }
        }
    }
}
