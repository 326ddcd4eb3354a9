// ==========================================
// 厨卫展厅管理后台 - 产品领域模型
// ==========================================
// 职责: 导入暂存结构 / 校验错误 / 导入结果 / 持久化产品
// 约定: 对外 JSON 一律 camelCase（与后台前端一致）
// ==========================================

use crate::domain::types::{ProductField, ProductStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// 原始行：表头 → 单元格文本（数值单元格已渲染为文本）
pub type RawRow = HashMap<String, String>;

/// 列映射：目标字段 → 原始表头
pub type ColumnMapping = BTreeMap<ProductField, String>;

/// 自由格式的规格参数
pub type Specifications = serde_json::Map<String, serde_json::Value>;

// ==========================================
// ParsedSheet - 文件解析输出
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>, // 表头（保持原始列顺序）
    pub rows: Vec<RawRow>,    // 数据行（已跳过全空行）
}

// ==========================================
// ImportedProduct - 导入暂存结构
// ==========================================
// 用途: 行转换器产出，校验器与批量写入器消费
// 红线: 不直接落库，落库前转换为 Product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedProduct {
    pub name: String, // 缺失时为空串，由校验器报错
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<Specifications>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

// ==========================================
// ImportValidationError - 行级校验错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportValidationError {
    pub row: usize,        // 数据行序号（从 1 开始，不含表头）
    pub field: String,     // 违规字段（与 ProductField::key 一致）
    pub message: String,   // 违规描述
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>, // 违规值
}

impl ImportValidationError {
    /// 名称错误视为关键错误：该行不参与落库
    pub fn is_critical(&self) -> bool {
        self.field == ProductField::Name.key()
    }
}

// ==========================================
// ImportResult - 解析 + 校验的完整输出
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub data: Vec<ImportedProduct>,
    pub errors: Vec<ImportValidationError>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub duplicates: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportResult {
    /// 存在关键错误的行号集合（1-based）
    pub fn critical_rows(&self) -> HashSet<usize> {
        self.errors
            .iter()
            .filter(|e| e.is_critical())
            .map(|e| e.row)
            .collect()
    }

    pub fn has_critical_errors(&self) -> bool {
        self.errors.iter().any(|e| e.is_critical())
    }

    /// 可落库的行（剔除关键错误行，其余错误仅作提示）
    pub fn importable_rows(&self) -> Vec<ImportedProduct> {
        let critical = self.critical_rows();
        self.data
            .iter()
            .enumerate()
            .filter(|(idx, _)| !critical.contains(&(idx + 1)))
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// 预览：只保留前 n 行数据，统计信息不变
    pub fn preview(&self, rows: usize) -> ImportResult {
        ImportResult {
            data: self.data.iter().take(rows).cloned().collect(),
            ..self.clone()
        }
    }

    /// 去掉 data 的摘要（提交响应中的 originalResult）
    pub fn summary(&self) -> ImportResultSummary {
        ImportResultSummary {
            total_rows: self.total_rows,
            valid_rows: self.valid_rows,
            errors: self.errors.clone(),
            duplicates: self.duplicates.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResultSummary {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub errors: Vec<ImportValidationError>,
    pub duplicates: Vec<String>,
    pub warnings: Vec<String>,
}

// ==========================================
// ImportOptions - 批量写入选项
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    pub update_existing: bool,
    pub skip_duplicates: bool,
    pub default_status: Option<ProductStatus>,
    pub default_category_id: Option<String>,
    pub default_brand_id: Option<String>,
    pub bulk_import_batch: Option<String>,
}

// ==========================================
// UpsertSummary - 批量写入统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSummary {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub total: usize,
}

// ==========================================
// BatchCommit - 一次提交的批次结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCommit {
    pub batch_id: String,
    pub results: UpsertSummary,
}

// ==========================================
// Product - 持久化产品记录
// ==========================================
// 对齐: products 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub compare_price: Option<f64>,
    pub sku: Option<String>,
    pub tags: Vec<String>,
    pub specifications: Option<Specifications>,
    pub in_stock: bool,
    pub stock_quantity: i64,
    pub status: ProductStatus,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
    pub bulk_import_batch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ==========================================
// ImportBatchSummary - 导入历史（按批次聚合）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchSummary {
    pub batch_id: String,
    pub product_count: i64,
    pub first_imported_at: DateTime<Utc>,
    pub last_imported_at: DateTime<Utc>,
}
