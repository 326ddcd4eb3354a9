// ==========================================
// 厨卫展厅管理后台 - 行转换器实现
// ==========================================
// 阶段 2: 原始单元格 → ImportedProduct
// 规则: TRIM / NULL 标准化 / 数值与布尔转换
// 红线: 任何转换失败只让字段留空，绝不中断整行
// ==========================================

use crate::domain::product::{ColumnMapping, ImportedProduct, RawRow, Specifications};
use crate::domain::types::{ProductField, ProductStatus};
use crate::importer::product_importer_trait::RowTransformer as RowTransformerTrait;

/// 价格中剥离的货币符号
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹'];

/// 视为"有货"的取值（小写比较）
const TRUTHY_TOKENS: &[&str] = &["true", "yes", "y", "1", "in stock", "available"];

pub struct RowTransformer;

impl RowTransformerTrait for RowTransformer {
    fn transform(&self, row: &RawRow, mapping: &ColumnMapping) -> ImportedProduct {
        let mut product = ImportedProduct::default();

        for (field, header) in mapping {
            let Some(raw) = self.get_string(row, header) else {
                continue;
            };

            match field {
                ProductField::Name => product.name = raw,
                ProductField::Description => product.description = Some(raw),
                ProductField::Price => product.price = self.parse_price(&raw),
                ProductField::ComparePrice => product.compare_price = self.parse_price(&raw),
                ProductField::Sku => product.sku = Some(raw),
                ProductField::Tags => product.tags = self.parse_tags(&raw),
                ProductField::Specifications => {
                    product.specifications = Some(self.parse_specifications(header, &raw))
                }
                ProductField::InStock => product.in_stock = Some(self.parse_in_stock(&raw)),
                ProductField::StockQuantity => product.stock_quantity = self.parse_quantity(&raw),
                ProductField::Status => product.status = ProductStatus::parse_lenient(&raw),
                ProductField::Type => product.product_type = Some(raw),
            }
        }

        product
    }
}

impl RowTransformer {
    /// 提取字符串字段（TRIM 后为空视为缺失）
    fn get_string(&self, row: &RawRow, header: &str) -> Option<String> {
        row.get(header)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 解析价格：去掉货币符号、千分位逗号、空白
    pub fn parse_price(&self, value: &str) -> Option<f64> {
        let cleaned: String = value
            .chars()
            .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
            .collect();

        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// 解析库存数量：整数优先；"12.0" 这类整值小数也接受
    pub fn parse_quantity(&self, value: &str) -> Option<i64> {
        let cleaned: String = value.chars().filter(|c| *c != ',').collect();
        let cleaned = cleaned.trim();

        if let Ok(n) = cleaned.parse::<i64>() {
            return Some(n);
        }

        cleaned
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    }

    pub fn parse_in_stock(&self, value: &str) -> bool {
        let lowered = value.trim().to_lowercase();
        TRUTHY_TOKENS.contains(&lowered.as_str())
    }

    /// 标签：按 , ; | 切分，去空白，丢弃空项
    pub fn parse_tags(&self, value: &str) -> Option<Vec<String>> {
        let tags: Vec<String> = value
            .split([',', ';', '|'])
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if tags.is_empty() {
            None
        } else {
            Some(tags)
        }
    }

    /// 规格：优先按 JSON 对象解析，失败时退化为 {表头: 原值}
    pub fn parse_specifications(&self, header: &str, value: &str) -> Specifications {
        match serde_json::from_str::<serde_json::Value>(value) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => {
                let mut map = Specifications::new();
                map.insert(
                    header.to_string(),
                    serde_json::Value::String(value.to_string()),
                );
                map
            }
        }
    }
}
