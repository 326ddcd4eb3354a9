// ==========================================
// 厨卫展厅管理后台 - 产品校验器实现
// ==========================================
// 阶段 3: 行级校验
// 规则: 每行独立、互不依赖；所有检查都执行（不短路）
// 说明: 名称错误为关键错误，其余仅提示
// ==========================================

use crate::domain::product::{ImportValidationError, ImportedProduct};
use crate::domain::types::ProductField;
use crate::i18n::{t, t_with_args};
use crate::importer::product_importer_trait::ProductValidator as ProductValidatorTrait;
use serde_json::json;

/// 校验阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationLimits {
    pub name_max_len: usize,
    pub description_max_len: usize,
    pub price_max: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            name_max_len: 200,
            description_max_len: 5000,
            price_max: 1_000_000.0,
        }
    }
}

pub struct ProductValidator {
    limits: ValidationLimits,
}

impl ProductValidator {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    fn violation(
        row: usize,
        field: ProductField,
        message: String,
        value: serde_json::Value,
    ) -> ImportValidationError {
        ImportValidationError {
            row,
            field: field.key().to_string(),
            message,
            value: Some(value),
        }
    }
}

impl Default for ProductValidator {
    fn default() -> Self {
        Self::new(ValidationLimits::default())
    }
}

impl ProductValidatorTrait for ProductValidator {
    fn validate_row(&self, row: usize, product: &ImportedProduct) -> Vec<ImportValidationError> {
        let mut violations = Vec::new();
        let limits = &self.limits;

        // 名称：必填且不超长（最多一条）
        let name = product.name.trim();
        if name.is_empty() {
            violations.push(Self::violation(
                row,
                ProductField::Name,
                t("validation.name_required"),
                json!(product.name),
            ));
        } else if name.chars().count() > limits.name_max_len {
            violations.push(Self::violation(
                row,
                ProductField::Name,
                t_with_args(
                    "validation.name_too_long",
                    &[("max", &limits.name_max_len.to_string())],
                ),
                json!(product.name),
            ));
        }

        // 价格范围 [0, price_max]
        if let Some(price) = product.price {
            if !(0.0..=limits.price_max).contains(&price) {
                violations.push(Self::violation(
                    row,
                    ProductField::Price,
                    t_with_args(
                        "validation.price_out_of_range",
                        &[("max", &limits.price_max.to_string())],
                    ),
                    json!(price),
                ));
            }
        }

        // 划线价不得低于售价
        if let (Some(price), Some(compare)) = (product.price, product.compare_price) {
            if compare < price {
                violations.push(Self::violation(
                    row,
                    ProductField::ComparePrice,
                    t("validation.compare_price_below_price"),
                    json!(compare),
                ));
            }
        }

        // 库存非负
        if let Some(qty) = product.stock_quantity {
            if qty < 0 {
                violations.push(Self::violation(
                    row,
                    ProductField::StockQuantity,
                    t("validation.stock_negative"),
                    json!(qty),
                ));
            }
        }

        // 描述长度
        if let Some(desc) = &product.description {
            if desc.chars().count() > limits.description_max_len {
                violations.push(Self::violation(
                    row,
                    ProductField::Description,
                    t_with_args(
                        "validation.description_too_long",
                        &[("max", &limits.description_max_len.to_string())],
                    ),
                    json!(desc),
                ));
            }
        }

        violations
    }
}
