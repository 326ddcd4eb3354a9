// ==========================================
// 厨卫展厅管理后台 - 列映射器实现
// ==========================================
// 阶段 1: 表头自动识别
// 规则: 别名与表头统一规范化后，先精确匹配，再子串匹配
// 约束: 一个表头只能被一个字段占用；同一字段先命中者胜出
// ==========================================

use crate::domain::product::ColumnMapping;
use crate::domain::types::ProductField;
use crate::importer::product_importer_trait::ColumnMapper as ColumnMapperTrait;
use std::collections::{HashMap, HashSet};

/// 各字段的别名（按优先级排列，小写）
fn aliases(field: ProductField) -> &'static [&'static str] {
    match field {
        ProductField::Name => &[
            "name",
            "product_name",
            "product",
            "title",
            "product_title",
            "item_name",
            "item",
        ],
        ProductField::Description => &[
            "description",
            "product_description",
            "desc",
            "details",
            "long_description",
        ],
        ProductField::Price => &[
            "price",
            "sale_price",
            "retail_price",
            "unit_price",
            "cost",
            "msrp",
        ],
        ProductField::ComparePrice => &[
            "compare_price",
            "compare_at_price",
            "original_price",
            "list_price",
            "was_price",
        ],
        ProductField::Sku => &["sku", "product_code", "item_code", "model_number", "part_number"],
        ProductField::Tags => &["tags", "tag", "keywords", "labels"],
        ProductField::Specifications => &["specifications", "specs", "attributes", "features"],
        ProductField::InStock => &["in_stock", "available", "availability", "instock"],
        ProductField::StockQuantity => &[
            "stock_quantity",
            "quantity",
            "qty",
            "stock",
            "inventory",
            "stock_qty",
        ],
        ProductField::Status => &["status", "state", "publish_status"],
        ProductField::Type => &["type", "product_type", "category_type", "kind"],
    }
}

/// 规范化：小写、去首尾空白，空格/连字符/下划线的连续序列折叠为单个下划线
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.extend(ch.to_lowercase());
    }

    out
}

pub struct ColumnMapper;

impl ColumnMapper {
    /// 在未被占用的表头中查找第一个满足条件的
    fn find_header<'h, F>(
        normalized: &'h [(String, String)],
        claimed: &HashSet<&'h str>,
        field: ProductField,
        matches: F,
    ) -> Option<&'h str>
    where
        F: Fn(&str, &str) -> bool,
    {
        for alias in aliases(field) {
            let alias = normalize_header(alias);
            let hit = normalized
                .iter()
                .find(|(original, norm)| {
                    !claimed.contains(original.as_str()) && matches(norm.as_str(), alias.as_str())
                })
                .map(|(original, _)| original.as_str());
            if hit.is_some() {
                return hit;
            }
        }
        None
    }
}

impl ColumnMapperTrait for ColumnMapper {
    fn detect(&self, headers: &[String]) -> ColumnMapping {
        let normalized: Vec<(String, String)> = headers
            .iter()
            .filter(|h| !h.trim().is_empty())
            .map(|h| (h.clone(), normalize_header(h)))
            .collect();

        let mut mapping = ColumnMapping::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        // 第一轮：精确匹配
        for field in ProductField::ALL {
            if let Some(header) =
                Self::find_header(&normalized, &claimed, field, |norm, alias| norm == alias)
            {
                claimed.insert(header);
                mapping.insert(field, header.to_string());
            }
        }

        // 第二轮：子串匹配（只处理仍未映射的字段）
        for field in ProductField::ALL {
            if mapping.contains_key(&field) {
                continue;
            }
            if let Some(header) =
                Self::find_header(&normalized, &claimed, field, |norm, alias| norm.contains(alias))
            {
                claimed.insert(header);
                mapping.insert(field, header.to_string());
            }
        }

        mapping
    }
}

/// 调用方显式映射（字段名 → 表头）转换为 ColumnMapping；未知字段名忽略
pub fn mapping_from_keys(raw: &HashMap<String, String>) -> ColumnMapping {
    raw.iter()
        .filter(|(_, header)| !header.trim().is_empty())
        .filter_map(|(key, header)| ProductField::from_key(key).map(|f| (f, header.clone())))
        .collect()
}

/// 未被任何字段使用的表头（生成提示用）
pub fn unmapped_headers(headers: &[String], mapping: &ColumnMapping) -> Vec<String> {
    let used: HashSet<&str> = mapping.values().map(String::as_str).collect();
    headers
        .iter()
        .filter(|h| !h.trim().is_empty() && !used.contains(h.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Product Name"), "product_name");
        assert_eq!(normalize_header("  product--name "), "product_name");
        assert_eq!(normalize_header("PRODUCT_ _NAME"), "product_name");
        assert_eq!(normalize_header("Qty"), "qty");
    }

    #[test]
    fn test_product_name_variants_map_to_name() {
        for variant in ["Product Name", "product_name", "PRODUCT-NAME", "product  name"] {
            let mapping = ColumnMapper.detect(&headers(&[variant, "Price"]));
            assert_eq!(
                mapping.get(&ProductField::Name),
                Some(&variant.to_string()),
                "variant {}",
                variant
            );
        }
    }

    #[test]
    fn test_basic_headers() {
        let mapping = ColumnMapper.detect(&headers(&["Product Name", "Price", "Qty"]));

        assert_eq!(mapping.get(&ProductField::Name).unwrap(), "Product Name");
        assert_eq!(mapping.get(&ProductField::Price).unwrap(), "Price");
        assert_eq!(mapping.get(&ProductField::StockQuantity).unwrap(), "Qty");
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn test_exact_match_beats_substring() {
        // "Compare Price" 不应被 price 字段抢占
        let mapping = ColumnMapper.detect(&headers(&["Compare Price", "Price", "Name"]));

        assert_eq!(mapping.get(&ProductField::Price).unwrap(), "Price");
        assert_eq!(mapping.get(&ProductField::ComparePrice).unwrap(), "Compare Price");
    }

    #[test]
    fn test_claimed_header_not_reused() {
        // "In Stock" 精确匹配 inStock 后，不再被 stockQuantity 的子串规则占用
        let mapping = ColumnMapper.detect(&headers(&["Name", "In Stock"]));

        assert_eq!(mapping.get(&ProductField::InStock).unwrap(), "In Stock");
        assert!(mapping.get(&ProductField::StockQuantity).is_none());
    }

    #[test]
    fn test_substring_match() {
        let mapping = ColumnMapper.detect(&headers(&["Vanity Name", "Price (USD)"]));

        assert_eq!(mapping.get(&ProductField::Name).unwrap(), "Vanity Name");
        assert_eq!(mapping.get(&ProductField::Price).unwrap(), "Price (USD)");
    }

    #[test]
    fn test_no_match_is_empty() {
        let mapping = ColumnMapper.detect(&headers(&["Colour", "Finish"]));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_mapping_from_keys_ignores_unknown() {
        let mut raw = HashMap::new();
        raw.insert("name".to_string(), "Title".to_string());
        raw.insert("comparePrice".to_string(), "MSRP".to_string());
        raw.insert("colour".to_string(), "Finish".to_string());

        let mapping = mapping_from_keys(&raw);

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(&ProductField::ComparePrice).unwrap(), "MSRP");
    }

    #[test]
    fn test_unmapped_headers() {
        let hs = headers(&["Name", "Finish", "Price"]);
        let mapping = ColumnMapper.detect(&hs);
        assert_eq!(unmapped_headers(&hs, &mapping), vec!["Finish".to_string()]);
    }
}
