// ==========================================
// 厨卫展厅管理后台 - 重名检测器实现
// ==========================================
// 职责: 检测同一文件内的重复产品名（TRIM + 小写后比较）
// 说明: 仅提示，不修改数据、不阻断导入
// ==========================================

use crate::domain::product::ImportedProduct;
use crate::i18n::t_with_args;
use crate::importer::product_importer_trait::DuplicateDetector as DuplicateDetectorTrait;
use std::collections::HashMap;

pub struct DuplicateDetector;

/// 名称规范化
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl DuplicateDetectorTrait for DuplicateDetector {
    fn detect_duplicates(&self, products: &[ImportedProduct]) -> Vec<String> {
        // 规范化名称 → (首次出现的原名, 行号列表)；保持首次出现顺序
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, (String, Vec<usize>)> = HashMap::new();

        for (idx, product) in products.iter().enumerate() {
            let key = normalize_name(&product.name);
            if key.is_empty() {
                continue;
            }
            groups
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    (product.name.trim().to_string(), Vec::new())
                })
                .1
                .push(idx + 1);
        }

        order
            .iter()
            .filter_map(|key| groups.get(key))
            .filter(|(_, rows)| rows.len() > 1)
            .map(|(name, rows)| {
                let row_list = rows
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                t_with_args("duplicates.found", &[("name", name), ("rows", &row_list)])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products(names: &[&str]) -> Vec<ImportedProduct> {
        names
            .iter()
            .map(|n| ImportedProduct {
                name: n.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_detect_duplicates_none() {
        let dups = DuplicateDetector.detect_duplicates(&products(&["Sink", "Faucet"]));
        assert!(dups.is_empty());
    }

    #[test]
    fn test_detect_case_and_whitespace_insensitive() {
        let dups = DuplicateDetector.detect_duplicates(&products(&["Sink", "sink ", "Faucet"]));

        assert_eq!(dups.len(), 1);
        assert!(dups[0].contains("Sink"));
        assert!(dups[0].contains("1, 2"));
    }

    #[test]
    fn test_detect_multiple_groups_in_first_seen_order() {
        let dups = DuplicateDetector
            .detect_duplicates(&products(&["Tub", "Sink", "TUB", "sink", "Tub"]));

        assert_eq!(dups.len(), 2);
        assert!(dups[0].contains("1, 3, 5"));
        assert!(dups[1].contains("2, 4"));
    }

    #[test]
    fn test_empty_names_ignored() {
        let dups = DuplicateDetector.detect_duplicates(&products(&["", "  ", "Tub"]));
        assert!(dups.is_empty());
    }
}
