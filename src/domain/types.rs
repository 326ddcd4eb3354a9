// ==========================================
// 厨卫展厅管理后台 - 领域类型定义
// ==========================================
// 职责: 产品状态 / 导入字段 / 文件类型 / 用户角色
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 产品状态 (Product Status)
// ==========================================
// 序列化格式: 小写（与前端、数据库一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,     // 草稿
    Published, // 已发布
    Archived,  // 已归档
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Published => "published",
            ProductStatus::Archived => "archived",
        }
    }

    /// 宽松解析：忽略大小写和首尾空白，非三种枚举值返回 None
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        raw.trim().to_lowercase().parse().ok()
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProductStatus::Draft),
            "published" => Ok(ProductStatus::Published),
            "archived" => Ok(ProductStatus::Archived),
            other => Err(format!("unknown product status: {}", other)),
        }
    }
}

// ==========================================
// 导入字段 (Product Field)
// ==========================================
// 列映射的目标字段；顺序即自动识别时的处理顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductField {
    Name,
    Description,
    Price,
    ComparePrice,
    Sku,
    Tags,
    Specifications,
    InStock,
    StockQuantity,
    Status,
    Type,
}

impl ProductField {
    pub const ALL: [ProductField; 11] = [
        ProductField::Name,
        ProductField::Description,
        ProductField::Price,
        ProductField::ComparePrice,
        ProductField::Sku,
        ProductField::Tags,
        ProductField::Specifications,
        ProductField::InStock,
        ProductField::StockQuantity,
        ProductField::Status,
        ProductField::Type,
    ];

    /// 对外字段名（与 JSON 字段名一致）
    pub fn key(&self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Description => "description",
            ProductField::Price => "price",
            ProductField::ComparePrice => "comparePrice",
            ProductField::Sku => "sku",
            ProductField::Tags => "tags",
            ProductField::Specifications => "specifications",
            ProductField::InStock => "inStock",
            ProductField::StockQuantity => "stockQuantity",
            ProductField::Status => "status",
            ProductField::Type => "type",
        }
    }

    /// 按字段名查找（调用方显式传入的 columnMapping 使用）
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key.trim())
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ==========================================
// 上传文件类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Excel,
    Csv,
}

impl FileType {
    /// 根据扩展名推断（CLI 导入本地文件使用）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "xlsx" | "xls" => Some(FileType::Excel),
            "csv" => Some(FileType::Csv),
            _ => None,
        }
    }
}

// ==========================================
// 用户角色
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Employee,
    Manager,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Employee => "employee",
            UserRole::Manager => "manager",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    /// 是否允许进入后台（含批量导入）
    pub fn is_staff(&self) -> bool {
        !matches!(self, UserRole::Customer)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" | "user" => Ok(UserRole::Customer),
            "employee" => Ok(UserRole::Employee),
            "manager" => Ok(UserRole::Manager),
            "admin" => Ok(UserRole::Admin),
            "super_admin" => Ok(UserRole::SuperAdmin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status_lenient() {
        assert_eq!(
            ProductStatus::parse_lenient(" Published "),
            Some(ProductStatus::Published)
        );
        assert_eq!(ProductStatus::parse_lenient("active"), None);
        assert_eq!(ProductStatus::parse_lenient(""), None);
    }

    #[test]
    fn test_product_field_keys_roundtrip() {
        for field in ProductField::ALL {
            assert_eq!(ProductField::from_key(field.key()), Some(field));
        }
        assert_eq!(ProductField::from_key("colour"), None);
    }

    #[test]
    fn test_user_role_staff() {
        assert!("super_admin".parse::<UserRole>().unwrap().is_staff());
        assert!("Employee".parse::<UserRole>().unwrap().is_staff());
        assert!(!"customer".parse::<UserRole>().unwrap().is_staff());
        assert!("guest".parse::<UserRole>().is_err());
    }
}
