// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、CSV 文件、会话、multipart 请求体
// ==========================================

#![allow(dead_code)]

use chrono::{Duration, Utc};
use showroom_import::config::ConfigManager;
use showroom_import::db::{ensure_schema, open_sqlite_connection};
use showroom_import::domain::UserRole;
use showroom_import::importer::ProductImporterImpl;
use showroom_import::repository::{ProductRepositoryImpl, SessionRepository};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub type TestImporter = ProductImporterImpl<ProductRepositoryImpl, ConfigManager>;

/// multipart 分隔符
pub const BOUNDARY: &str = "----showroom-test-boundary";

pub const CSV_MIME: &str = "text/csv";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("temp path is not valid UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 基于同一连接创建仓储 + 配置 + 导入器
pub fn create_test_importer(
    db_path: &str,
) -> (TestImporter, Arc<ProductRepositoryImpl>, Arc<ConfigManager>) {
    let conn = open_sqlite_connection(db_path).expect("open test db");
    ensure_schema(&conn).expect("ensure schema");
    let conn = Arc::new(Mutex::new(conn));

    let repo = Arc::new(ProductRepositoryImpl::from_connection(conn.clone()));
    let config = Arc::new(ConfigManager::from_connection(conn).expect("config manager"));
    let importer = ProductImporterImpl::new(repo.clone(), config.clone());

    (importer, repo, config)
}

/// 写入 CSV 文件
pub fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write csv");
    path
}

/// 写入一条会话（expires_in 为相对当前的有效期）
pub fn seed_session(db_path: &str, token: &str, role: UserRole, expires_in: Duration) {
    let repo = SessionRepository::new(db_path).expect("session repo");
    repo.create(
        token,
        &format!("user-{}", token),
        Some("staff@showroom.test"),
        role,
        Utc::now() + expires_in,
    )
    .expect("seed session");
}

/// 一个 multipart 字段
pub enum Part<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

/// 按 BOUNDARY 拼接 multipart/form-data 请求体
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
