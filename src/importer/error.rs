// ==========================================
// 厨卫展厅管理后台 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级校验错误不走这里（收集为 ImportValidationError）
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .xlsx/.xls/.csv are accepted)")]
    UnsupportedFormat(String),

    #[error("file too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("failed to read file: {0}")]
    FileReadError(String),

    #[error("failed to parse spreadsheet: {0}")]
    ExcelParseError(String),

    #[error("failed to parse CSV: {0}")]
    CsvParseError(String),

    #[error("file contains no header row")]
    MissingHeader,

    // ===== 请求元数据错误 =====
    #[error("invalid import metadata: {0}")]
    InvalidMetadata(String),

    // ===== 落库错误 =====
    #[error("persistence failed: {0}")]
    Persistence(String),

    // ===== 通用错误 =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 文件格式类错误：在任何行处理之前直接拒绝（HTTP 400）
    pub fn is_file_format_error(&self) -> bool {
        matches!(
            self,
            ImportError::FileNotFound(_)
                | ImportError::UnsupportedFormat(_)
                | ImportError::FileTooLarge { .. }
                | ImportError::FileReadError(_)
                | ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
                | ImportError::MissingHeader
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<RepositoryError>
impl From<crate::repository::RepositoryError> for ImportError {
    fn from(err: crate::repository::RepositoryError) -> Self {
        ImportError::Persistence(err.to_string())
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;
