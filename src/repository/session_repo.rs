// ==========================================
// 厨卫展厅管理后台 - 会话数据仓储
// ==========================================
// 职责: 按会话令牌查询登录用户（sessions 表）
// 说明: 会话由登录模块写入；这里只读（create 仅供初始化/测试）
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::session::SessionUser;
use crate::domain::types::UserRole;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SessionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SessionRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按令牌查找会话（不判断过期，由调用方决定）
    pub fn find_by_token(&self, token: &str) -> RepositoryResult<Option<SessionUser>> {
        let conn = self.get_conn()?;
        let session = conn
            .query_row(
                "SELECT user_id, email, role, expires_at FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    let role_raw: String = row.get(2)?;
                    let role: UserRole = role_raw.parse().map_err(|e: String| {
                        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
                    })?;
                    Ok(SessionUser {
                        user_id: row.get(0)?,
                        email: row.get(1)?,
                        role,
                        expires_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    /// 写入会话
    pub fn create(
        &self,
        token: &str,
        user_id: &str,
        email: Option<&str>,
        role: UserRole,
        expires_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO sessions (token, user_id, email, role, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![token, user_id, email, role.as_str(), expires_at],
        )?;
        Ok(())
    }
}
