// ==========================================
// 厨卫展厅管理后台 - 会话用户
// ==========================================

use crate::domain::types::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
