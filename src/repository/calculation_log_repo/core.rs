use crate::domain::calculation_log::CalculationLogEntry;
use crate::repository::error::{RepositoryError, RepositoryResult, DB_TIMESTAMP_FORMAT};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// CalculationLogRepository - 运费计算日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct CalculationLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CalculationLogRepository {
    /// 创建新的计算日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入计算日志
    ///
    /// # 返回
    /// - `Ok(log_id)`: 成功插入
    /// - `Err(...)`: 数据库错误
    pub fn insert(&self, entry: &CalculationLogEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO shipping_calculation_log (
                log_id, order_id, session_id, user_id, customer_state,
                total_weight, order_value, item_count, zone_id, rule_id,
                base_price, final_price, discount_amount, free_shipping_applied,
                calculation_method, details_json, response_time_ms, user_type, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                entry.log_id,
                entry.order_id,
                entry.session_id,
                entry.user_id,
                entry.customer_state,
                entry.total_weight,
                entry.order_value,
                entry.item_count,
                entry.zone_id,
                entry.rule_id,
                entry.base_price,
                entry.final_price,
                entry.discount_amount,
                entry.free_shipping_applied as i64,
                entry.calculation_method.as_str(),
                entry.details_json.as_ref().map(|v| v.to_string()),
                entry.response_time_ms,
                entry.user_type.as_str(),
                entry.created_at.format(DB_TIMESTAMP_FORMAT).to_string(),
            ],
        )?;

        Ok(entry.log_id.clone())
    }
}
