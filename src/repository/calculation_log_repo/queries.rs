use super::core::CalculationLogRepository;
use crate::domain::calculation_log::{CalculationLogEntry, CalculationLogSummary};
use crate::domain::types::{CalculationMethod, UserType};
use crate::repository::error::{RepositoryResult, DB_TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

const LOG_COLUMNS: &str = r#"
    log_id, order_id, session_id, user_id, customer_state,
    total_weight, order_value, item_count, zone_id, rule_id,
    base_price, final_price, discount_amount, free_shipping_applied,
    calculation_method, details_json, response_time_ms, user_type, created_at
"#;

impl CalculationLogRepository {
    // ==========================================
    // 查询操作 (运营分析)
    // ==========================================

    /// 按 log_id 查询单条日志
    pub fn find_by_id(&self, log_id: &str) -> RepositoryResult<Option<CalculationLogEntry>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM shipping_calculation_log WHERE log_id = ?",
            LOG_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![log_id], |row| self.map_row(row)) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询某订单的所有计算记录
    pub fn find_by_order_id(&self, order_id: &str) -> RepositoryResult<Vec<CalculationLogEntry>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM shipping_calculation_log WHERE order_id = ? ORDER BY created_at DESC, log_id ASC",
            LOG_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map(params![order_id], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries)
    }

    /// 查询最近的计算记录
    pub fn find_recent(&self, limit: usize) -> RepositoryResult<Vec<CalculationLogEntry>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM shipping_calculation_log ORDER BY created_at DESC, log_id ASC LIMIT ?",
            LOG_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map(params![limit as i64], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries)
    }

    /// 日志总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM shipping_calculation_log", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    /// 汇总指定时间之后的计算记录
    pub fn summary_since(&self, since: NaiveDateTime) -> RepositoryResult<CalculationLogSummary> {
        let conn = self.get_conn()?;

        let summary = conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN calculation_method = 'STANDARD' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN calculation_method = 'FALLBACK' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN calculation_method = 'EMERGENCY' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(free_shipping_applied), 0),
                COALESCE(AVG(response_time_ms), 0.0),
                COALESCE(SUM(final_price), 0.0)
            FROM shipping_calculation_log
            WHERE created_at >= ?
            "#,
            params![since.format(DB_TIMESTAMP_FORMAT).to_string()],
            |row| {
                Ok(CalculationLogSummary {
                    total_count: row.get(0)?,
                    standard_count: row.get(1)?,
                    fallback_count: row.get(2)?,
                    emergency_count: row.get(3)?,
                    free_shipping_count: row.get(4)?,
                    avg_response_time_ms: row.get(5)?,
                    total_shipping_revenue: row.get(6)?,
                })
            },
        )?;

        Ok(summary)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 映射数据库行到 CalculationLogEntry
    fn map_row(&self, row: &Row) -> SqliteResult<CalculationLogEntry> {
        let created_at_str: String = row.get(18)?;
        let created_at = NaiveDateTime::parse_from_str(&created_at_str, DB_TIMESTAMP_FORMAT)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(18, rusqlite::types::Type::Text, Box::new(e))
            })?;

        // 解析 JSON 字段
        let details_json = row
            .get::<_, Option<String>>(15)?
            .and_then(|s| serde_json::from_str(&s).ok());

        let method: String = row.get(14)?;
        let user_type = match row.get::<_, String>(17)?.as_str() {
            "MEMBER" => UserType::Member,
            _ => UserType::Guest,
        };

        Ok(CalculationLogEntry {
            log_id: row.get(0)?,
            order_id: row.get(1)?,
            session_id: row.get(2)?,
            user_id: row.get(3)?,
            customer_state: row.get(4)?,
            total_weight: row.get(5)?,
            order_value: row.get(6)?,
            item_count: row.get(7)?,
            zone_id: row.get(8)?,
            rule_id: row.get(9)?,
            base_price: row.get(10)?,
            final_price: row.get(11)?,
            discount_amount: row.get(12)?,
            free_shipping_applied: row.get::<_, i64>(13)? != 0,
            calculation_method: CalculationMethod::from_str(&method),
            details_json,
            response_time_ms: row.get(16)?,
            user_type,
            created_at,
        })
    }
}
