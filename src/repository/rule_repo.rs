// ==========================================
// 分区运费计算系统 - 运费规则数据仓储
// ==========================================
// 对齐: shipping_rule 表 (JOIN shipping_zone 取区域代码)
// 红线: Repository 不做业务逻辑,只做数据映射与记录级校验
// ==========================================

use crate::domain::rule::ShippingRule;
use crate::domain::types::ServiceType;
use crate::repository::error::{
    parse_db_timestamp, RepositoryError, RepositoryResult, DB_TIMESTAMP_FORMAT,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const RULE_COLUMNS: &str = "r.rule_id, r.zone_id, z.code, r.weight_min, r.weight_max, r.price, \
     r.service_type, r.is_active, r.effective_from, r.effective_to, r.description";

// ==========================================
// ShippingRuleRepository - 运费规则仓储
// ==========================================
pub struct ShippingRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

struct RuleRow {
    id: String,
    zone_id: String,
    zone_code: String,
    weight_min: f64,
    weight_max: f64,
    price: f64,
    service_type: String,
    is_active: bool,
    effective_from: Option<String>,
    effective_to: Option<String>,
    description: Option<String>,
}

impl RuleRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            zone_id: row.get(1)?,
            zone_code: row.get(2)?,
            weight_min: row.get(3)?,
            weight_max: row.get(4)?,
            price: row.get(5)?,
            service_type: row.get(6)?,
            is_active: row.get::<_, i64>(7)? != 0,
            effective_from: row.get(8)?,
            effective_to: row.get(9)?,
            description: row.get(10)?,
        })
    }

    fn into_rule(self) -> RepositoryResult<ShippingRule> {
        let service_type =
            ServiceType::parse(&self.service_type).ok_or_else(|| RepositoryError::FieldValueError {
                field: "service_type".to_string(),
                message: format!("rule={}: 未知服务类型 '{}'", self.id, self.service_type),
            })?;

        let effective_from = self
            .effective_from
            .as_deref()
            .map(|raw| parse_db_timestamp("effective_from", raw).map(|t| t.and_utc()))
            .transpose()?;
        let effective_to = self
            .effective_to
            .as_deref()
            .map(|raw| parse_db_timestamp("effective_to", raw).map(|t| t.and_utc()))
            .transpose()?;

        Ok(ShippingRule {
            id: self.id,
            zone_id: self.zone_id,
            zone_code: self.zone_code,
            weight_min: self.weight_min,
            weight_max: self.weight_max,
            price: self.price,
            service_type,
            is_active: self.is_active,
            effective_from,
            effective_to,
            description: self.description,
        })
    }
}

fn format_ts(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.format(DB_TIMESTAMP_FORMAT).to_string())
}

impl ShippingRuleRepository {
    /// 创建新的运费规则仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn query_rules(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> RepositoryResult<Vec<ShippingRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, RuleRow::from_row)?;

        let mut rules = Vec::new();
        for row in rows {
            rules.push(row?.into_rule()?);
        }
        Ok(rules)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询当前可用规则
    ///
    /// 条件: 规则启用 + 所属区域启用 + (effective_to 为空 或 >= now)
    /// 排序: 区域 sort_order → 区域代码 → weight_min → rule_id
    pub fn list_effective(&self, now: DateTime<Utc>) -> RepositoryResult<Vec<ShippingRule>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM shipping_rule r
            JOIN shipping_zone z ON z.zone_id = r.zone_id
            WHERE r.is_active = 1
              AND z.is_active = 1
              AND (r.effective_to IS NULL OR r.effective_to >= ?1)
            ORDER BY z.sort_order ASC, z.code ASC, r.weight_min ASC, r.rule_id ASC
            "#,
            RULE_COLUMNS
        );
        let now_str = now.format(DB_TIMESTAMP_FORMAT).to_string();
        self.query_rules(&sql, &[&now_str])
    }

    /// 查询某区域全部规则（含停用/过期，供管理端使用）
    pub fn list_by_zone_code(&self, zone_code: &str) -> RepositoryResult<Vec<ShippingRule>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM shipping_rule r
            JOIN shipping_zone z ON z.zone_id = r.zone_id
            WHERE z.code = ?1
            ORDER BY r.service_type ASC, r.weight_min ASC, r.rule_id ASC
            "#,
            RULE_COLUMNS
        );
        self.query_rules(&sql, &[&zone_code])
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新增或更新规则（zone_code 字段不落库，以 zone_id 为准）
    pub fn upsert(&self, rule: &ShippingRule) -> RepositoryResult<String> {
        rule.validate().map_err(RepositoryError::ValidationError)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shipping_rule (
                rule_id, zone_id, weight_min, weight_max, price, service_type,
                is_active, effective_from, effective_to, description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(rule_id) DO UPDATE SET
                zone_id = excluded.zone_id,
                weight_min = excluded.weight_min,
                weight_max = excluded.weight_max,
                price = excluded.price,
                service_type = excluded.service_type,
                is_active = excluded.is_active,
                effective_from = excluded.effective_from,
                effective_to = excluded.effective_to,
                description = excluded.description,
                updated_at = datetime('now')
            "#,
            params![
                rule.id,
                rule.zone_id,
                rule.weight_min,
                rule.weight_max,
                rule.price,
                rule.service_type.as_str(),
                rule.is_active as i64,
                format_ts(rule.effective_from),
                format_ts(rule.effective_to),
                rule.description,
            ],
        )?;

        Ok(rule.id.clone())
    }

    /// 停用规则
    pub fn deactivate(&self, rule_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE shipping_rule SET is_active = 0, updated_at = datetime('now') WHERE rule_id = ?1",
            params![rule_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ShippingRule".to_string(),
                id: rule_id.to_string(),
            });
        }
        Ok(())
    }
}
