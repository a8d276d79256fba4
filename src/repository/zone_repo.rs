// ==========================================
// 分区运费计算系统 - 配送区域数据仓储
// ==========================================
// 对齐: shipping_zone 表
// 红线: Repository 不做业务逻辑,只做数据映射与记录级校验
// ==========================================

use crate::domain::zone::{ShippingZone, ZoneFeatures};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const ZONE_COLUMNS: &str = "zone_id, code, name, states_json, multiplier, \
     delivery_time_min, delivery_time_max, sort_order, is_active, features_json";

// ==========================================
// ShippingZoneRepository - 配送区域仓储
// ==========================================
pub struct ShippingZoneRepository {
    conn: Arc<Mutex<Connection>>,
}

/// 数据库行的原始形态（JSON 字段尚未解析）
struct ZoneRow {
    id: String,
    code: String,
    name: String,
    states_json: String,
    multiplier: f64,
    delivery_time_min: i64,
    delivery_time_max: i64,
    sort_order: i32,
    is_active: bool,
    features_json: Option<String>,
}

impl ZoneRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            states_json: row.get(3)?,
            multiplier: row.get(4)?,
            delivery_time_min: row.get(5)?,
            delivery_time_max: row.get(6)?,
            sort_order: row.get(7)?,
            is_active: row.get::<_, i64>(8)? != 0,
            features_json: row.get(9)?,
        })
    }

    fn into_zone(self) -> RepositoryResult<ShippingZone> {
        let states: Vec<String> =
            serde_json::from_str(&self.states_json).map_err(|e| RepositoryError::FieldValueError {
                field: "states_json".to_string(),
                message: format!("zone={}: {}", self.code, e),
            })?;

        let features = match self.features_json.as_deref() {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<ZoneFeatures>(raw)
                .map_err(|e| RepositoryError::FieldValueError {
                    field: "features_json".to_string(),
                    message: format!("zone={}: {}", self.code, e),
                })?,
            _ => ZoneFeatures::default(),
        };

        Ok(ShippingZone {
            id: self.id,
            code: self.code,
            name: self.name,
            states,
            multiplier: self.multiplier,
            delivery_time_min: non_negative_days("delivery_time_min", self.delivery_time_min)?,
            delivery_time_max: non_negative_days("delivery_time_max", self.delivery_time_max)?,
            sort_order: self.sort_order,
            is_active: self.is_active,
            features,
        })
    }
}

fn non_negative_days(field: &str, value: i64) -> RepositoryResult<u32> {
    u32::try_from(value).map_err(|_| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("送达天数不能为负: {}", value),
    })
}

impl ShippingZoneRepository {
    /// 创建新的配送区域仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询所有启用区域（按 sort_order 排序）
    pub fn list_active(&self) -> RepositoryResult<Vec<ShippingZone>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM shipping_zone WHERE is_active = 1 ORDER BY sort_order ASC, code ASC",
            ZONE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], ZoneRow::from_row)?;

        let mut zones = Vec::new();
        for row in rows {
            zones.push(row?.into_zone()?);
        }
        Ok(zones)
    }

    /// 按区域代码查询（含停用区域）
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<ShippingZone>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM shipping_zone WHERE code = ?1", ZONE_COLUMNS);
        let row = conn
            .query_row(&sql, params![code], ZoneRow::from_row)
            .optional()?;
        row.map(ZoneRow::into_zone).transpose()
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新增或更新区域
    ///
    /// # 返回
    /// - `Ok(zone_id)`
    /// - `Err(ValidationError)`: 记录级约束不满足
    pub fn upsert(&self, zone: &ShippingZone) -> RepositoryResult<String> {
        zone.validate().map_err(RepositoryError::ValidationError)?;

        let states_json = serde_json::to_string(&zone.states)?;
        let features_json = serde_json::to_string(&zone.features)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shipping_zone (
                zone_id, code, name, states_json, multiplier,
                delivery_time_min, delivery_time_max, sort_order, is_active, features_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(zone_id) DO UPDATE SET
                code = excluded.code,
                name = excluded.name,
                states_json = excluded.states_json,
                multiplier = excluded.multiplier,
                delivery_time_min = excluded.delivery_time_min,
                delivery_time_max = excluded.delivery_time_max,
                sort_order = excluded.sort_order,
                is_active = excluded.is_active,
                features_json = excluded.features_json,
                updated_at = datetime('now')
            "#,
            params![
                zone.id,
                zone.code,
                zone.name,
                states_json,
                zone.multiplier,
                zone.delivery_time_min,
                zone.delivery_time_max,
                zone.sort_order,
                zone.is_active as i64,
                features_json,
            ],
        )?;

        Ok(zone.id.clone())
    }

    /// 停用区域
    pub fn deactivate(&self, zone_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE shipping_zone SET is_active = 0, updated_at = datetime('now') WHERE zone_id = ?1",
            params![zone_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ShippingZone".to_string(),
                id: zone_id.to_string(),
            });
        }
        Ok(())
    }
}
