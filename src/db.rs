// ==========================================
// 分区运费计算系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少日志并发写入时的偶发 busy 错误
// - 提供建表语句（幂等），供应用启动与测试共用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化运费相关表（幂等）
///
/// 表:
/// - shipping_zone: 配送区域 (states_json / features_json 为 JSON 文本)
/// - shipping_rule: 重量分档规则
/// - config_kv: 全局配置 (免运费门槛等)
/// - shipping_calculation_log: 计算日志 (只追加)
pub fn init_shipping_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS shipping_zone (
            zone_id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            states_json TEXT NOT NULL,
            multiplier REAL NOT NULL DEFAULT 1.0,
            delivery_time_min INTEGER NOT NULL,
            delivery_time_max INTEGER NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            features_json TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS shipping_rule (
            rule_id TEXT PRIMARY KEY,
            zone_id TEXT NOT NULL REFERENCES shipping_zone(zone_id) ON DELETE CASCADE,
            weight_min REAL NOT NULL,
            weight_max REAL NOT NULL,
            price REAL NOT NULL,
            service_type TEXT NOT NULL DEFAULT 'STANDARD',
            is_active INTEGER NOT NULL DEFAULT 1,
            effective_from TEXT,
            effective_to TEXT,
            description TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_shipping_rule_zone
            ON shipping_rule(zone_id, weight_min);

        CREATE TABLE IF NOT EXISTS shipping_calculation_log (
            log_id TEXT PRIMARY KEY,
            order_id TEXT,
            session_id TEXT,
            user_id TEXT,
            customer_state TEXT NOT NULL,
            total_weight REAL NOT NULL,
            order_value REAL NOT NULL,
            item_count INTEGER NOT NULL,
            zone_id TEXT,
            rule_id TEXT,
            base_price REAL NOT NULL,
            final_price REAL NOT NULL,
            discount_amount REAL NOT NULL,
            free_shipping_applied INTEGER NOT NULL,
            calculation_method TEXT NOT NULL,
            details_json TEXT,
            response_time_ms INTEGER NOT NULL,
            user_type TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_shipping_calc_log_created
            ON shipping_calculation_log(created_at);
        CREATE INDEX IF NOT EXISTS idx_shipping_calc_log_order
            ON shipping_calculation_log(order_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "ZONE_SHIPPING_DB_PATH";

/// 默认数据库路径
///
/// 优先级: ZONE_SHIPPING_DB_PATH → 用户数据目录 → ./zone_shipping.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./zone_shipping.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("zone-shipping");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("zone_shipping.db"),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "数据目录创建失败,使用当前目录"),
        }
    }

    path.to_string_lossy().to_string()
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);
        init_shipping_schema(&conn).unwrap();
        init_shipping_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }
}
