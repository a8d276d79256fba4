// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、默认数据写入、日志等待等功能
// ==========================================

#![allow(dead_code)]

use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;
use zone_shipping::db::{init_shipping_schema, open_sqlite_connection};
use zone_shipping::repository::CalculationLogRepository;
use zone_shipping::seed::seed_default_malaysia_zones;
use zone_shipping::{ShippingCalculator, ShippingRepositories};

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
        .ok_or("临时文件路径不是合法 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_shipping_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    Ok(Arc::new(Mutex::new(open_sqlite_connection(db_path)?)))
}

/// 创建已写入默认马来西亚区域/规则的测试库
pub fn create_seeded_db() -> Result<(NamedTempFile, Arc<Mutex<Connection>>), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let conn = open_shared(&db_path)?;
    seed_default_malaysia_zones(conn.clone())?;
    Ok((temp_file, conn))
}

/// 基于 SQLite 连接创建计算器（含计算日志落地）
pub fn create_calculator(conn: Arc<Mutex<Connection>>) -> ShippingCalculator {
    let repos = ShippingRepositories::from_sqlite(conn).expect("Failed to build repositories");
    ShippingCalculator::new(repos)
}

/// 等待计算日志条数达到预期（日志为异步写入）
///
/// 超时后返回当前条数，由调用方断言
pub async fn wait_for_log_count(repo: &CalculationLogRepository, expected: i64) -> i64 {
    let mut current = 0;
    for _ in 0..100 {
        current = repo.count().expect("Failed to count calculation logs");
        if current >= expected {
            return current;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    current
}
