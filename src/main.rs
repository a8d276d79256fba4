// ==========================================
// 分区运费计算系统 - 命令行入口
// ==========================================
// 用法:
//   zone-shipping <region> <weight_kg> <order_value> [service_type]
// 数据库: ZONE_SHIPPING_DB_PATH 或用户数据目录；空库自动写入默认区域
// ==========================================

use anyhow::{bail, Context, Result};
use std::sync::{Arc, Mutex};
use zone_shipping::db::{get_default_db_path, init_shipping_schema, open_sqlite_connection};
use zone_shipping::repository::ShippingZoneRepository;
use zone_shipping::{
    logging, seed, ServiceType, ShippingCalculationRequest, ShippingCalculator,
    ShippingRepositories,
};

const USAGE: &str = "用法: zone-shipping <region> <weight_kg> <order_value> [service_type]";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 4 {
        bail!("{}", USAGE);
    }

    let region = args[0].clone();
    let weight: f64 = args[1]
        .parse()
        .with_context(|| format!("重量格式错误: {}", args[1]))?;
    let order_value: f64 = args[2]
        .parse()
        .with_context(|| format!("订单金额格式错误: {}", args[2]))?;
    let service_type = match args.get(3) {
        Some(raw) => Some(
            ServiceType::parse(raw).with_context(|| format!("未知服务类型: {}", raw))?,
        ),
        None => None,
    };

    tracing::info!("{} v{}", zone_shipping::APP_NAME, zone_shipping::VERSION);

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_shipping_schema(&conn).context("建表失败")?;
    let conn = Arc::new(Mutex::new(conn));

    let zones = ShippingZoneRepository::new(conn.clone()).list_active()?;
    if zones.is_empty() {
        let summary = seed::seed_default_malaysia_zones(conn.clone())?;
        tracing::info!(zones = summary.zones, rules = summary.rules, "空库,已写入默认区域");
    }

    let repos = ShippingRepositories::from_sqlite(conn)
        .map_err(|e| anyhow::anyhow!("数据源初始化失败: {}", e))?;
    let calculator = ShippingCalculator::new(repos);

    let mut request = ShippingCalculationRequest::new(region, weight, order_value);
    if let Some(service_type) = service_type {
        request = request.with_service_type(service_type);
    }

    let result = calculator.calculate_shipping(&request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
