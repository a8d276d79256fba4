// ==========================================
// 分区运费计算系统 - 默认数据初始化
// ==========================================
// 职责: 写入马来西亚默认两区配置（西马 / 东马）及重量分档规则
// 说明: 使用固定 ID + upsert，可重复执行
// ==========================================

use crate::domain::rule::ShippingRule;
use crate::domain::types::ServiceType;
use crate::domain::zone::{ShippingZone, ZoneFeatures};
use crate::repository::{RepositoryResult, ShippingRuleRepository, ShippingZoneRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub const PENINSULAR_ZONE_CODE: &str = "PENINSULAR";
pub const EAST_MALAYSIA_ZONE_CODE: &str = "EAST_MALAYSIA";

/// 重量分档 (kg)；边界重量由匹配器按跨度/ID 裁决给较低档
const WEIGHT_BANDS: [(f64, f64); 5] = [(0.0, 1.0), (1.0, 2.0), (2.0, 5.0), (5.0, 10.0), (10.0, 30.0)];

/// 各服务类型基础价（与 WEIGHT_BANDS 一一对应，None 表示该档不提供）
type PriceTable = [(ServiceType, [Option<f64>; 5]); 3];

const PENINSULAR_PRICES: PriceTable = [
    (ServiceType::Standard, [Some(5.0), Some(7.0), Some(10.0), Some(15.0), Some(25.0)]),
    (ServiceType::Express, [Some(8.0), Some(11.0), Some(16.0), None, None]),
    (ServiceType::Economy, [None, None, Some(8.0), Some(12.0), Some(20.0)]),
];

const EAST_MALAYSIA_PRICES: PriceTable = [
    (ServiceType::Standard, [Some(8.0), Some(10.0), Some(14.0), Some(20.0), Some(32.0)]),
    (ServiceType::Express, [Some(12.0), Some(15.0), Some(21.0), None, None]),
    (ServiceType::Economy, [None, None, Some(11.0), Some(16.0), Some(26.0)]),
];

/// 初始化结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub zones: usize,
    pub rules: usize,
}

/// 默认区域定义
pub fn default_malaysia_zones() -> Vec<ShippingZone> {
    let codes = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    vec![
        ShippingZone {
            id: "zone-peninsular".to_string(),
            code: PENINSULAR_ZONE_CODE.to_string(),
            name: "Peninsular Malaysia".to_string(),
            states: codes(&[
                "JOH", "KDH", "KTN", "MLK", "NSN", "PHG", "PNG", "PRK", "PLS", "SEL", "TRG", "KUL",
                "PJY",
            ]),
            multiplier: 1.0,
            delivery_time_min: 2,
            delivery_time_max: 4,
            sort_order: 1,
            is_active: true,
            features: ZoneFeatures {
                same_day: true,
                cod: true,
                insurance: true,
                signature_required: true,
                pickup: true,
            },
        },
        ShippingZone {
            id: "zone-east-malaysia".to_string(),
            code: EAST_MALAYSIA_ZONE_CODE.to_string(),
            name: "East Malaysia".to_string(),
            states: codes(&["SBH", "SWK", "LBN"]),
            multiplier: 1.875,
            delivery_time_min: 3,
            delivery_time_max: 7,
            sort_order: 2,
            is_active: true,
            features: ZoneFeatures {
                same_day: false,
                cod: false,
                insurance: true,
                signature_required: true,
                pickup: true,
            },
        },
    ]
}

/// 默认规则定义
pub fn default_malaysia_rules() -> Vec<ShippingRule> {
    let mut rules = Vec::new();
    for zone in default_malaysia_zones() {
        let table = if zone.code == EAST_MALAYSIA_ZONE_CODE {
            &EAST_MALAYSIA_PRICES
        } else {
            &PENINSULAR_PRICES
        };

        for (service_type, prices) in table {
            for (idx, (band, price)) in WEIGHT_BANDS.iter().zip(prices.iter()).enumerate() {
                let Some(price) = price else { continue };
                rules.push(ShippingRule {
                    id: format!(
                        "rule-{}-{}-{:02}",
                        zone.code.to_lowercase(),
                        service_type.as_str().to_lowercase(),
                        idx + 1
                    ),
                    zone_id: zone.id.clone(),
                    zone_code: zone.code.clone(),
                    weight_min: band.0,
                    weight_max: band.1,
                    price: *price,
                    service_type: *service_type,
                    is_active: true,
                    effective_from: None,
                    effective_to: None,
                    description: Some(format!("{} {} {}-{}kg", zone.name, service_type, band.0, band.1)),
                });
            }
        }
    }
    rules
}

/// 写入默认马来西亚区域与规则
pub fn seed_default_malaysia_zones(conn: Arc<Mutex<Connection>>) -> RepositoryResult<SeedSummary> {
    let zone_repo = ShippingZoneRepository::new(conn.clone());
    let rule_repo = ShippingRuleRepository::new(conn);

    let zones = default_malaysia_zones();
    for zone in &zones {
        zone_repo.upsert(zone)?;
    }

    let rules = default_malaysia_rules();
    for rule in &rules {
        rule_repo.upsert(rule)?;
    }

    tracing::info!(zones = zones.len(), rules = rules.len(), "默认运费区域与规则已写入");

    Ok(SeedSummary {
        zones: zones.len(),
        rules: rules.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_shipping_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_seed_is_idempotent() {
        let conn = conn();
        let first = seed_default_malaysia_zones(conn.clone()).unwrap();
        let second = seed_default_malaysia_zones(conn.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.zones, 2);

        let zones = ShippingZoneRepository::new(conn.clone()).list_active().unwrap();
        assert_eq!(zones.len(), 2);
        let rules = ShippingRuleRepository::new(conn)
            .list_by_zone_code(EAST_MALAYSIA_ZONE_CODE)
            .unwrap();
        assert_eq!(rules.len(), 11);
    }

    #[test]
    fn test_default_zones_are_disjoint_and_valid() {
        let zones = default_malaysia_zones();
        for zone in &zones {
            assert!(zone.validate().is_ok());
        }
        for state in &zones[0].states {
            assert!(!zones[1].covers_state(state));
        }
        assert_eq!(zones[0].states.len() + zones[1].states.len(), 16);
    }

    #[test]
    fn test_default_rules_are_valid() {
        for rule in default_malaysia_rules() {
            assert!(rule.validate().is_ok(), "{}", rule.id);
        }
    }
}
