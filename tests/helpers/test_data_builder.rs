// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{DateTime, Utc};
use zone_shipping::domain::{ServiceType, ShippingRule, ShippingZone, ZoneFeatures};

// ==========================================
// ShippingZone 构建器
// ==========================================

pub struct ZoneBuilder {
    zone: ShippingZone,
}

impl ZoneBuilder {
    pub fn new(code: &str) -> Self {
        Self {
            zone: ShippingZone {
                id: format!("zone-{}", code.to_lowercase()),
                code: code.to_string(),
                name: code.to_string(),
                states: vec![],
                multiplier: 1.0,
                delivery_time_min: 2,
                delivery_time_max: 4,
                sort_order: 1,
                is_active: true,
                features: ZoneFeatures::default(),
            },
        }
    }

    pub fn states(mut self, states: &[&str]) -> Self {
        self.zone.states = states.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.zone.multiplier = multiplier;
        self
    }

    pub fn delivery(mut self, min: u32, max: u32) -> Self {
        self.zone.delivery_time_min = min;
        self.zone.delivery_time_max = max;
        self
    }

    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.zone.sort_order = sort_order;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.zone.is_active = false;
        self
    }

    pub fn build(self) -> ShippingZone {
        self.zone
    }
}

// ==========================================
// ShippingRule 构建器
// ==========================================

pub struct RuleBuilder {
    rule: ShippingRule,
}

impl RuleBuilder {
    /// zone_code 同时决定 zone_id（与 ZoneBuilder 的 ID 规则一致）
    pub fn new(id: &str, zone_code: &str) -> Self {
        Self {
            rule: ShippingRule {
                id: id.to_string(),
                zone_id: format!("zone-{}", zone_code.to_lowercase()),
                zone_code: zone_code.to_string(),
                weight_min: 0.0,
                weight_max: 1.0,
                price: 5.0,
                service_type: ServiceType::Standard,
                is_active: true,
                effective_from: None,
                effective_to: None,
                description: None,
            },
        }
    }

    pub fn band(mut self, min: f64, max: f64) -> Self {
        self.rule.weight_min = min;
        self.rule.weight_max = max;
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.rule.price = price;
        self
    }

    pub fn service(mut self, service_type: ServiceType) -> Self {
        self.rule.service_type = service_type;
        self
    }

    pub fn effective(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.rule.effective_from = from;
        self.rule.effective_to = to;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.rule.is_active = false;
        self
    }

    pub fn build(self) -> ShippingRule {
        self.rule
    }
}

/// 标准两区测试数据: PENINSULAR (×1.0) + EAST_MALAYSIA (×1.875)
pub fn two_zone_fixture() -> (Vec<ShippingZone>, Vec<ShippingRule>) {
    let zones = vec![
        ZoneBuilder::new("PENINSULAR")
            .states(&["JOH", "KDH", "KTN", "MLK", "NSN", "PHG", "PNG", "PRK", "PLS", "SEL", "TRG", "KUL", "PJY"])
            .sort_order(1)
            .build(),
        ZoneBuilder::new("EAST_MALAYSIA")
            .states(&["SBH", "SWK", "LBN"])
            .multiplier(1.875)
            .delivery(3, 7)
            .sort_order(2)
            .build(),
    ];

    let rules = vec![
        RuleBuilder::new("p-std-1", "PENINSULAR").band(0.0, 1.0).price(5.0).build(),
        RuleBuilder::new("p-std-2", "PENINSULAR").band(1.01, 2.0).price(7.0).build(),
        RuleBuilder::new("p-std-3", "PENINSULAR").band(2.01, 5.0).price(10.0).build(),
        RuleBuilder::new("e-std-1", "EAST_MALAYSIA").band(0.0, 1.0).price(8.0).build(),
        RuleBuilder::new("e-std-2", "EAST_MALAYSIA").band(1.01, 2.0).price(10.0).build(),
        RuleBuilder::new("e-std-3", "EAST_MALAYSIA").band(2.01, 5.0).price(14.0).build(),
    ];

    (zones, rules)
}
