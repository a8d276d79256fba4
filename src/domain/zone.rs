// ==========================================
// 分区运费计算系统 - 配送区域领域模型
// ==========================================
// 对齐: shipping_zone 表
// 红线: 同一地区代码最多属于一个启用区域
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ShippingZone - 配送区域
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingZone {
    // ===== 主键 =====
    pub id: String,   // 区域ID
    pub code: String, // 区域代码 (如 PENINSULAR / EAST_MALAYSIA)
    pub name: String, // 区域名称

    // ===== 覆盖范围 =====
    pub states: Vec<String>, // 成员地区代码 (非空)

    // ===== 定价与时效 =====
    pub multiplier: f64,        // 价格系数 (> 0)
    pub delivery_time_min: u32, // 最短送达天数
    pub delivery_time_max: u32, // 最长送达天数

    // ===== 管理字段 =====
    pub sort_order: i32,
    pub is_active: bool,
    #[serde(default)]
    pub features: ZoneFeatures,
}

// ==========================================
// ZoneFeatures - 区域服务能力
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneFeatures {
    pub same_day: bool,           // 当日达
    pub cod: bool,                // 货到付款
    pub insurance: bool,          // 保价
    pub signature_required: bool, // 签收
    pub pickup: bool,             // 自提
}

impl ShippingZone {
    /// 区域是否覆盖某地区代码（代码比较大小写不敏感）
    pub fn covers_state(&self, state_code: &str) -> bool {
        self.states
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(state_code))
    }

    /// 校验记录级约束
    ///
    /// # 返回
    /// - Ok(()): 合法
    /// - Err(String): 违反原因
    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err(format!("区域代码为空: id={}", self.id));
        }
        if self.states.iter().all(|s| s.trim().is_empty()) {
            return Err(format!("区域未配置任何地区: code={}", self.code));
        }
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(format!(
                "区域价格系数必须为正数: code={}, multiplier={}",
                self.code, self.multiplier
            ));
        }
        if self.delivery_time_min > self.delivery_time_max {
            return Err(format!(
                "送达天数范围无效: code={}, min={} > max={}",
                self.code, self.delivery_time_min, self.delivery_time_max
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> ShippingZone {
        ShippingZone {
            id: "z1".to_string(),
            code: "PENINSULAR".to_string(),
            name: "Peninsular Malaysia".to_string(),
            states: vec!["JOH".to_string(), "sel".to_string()],
            multiplier: 1.0,
            delivery_time_min: 2,
            delivery_time_max: 4,
            sort_order: 1,
            is_active: true,
            features: ZoneFeatures::default(),
        }
    }

    #[test]
    fn test_covers_state_ignores_case() {
        let z = zone();
        assert!(z.covers_state("JOH"));
        assert!(z.covers_state("SEL"));
        assert!(!z.covers_state("SBH"));
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        assert!(zone().validate().is_ok());

        let mut z = zone();
        z.states.clear();
        assert!(z.validate().is_err());

        let mut z = zone();
        z.multiplier = 0.0;
        assert!(z.validate().is_err());

        let mut z = zone();
        z.delivery_time_min = 5;
        assert!(z.validate().is_err());
    }

    #[test]
    fn test_features_default_when_missing() {
        let json = r#"{"id":"z","code":"C","name":"N","states":["JOH"],"multiplier":1.0,
            "delivery_time_min":1,"delivery_time_max":2,"sort_order":0,"is_active":true}"#;
        let z: ShippingZone = serde_json::from_str(json).unwrap();
        assert_eq!(z.features, ZoneFeatures::default());
    }
}
