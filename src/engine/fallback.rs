// ==========================================
// 分区运费计算系统 - 兜底估算
// ==========================================
// 职责: 缓存/区域/规则任一环节失败时给出保守运费
// 红线: 不依赖缓存,缓存从未初始化也必须可用
// ==========================================

use crate::domain::calculation::{
    CalculationDetails, DeliveryDays, ShippingCalculationRequest, ShippingCalculationResult,
};
use crate::domain::types::{CalculationMethod, ServiceType};
use crate::engine::zone_resolver::normalize_region;

/// 东马地区代码（规范化后）
pub const EAST_MALAYSIA_STATES: [&str; 3] = ["SBH", "SWK", "LBN"];

/// 西马兜底运费
pub const PENINSULAR_FLAT_RATE: f64 = 8.0;
/// 东马兜底运费
pub const EAST_MALAYSIA_FLAT_RATE: f64 = 15.0;

const PENINSULAR_DELIVERY_DAYS: DeliveryDays = DeliveryDays { min: 2, max: 4 };
const EAST_MALAYSIA_DELIVERY_DAYS: DeliveryDays = DeliveryDays { min: 3, max: 7 };

/// 是否属于东马（高运费地区）
pub fn is_east_malaysia(state_code: &str) -> bool {
    EAST_MALAYSIA_STATES.contains(&state_code)
}

/// 兜底估算
///
/// # 参数
/// - request: 原始请求
/// - free_shipping_threshold: 免运费门槛（缓存可用时取缓存值，否则默认值）
/// - reason: 触发降级的原因
///
/// # 返回
/// - 地区为空 → EMERGENCY，按东马费率
/// - 其他 → FALLBACK，按东/西马费率
pub fn estimate(
    request: &ShippingCalculationRequest,
    free_shipping_threshold: f64,
    reason: &str,
) -> ShippingCalculationResult {
    let state = normalize_region(&request.region);

    let (method, east) = if state.is_empty() {
        (CalculationMethod::Emergency, true)
    } else {
        (CalculationMethod::Fallback, is_east_malaysia(&state))
    };

    let (zone_name, flat_rate, delivery_days) = if east {
        ("East Malaysia", EAST_MALAYSIA_FLAT_RATE, EAST_MALAYSIA_DELIVERY_DAYS)
    } else {
        ("Peninsular Malaysia", PENINSULAR_FLAT_RATE, PENINSULAR_DELIVERY_DAYS)
    };

    let free_shipping_applied = request.order_value >= free_shipping_threshold;
    let final_price = if free_shipping_applied { 0.0 } else { flat_rate };
    let service_type = request.service_type.unwrap_or_default();

    ShippingCalculationResult {
        zone_id: None,
        zone_name: zone_name.to_string(),
        rule_id: None,
        base_price: flat_rate,
        final_price,
        delivery_days,
        free_shipping_applied,
        calculation_method: method,
        details: CalculationDetails {
            weight_band: "flat".to_string(),
            zone_multiplier: 1.0,
            original_price: flat_rate,
            free_shipping_threshold,
            service_type: ServiceType::Standard,
            requested_service_type: Some(service_type),
            total_shipping_weight: None,
            original_item_weight: None,
            packaging_weight: None,
            packaging_preference: None,
            fallback_reason: Some(reason.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_east_malaysia_rate_higher() {
        let east = estimate(&ShippingCalculationRequest::new("SBH", 1.0, 100.0), 150.0, "test");
        let west = estimate(&ShippingCalculationRequest::new("JOH", 1.0, 100.0), 150.0, "test");

        assert_eq!(east.calculation_method, CalculationMethod::Fallback);
        assert_eq!(west.calculation_method, CalculationMethod::Fallback);
        assert!(east.final_price > west.final_price);
        assert_eq!(east.final_price, EAST_MALAYSIA_FLAT_RATE);
        assert_eq!(east.delivery_days, DeliveryDays { min: 3, max: 7 });
        assert_eq!(west.delivery_days, DeliveryDays { min: 2, max: 4 });
    }

    #[test]
    fn test_full_name_recognized() {
        for region in ["Sarawak", "sabah", "WP LABUAN", "srw"] {
            let r = estimate(&ShippingCalculationRequest::new(region, 1.0, 10.0), 150.0, "test");
            assert_eq!(r.final_price, EAST_MALAYSIA_FLAT_RATE, "{}", region);
        }
    }

    #[test]
    fn test_free_shipping_threshold_applies() {
        let r = estimate(&ShippingCalculationRequest::new("SBH", 1.0, 150.0), 150.0, "test");
        assert!(r.free_shipping_applied);
        assert_eq!(r.final_price, 0.0);
        assert_eq!(r.base_price, EAST_MALAYSIA_FLAT_RATE);
    }

    #[test]
    fn test_blank_region_is_emergency() {
        let r = estimate(&ShippingCalculationRequest::new("   ", 1.0, 10.0), 150.0, "no region");
        assert_eq!(r.calculation_method, CalculationMethod::Emergency);
        assert_eq!(r.final_price, EAST_MALAYSIA_FLAT_RATE);
        assert_eq!(r.details.fallback_reason.as_deref(), Some("no region"));
    }
}
