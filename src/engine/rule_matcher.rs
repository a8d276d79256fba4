// ==========================================
// 分区运费计算系统 - 运费规则匹配器
// ==========================================
// 职责: 区域 + 重量 + 服务类型 → 唯一适用规则
// 顺序（命中即止）:
// 1) 生效窗口过滤
// 2) 重量区间过滤 (min <= w <= max)，无候选 → None
// 3) 服务类型精确匹配
// 4) 服务降级阶梯 OVERNIGHT > EXPRESS > STANDARD > ECONOMY
// 5) 区间跨度最小者优先，跨度相同按 rule_id 升序
// 红线: 纯函数，不修改缓存
// ==========================================

use crate::domain::rule::ShippingRule;
use crate::domain::types::ServiceType;
use crate::domain::zone::ShippingZone;
use crate::engine::cache::CacheSnapshot;
use crate::engine::error::{ShippingError, ShippingResult};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// 查找适用规则
///
/// # 参数
/// - zone: 已解析的区域
/// - weight: 计费重量 (kg，已含包装)
/// - service_type: 请求的服务类型
/// - effective_date: 生效判定时刻
///
/// # 返回
/// - Ok(Some(rule)): 命中
/// - Ok(None): 无规则覆盖该重量（调用方视为“无可用运费”）
/// - Err(InvalidInput): 重量非法
pub fn find_rule<'a>(
    snapshot: &'a CacheSnapshot,
    zone: &ShippingZone,
    weight: f64,
    service_type: ServiceType,
    effective_date: DateTime<Utc>,
) -> ShippingResult<Option<&'a ShippingRule>> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(ShippingError::InvalidInput(format!(
            "计费重量无效: {}",
            weight
        )));
    }

    let candidates: Vec<&ShippingRule> = snapshot
        .rules_for(&zone.code)
        .iter()
        .filter(|r| r.is_active && r.is_effective_at(effective_date))
        .filter(|r| r.covers_weight(weight))
        .collect();

    if candidates.is_empty() {
        tracing::debug!(zone = %zone.code, weight, "重量区间无候选规则");
        return Ok(None);
    }

    let delivered = if candidates.iter().any(|r| r.service_type == service_type) {
        service_type
    } else {
        let Some(substitute) = ServiceType::FALLBACK_LADDER
            .into_iter()
            .find(|s| candidates.iter().any(|r| r.service_type == *s))
        else {
            return Ok(None);
        };
        tracing::warn!(
            zone = %zone.code,
            weight,
            requested = %service_type,
            delivered = %substitute,
            "请求的服务类型无规则,按降级阶梯替换"
        );
        substitute
    };

    let chosen = candidates
        .into_iter()
        .filter(|r| r.service_type == delivered)
        .min_by(|a, b| compare_specificity(a, b));

    Ok(chosen)
}

/// 具体度比较: 跨度小者优先，跨度相同按 rule_id 升序
fn compare_specificity(a: &ShippingRule, b: &ShippingRule) -> Ordering {
    a.band_span()
        .total_cmp(&b.band_span())
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zone::ZoneFeatures;
    use chrono::{Duration, TimeZone};

    fn zone() -> ShippingZone {
        ShippingZone {
            id: "z1".to_string(),
            code: "PENINSULAR".to_string(),
            name: "Peninsular".to_string(),
            states: vec!["JOH".to_string()],
            multiplier: 1.0,
            delivery_time_min: 2,
            delivery_time_max: 4,
            sort_order: 1,
            is_active: true,
            features: ZoneFeatures::default(),
        }
    }

    fn rule(id: &str, min: f64, max: f64, price: f64, service: ServiceType) -> ShippingRule {
        ShippingRule {
            id: id.to_string(),
            zone_id: "z1".to_string(),
            zone_code: "PENINSULAR".to_string(),
            weight_min: min,
            weight_max: max,
            price,
            service_type: service,
            is_active: true,
            effective_from: None,
            effective_to: None,
            description: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn snapshot(rules: Vec<ShippingRule>) -> CacheSnapshot {
        CacheSnapshot::build(vec![zone()], rules, 150.0, "PENINSULAR", now())
    }

    fn find(snap: &CacheSnapshot, weight: f64, service: ServiceType) -> Option<String> {
        find_rule(snap, &zone(), weight, service, now())
            .unwrap()
            .map(|r| r.id.clone())
    }

    #[test]
    fn test_weight_band_selection() {
        let snap = snapshot(vec![
            rule("r1", 0.0, 1.0, 5.0, ServiceType::Standard),
            rule("r2", 1.01, 2.0, 7.0, ServiceType::Standard),
        ]);
        assert_eq!(find(&snap, 0.5, ServiceType::Standard).as_deref(), Some("r1"));
        assert_eq!(find(&snap, 1.14, ServiceType::Standard).as_deref(), Some("r2"));
        assert_eq!(find(&snap, 2.5, ServiceType::Standard), None);
    }

    #[test]
    fn test_smallest_span_wins_on_overlap() {
        let snap = snapshot(vec![
            rule("wide", 0.0, 5.0, 9.0, ServiceType::Standard),
            rule("narrow", 0.5, 1.5, 6.0, ServiceType::Standard),
        ]);
        assert_eq!(find(&snap, 1.0, ServiceType::Standard).as_deref(), Some("narrow"));
        assert_eq!(find(&snap, 3.0, ServiceType::Standard).as_deref(), Some("wide"));
    }

    #[test]
    fn test_equal_span_tie_breaks_by_rule_id() {
        let snap = snapshot(vec![
            rule("r-b", 0.0, 2.0, 6.0, ServiceType::Standard),
            rule("r-a", 1.0, 3.0, 7.0, ServiceType::Standard),
        ]);
        assert_eq!(find(&snap, 1.5, ServiceType::Standard).as_deref(), Some("r-a"));
    }

    #[test]
    fn test_exact_service_preferred() {
        let snap = snapshot(vec![
            rule("std", 0.0, 5.0, 5.0, ServiceType::Standard),
            rule("exp", 0.0, 5.0, 9.0, ServiceType::Express),
        ]);
        assert_eq!(find(&snap, 1.0, ServiceType::Standard).as_deref(), Some("std"));
        assert_eq!(find(&snap, 1.0, ServiceType::Express).as_deref(), Some("exp"));
    }

    #[test]
    fn test_service_fallback_ladder() {
        let snap = snapshot(vec![
            rule("eco", 0.0, 5.0, 4.0, ServiceType::Economy),
            rule("std", 0.0, 5.0, 5.0, ServiceType::Standard),
            rule("exp", 0.0, 5.0, 9.0, ServiceType::Express),
        ]);
        // 无 OVERNIGHT 规则 → 阶梯上第一个存在的 EXPRESS
        assert_eq!(find(&snap, 1.0, ServiceType::Overnight).as_deref(), Some("exp"));

        let snap = snapshot(vec![
            rule("eco", 0.0, 5.0, 4.0, ServiceType::Economy),
            rule("std", 0.0, 5.0, 5.0, ServiceType::Standard),
        ]);
        assert_eq!(find(&snap, 1.0, ServiceType::Express).as_deref(), Some("std"));

        let snap = snapshot(vec![rule("eco", 0.0, 5.0, 4.0, ServiceType::Economy)]);
        assert_eq!(find(&snap, 1.0, ServiceType::Standard).as_deref(), Some("eco"));
    }

    #[test]
    fn test_effective_window_filter() {
        let mut future = rule("future", 0.0, 5.0, 3.0, ServiceType::Standard);
        future.effective_from = Some(now() + Duration::days(1));
        let mut narrow_expired = rule("expired", 0.0, 1.0, 3.0, ServiceType::Standard);
        narrow_expired.effective_to = Some(now() - Duration::seconds(1));
        let current = rule("current", 0.0, 10.0, 5.0, ServiceType::Standard);

        let snap = snapshot(vec![future, narrow_expired, current]);
        assert_eq!(find(&snap, 0.5, ServiceType::Standard).as_deref(), Some("current"));

        let later = now() + Duration::days(2);
        let found = find_rule(&snap, &zone(), 0.5, ServiceType::Standard, later).unwrap();
        assert_eq!(found.unwrap().id, "future");
    }

    #[test]
    fn test_inactive_rule_ignored() {
        let mut inactive = rule("off", 0.0, 1.0, 1.0, ServiceType::Standard);
        inactive.is_active = false;
        let snap = snapshot(vec![inactive, rule("on", 0.0, 2.0, 5.0, ServiceType::Standard)]);
        assert_eq!(find(&snap, 0.5, ServiceType::Standard).as_deref(), Some("on"));
    }

    #[test]
    fn test_invalid_weight_is_error() {
        let snap = snapshot(vec![rule("r1", 0.0, 1.0, 5.0, ServiceType::Standard)]);
        assert!(matches!(
            find_rule(&snap, &zone(), -0.1, ServiceType::Standard, now()),
            Err(ShippingError::InvalidInput(_))
        ));
        assert!(find_rule(&snap, &zone(), f64::NAN, ServiceType::Standard, now()).is_err());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let snap = snapshot(vec![
            rule("a", 0.0, 2.0, 6.0, ServiceType::Standard),
            rule("b", 0.0, 2.0, 6.5, ServiceType::Standard),
            rule("c", 0.0, 1.0, 5.0, ServiceType::Express),
        ]);
        let first = find_rule(&snap, &zone(), 0.7, ServiceType::Overnight, now())
            .unwrap()
            .cloned();
        for _ in 0..10 {
            let again = find_rule(&snap, &zone(), 0.7, ServiceType::Overnight, now())
                .unwrap()
                .cloned();
            assert_eq!(again, first);
        }
        assert_eq!(first.unwrap().id, "c");
    }
}
