// ==========================================
// 分区运费计算系统 - 区域解析器
// ==========================================
// 职责: 客户地区 (全称/别名/代码) → 配送区域
// 顺序: 规范化 → 成员查找 → 兜底区域
// 红线: 全称只做精确匹配,不做模糊匹配
// ==========================================

use crate::domain::zone::ShippingZone;
use crate::engine::cache::CacheSnapshot;

/// 马来西亚州属标准代码
pub const CANONICAL_STATE_CODES: [&str; 16] = [
    "JOH", "KDH", "KTN", "MLK", "NSN", "PHG", "PNG", "PRK", "PLS", "SEL", "TRG", "SBH", "SWK",
    "KUL", "LBN", "PJY",
];

/// 州属全称/别名 → 标准代码（精确匹配,键均为大写）
fn alias_to_code(name: &str) -> Option<&'static str> {
    let code = match name {
        "JOHOR" | "JOHORE" | "JOHOR DARUL TA'ZIM" => "JOH",
        "KEDAH" | "KEDAH DARUL AMAN" => "KDH",
        "KELANTAN" | "KELANTAN DARUL NAIM" => "KTN",
        "MELAKA" | "MALACCA" => "MLK",
        "NEGERI SEMBILAN" | "NEGRI SEMBILAN" | "N. SEMBILAN" => "NSN",
        "PAHANG" | "PAHANG DARUL MAKMUR" => "PHG",
        "PULAU PINANG" | "PENANG" | "P. PINANG" => "PNG",
        "PERAK" | "PERAK DARUL RIDZUAN" => "PRK",
        "PERLIS" => "PLS",
        "SELANGOR" | "SELANGOR DARUL EHSAN" => "SEL",
        "TERENGGANU" | "TRENGGANU" | "TERENGGANU DARUL IMAN" => "TRG",
        "SABAH" => "SBH",
        // SRW: 砂拉越旧代码
        "SARAWAK" | "SRW" => "SWK",
        "KUALA LUMPUR" | "WP KUALA LUMPUR" | "W.P. KUALA LUMPUR"
        | "WILAYAH PERSEKUTUAN KUALA LUMPUR" => "KUL",
        "LABUAN" | "WP LABUAN" | "W.P. LABUAN" | "WILAYAH PERSEKUTUAN LABUAN" => "LBN",
        "PUTRAJAYA" | "WP PUTRAJAYA" | "W.P. PUTRAJAYA" | "WILAYAH PERSEKUTUAN PUTRAJAYA" => "PJY",
        _ => return None,
    };
    Some(code)
}

/// 规范化地区输入
///
/// 1) 去除首尾空白并转大写
/// 2) 命中全称/别名表 → 标准代码
/// 3) 其他 → 原样返回（标准代码也走此分支）
pub fn normalize_region(input: &str) -> String {
    let upper = input.trim().to_uppercase();
    match alias_to_code(&upper) {
        Some(code) => code.to_string(),
        None => upper,
    }
}

/// 解析配送区域
///
/// # 返回
/// - Some(zone): 按 sort_order 第一个包含该代码的区域；无则兜底区域
/// - None: 兜底区域也不在缓存中（配置错误，由调用方降级）
pub fn resolve_zone<'a>(snapshot: &'a CacheSnapshot, region_input: &str) -> Option<&'a ShippingZone> {
    let code = normalize_region(region_input);

    if let Some(zone) = snapshot.zones().find(|z| z.covers_state(&code)) {
        tracing::debug!(region = %region_input, state = %code, zone = %zone.code, "区域解析命中");
        return Some(zone);
    }

    match snapshot.fallback_zone() {
        Some(zone) => {
            tracing::warn!(
                region = %region_input,
                state = %code,
                fallback_zone = %zone.code,
                "地区未匹配任何区域,使用兜底区域"
            );
            Some(zone)
        }
        None => {
            tracing::warn!(
                region = %region_input,
                state = %code,
                fallback_zone = %snapshot.fallback_zone_code(),
                "地区未匹配且兜底区域缺失"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zone::ZoneFeatures;
    use chrono::Utc;

    fn zone(code: &str, states: &[&str], sort_order: i32) -> ShippingZone {
        ShippingZone {
            id: format!("id-{}", code),
            code: code.to_string(),
            name: code.to_string(),
            states: states.iter().map(|s| s.to_string()).collect(),
            multiplier: 1.0,
            delivery_time_min: 1,
            delivery_time_max: 3,
            sort_order,
            is_active: true,
            features: ZoneFeatures::default(),
        }
    }

    fn snapshot(fallback: &str) -> CacheSnapshot {
        CacheSnapshot::build(
            vec![
                zone(
                    "PENINSULAR",
                    &[
                        "JOH", "KDH", "KTN", "MLK", "NSN", "PHG", "PNG", "PRK", "PLS", "SEL",
                        "TRG", "KUL", "PJY",
                    ],
                    1,
                ),
                zone("EAST_MALAYSIA", &["SBH", "SWK", "LBN"], 2),
            ],
            vec![],
            150.0,
            fallback,
            Utc::now(),
        )
    }

    #[test]
    fn test_normalize_region() {
        assert_eq!(normalize_region("Johor"), "JOH");
        assert_eq!(normalize_region("  Penang "), "PNG");
        assert_eq!(normalize_region("Malacca"), "MLK");
        assert_eq!(normalize_region("joh"), "JOH");
        assert_eq!(normalize_region("Atlantis"), "ATLANTIS");
        // 全称不做模糊匹配
        assert_eq!(normalize_region("johor bahru"), "JOHOR BAHRU");
    }

    #[test]
    fn test_every_state_code_resolves_to_its_zone() {
        let snap = snapshot("PENINSULAR");
        for z in snap.zones() {
            for state in &z.states {
                assert_eq!(resolve_zone(&snap, state).unwrap().code, z.code);
                assert_eq!(resolve_zone(&snap, &state.to_lowercase()).unwrap().code, z.code);
            }
        }
    }

    #[test]
    fn test_full_names_resolve() {
        let snap = snapshot("PENINSULAR");
        assert_eq!(resolve_zone(&snap, "Sabah").unwrap().code, "EAST_MALAYSIA");
        assert_eq!(resolve_zone(&snap, "WP Labuan").unwrap().code, "EAST_MALAYSIA");
        assert_eq!(resolve_zone(&snap, "Kuala Lumpur").unwrap().code, "PENINSULAR");
    }

    #[test]
    fn test_full_names_ignore_case() {
        let snap = snapshot("PENINSULAR");
        for name in ["sabah", "SABAH", "WP LABUAN", "wp labuan", "sarawak", "SRW"] {
            assert_eq!(resolve_zone(&snap, name).unwrap().code, "EAST_MALAYSIA", "{}", name);
        }
        assert_eq!(normalize_region("NEGRI SEMBILAN"), "NSN");
        assert_eq!(normalize_region("pulau pinang"), "PNG");
        assert_eq!(normalize_region(" w.p. putrajaya "), "PJY");
    }

    #[test]
    fn test_unknown_region_uses_fallback_zone() {
        let snap = snapshot("PENINSULAR");
        assert_eq!(resolve_zone(&snap, "XYZ").unwrap().code, "PENINSULAR");
        assert_eq!(resolve_zone(&snap, "").unwrap().code, "PENINSULAR");
    }

    #[test]
    fn test_missing_fallback_zone_returns_none() {
        let snap = snapshot("NOWHERE");
        assert!(resolve_zone(&snap, "XYZ").is_none());
        assert_eq!(resolve_zone(&snap, "SBH").unwrap().code, "EAST_MALAYSIA");
    }

    #[test]
    fn test_canonical_codes_have_no_alias_collision() {
        for code in CANONICAL_STATE_CODES {
            assert_eq!(normalize_region(code), code);
        }
    }
}
