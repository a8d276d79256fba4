// ==========================================
// 分区运费计算系统 - 引擎层
// ==========================================
// 职责: 区域解析、计费重量、规则匹配、定价与降级
// 红线: Engine 不拼 SQL, 数据只经 sources 中的 trait 读取
// ==========================================

pub mod cache;
pub mod calculation_logger;
pub mod calculator;
pub mod error;
pub mod fallback;
pub mod packaging;
pub mod repositories;
pub mod rule_matcher;
pub mod sources;
pub mod zone_resolver;

// 重导出核心引擎
pub use cache::{
    CacheSnapshot, CacheStats, ShippingCache, DEFAULT_FALLBACK_ZONE_CODE,
    DEFAULT_FREE_SHIPPING_THRESHOLD,
};
pub use calculation_logger::CalculationLogger;
pub use calculator::ShippingCalculator;
pub use error::{ShippingError, ShippingResult};
pub use packaging::{compute_shipping_weight, ShippingWeight, MIN_PACKAGING_WEIGHT};
pub use repositories::ShippingRepositories;
pub use rule_matcher::find_rule;
pub use sources::{CalculationLogSink, NoOpLogSink, RuleSource, ZoneSource};
pub use zone_resolver::{normalize_region, resolve_zone, CANONICAL_STATE_CODES};
