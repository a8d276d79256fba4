// ==========================================
// 分区运费计算系统 - 领域模型层
// ==========================================
// 职责: 定义区域、规则、计算请求/结果、日志实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod calculation;
pub mod calculation_log;
pub mod rule;
pub mod types;
pub mod zone;

// 重导出核心类型
pub use calculation::{
    CalculationDetails, DeliveryDays, ItemDimensions, ShippingCalculationRequest,
    ShippingCalculationResult, ShippingItem,
};
pub use calculation_log::{CalculationLogEntry, CalculationLogSummary};
pub use rule::ShippingRule;
pub use types::{
    round_money, CalculationMethod, PackagingPreference, ServiceType, ShippingClass, UserType,
};
pub use zone::{ShippingZone, ZoneFeatures};
