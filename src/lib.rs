// ==========================================
// 分区运费计算系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 电商结算的分区运费计算引擎 (马来西亚市场)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 运费规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 默认数据
pub mod seed;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CalculationMethod, PackagingPreference, ServiceType, ShippingClass, UserType,
};

// 领域实体
pub use domain::{
    CalculationDetails, CalculationLogEntry, DeliveryDays, ShippingCalculationRequest,
    ShippingCalculationResult, ShippingItem, ShippingRule, ShippingZone, ZoneFeatures,
};

// 引擎
pub use engine::{
    CacheStats, ShippingCalculator, ShippingError, ShippingRepositories, ShippingResult,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "分区运费计算系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
