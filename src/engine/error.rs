// ==========================================
// 分区运费计算系统 - 引擎层错误类型
// ==========================================
// 说明: 仅 ShippingCalculator::calculate_shipping 吞掉错误并降级,
//       其余入口一律返回 Err
// ==========================================

use crate::domain::types::ServiceType;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum ShippingError {
    // ===== 缓存 =====
    #[error("运费缓存初始化失败: {0}")]
    CacheInitialization(String),

    // ===== 计算链路 =====
    #[error("无法解析配送区域: region={region}")]
    ZoneNotResolved { region: String },

    #[error("无可用运费规则: zone={zone_code}, weight={weight}kg, service={service_type}")]
    NoMatchingRule {
        zone_code: String,
        weight: f64,
        service_type: ServiceType,
    },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ===== 数据访问 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("锁获取失败: {0}")]
    LockError(String),
}

/// Result 类型别名
pub type ShippingResult<T> = Result<T, ShippingError>;
