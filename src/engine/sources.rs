// ==========================================
// 分区运费计算系统 - 引擎层数据源接口
// ==========================================
// 职责: 定义引擎读取区域/规则、写入计算日志的 trait，实现依赖倒置
// 说明: Engine 层定义 trait，Repository 层类型实现
// ==========================================

use crate::domain::calculation_log::CalculationLogEntry;
use crate::domain::rule::ShippingRule;
use crate::domain::zone::ShippingZone;
use crate::repository::{
    CalculationLogRepository, RepositoryResult, ShippingRuleRepository, ShippingZoneRepository,
};
use chrono::{DateTime, Utc};
use std::error::Error;

// ==========================================
// 读取 Trait
// ==========================================

/// 区域数据源
pub trait ZoneSource: Send + Sync {
    /// 查询所有启用区域（按 sort_order 排序）
    fn load_active_zones(&self) -> RepositoryResult<Vec<ShippingZone>>;
}

/// 规则数据源
pub trait RuleSource: Send + Sync {
    /// 查询启用且未过期的规则（按区域、weight_min 排序，已关联区域代码）
    fn load_effective_rules(&self, now: DateTime<Utc>) -> RepositoryResult<Vec<ShippingRule>>;
}

// ==========================================
// 写入 Trait
// ==========================================

/// 计算日志落地接口
///
/// # 实现说明
/// - 调用发生在独立线程/阻塞任务中
/// - 返回 Err 只会被记录为告警，不影响计算结果
pub trait CalculationLogSink: Send + Sync {
    fn append(&self, entry: &CalculationLogEntry) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作日志落地
///
/// 用于不需要分析日志的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpLogSink;

impl CalculationLogSink for NoOpLogSink {
    fn append(&self, entry: &CalculationLogEntry) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpLogSink: 跳过计算日志 - log_id={}, method={}",
            entry.log_id,
            entry.calculation_method
        );
        Ok(())
    }
}

// ==========================================
// Repository 适配
// ==========================================

impl ZoneSource for ShippingZoneRepository {
    fn load_active_zones(&self) -> RepositoryResult<Vec<ShippingZone>> {
        self.list_active()
    }
}

impl RuleSource for ShippingRuleRepository {
    fn load_effective_rules(&self, now: DateTime<Utc>) -> RepositoryResult<Vec<ShippingRule>> {
        self.list_effective(now)
    }
}

impl CalculationLogSink for CalculationLogRepository {
    fn append(&self, entry: &CalculationLogEntry) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.insert(entry)?;
        Ok(())
    }
}
