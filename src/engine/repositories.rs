// ==========================================
// 分区运费计算系统 - 引擎层数据源聚合
// ==========================================
// 职责: 聚合运费引擎所需的所有数据源
// 目标: 减少 ShippingCalculator 的构造函数参数数量
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::{ConfigManager, ShippingConfigReader};
use crate::engine::sources::{CalculationLogSink, RuleSource, ZoneSource};
use crate::repository::{CalculationLogRepository, ShippingRuleRepository, ShippingZoneRepository};

/// 运费引擎数据源集合
///
/// # 包含的数据源
/// - `zone_source`: 区域
/// - `rule_source`: 规则
/// - `config`: 免运费门槛/兜底区域配置
/// - `log_sink`: 计算日志（可选，None 时日志直接丢弃）
#[derive(Clone)]
pub struct ShippingRepositories {
    pub zone_source: Arc<dyn ZoneSource>,
    pub rule_source: Arc<dyn RuleSource>,
    pub config: Arc<dyn ShippingConfigReader>,
    pub log_sink: Option<Arc<dyn CalculationLogSink>>,
}

impl ShippingRepositories {
    /// 创建新的数据源集合
    pub fn new(
        zone_source: Arc<dyn ZoneSource>,
        rule_source: Arc<dyn RuleSource>,
        config: Arc<dyn ShippingConfigReader>,
        log_sink: Option<Arc<dyn CalculationLogSink>>,
    ) -> Self {
        Self {
            zone_source,
            rule_source,
            config,
            log_sink,
        }
    }

    /// 基于同一个 SQLite 连接组装全部数据源
    pub fn from_sqlite(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = ConfigManager::from_connection(conn.clone())?;

        Ok(Self {
            zone_source: Arc::new(ShippingZoneRepository::new(conn.clone())),
            rule_source: Arc::new(ShippingRuleRepository::new(conn.clone())),
            config: Arc::new(config),
            log_sink: Some(Arc::new(CalculationLogRepository::new(conn))),
        })
    }
}
