// ==========================================
// Mock 数据源实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use zone_shipping::config::{ConfigReadError, ShippingConfigReader};
use zone_shipping::domain::{CalculationLogEntry, ShippingRule, ShippingZone};
use zone_shipping::engine::{CalculationLogSink, RuleSource, ZoneSource};
use zone_shipping::repository::{RepositoryError, RepositoryResult};

// ==========================================
// 内存区域/规则数据源（可切换为故障状态）
// ==========================================

pub struct MockStore {
    pub zones: Mutex<Vec<ShippingZone>>,
    pub rules: Mutex<Vec<ShippingRule>>,
    pub failing: AtomicBool,
    pub zone_loads: AtomicUsize,
}

impl MockStore {
    pub fn new(zones: Vec<ShippingZone>, rules: Vec<ShippingRule>) -> Self {
        Self {
            zones: Mutex::new(zones),
            rules: Mutex::new(rules),
            failing: AtomicBool::new(false),
            zone_loads: AtomicUsize::new(0),
        }
    }

    /// 始终失败的数据源
    pub fn failing() -> Self {
        let store = Self::new(vec![], vec![]);
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn replace_rules(&self, rules: Vec<ShippingRule>) {
        *self.rules.lock().unwrap() = rules;
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::DatabaseQueryError(
                "mock store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl ZoneSource for MockStore {
    fn load_active_zones(&self) -> RepositoryResult<Vec<ShippingZone>> {
        self.zone_loads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut zones: Vec<ShippingZone> = self
            .zones
            .lock()
            .unwrap()
            .iter()
            .filter(|z| z.is_active)
            .cloned()
            .collect();
        zones.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.code.cmp(&b.code)));
        Ok(zones)
    }
}

impl RuleSource for MockStore {
    fn load_effective_rules(&self, now: DateTime<Utc>) -> RepositoryResult<Vec<ShippingRule>> {
        self.check()?;
        Ok(self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_active && r.effective_to.map_or(true, |to| to >= now))
            .cloned()
            .collect())
    }
}

// ==========================================
// Mock 配置
// ==========================================

#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub free_shipping_threshold: Option<f64>,
    pub fallback_zone_code: Option<String>,
    pub broken: bool,
}

impl MockConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            free_shipping_threshold: Some(threshold),
            ..Self::default()
        }
    }

    /// 配置读取始终失败（模拟格式错误）
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ShippingConfigReader for MockConfig {
    async fn get_free_shipping_threshold(&self) -> Result<Option<f64>, ConfigReadError> {
        if self.broken {
            return Err("free_shipping_threshold: invalid float literal".into());
        }
        Ok(self.free_shipping_threshold)
    }

    async fn get_fallback_zone_code(&self) -> Result<Option<String>, ConfigReadError> {
        if self.broken {
            return Err("shipping_fallback_zone_code: unreadable".into());
        }
        Ok(self.fallback_zone_code.clone())
    }
}

// ==========================================
// Mock 日志落地
// ==========================================

/// 记录所有写入的日志
#[derive(Default)]
pub struct RecordingSink {
    pub entries: Mutex<Vec<CalculationLogEntry>>,
}

impl RecordingSink {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl CalculationLogSink for RecordingSink {
    fn append(&self, entry: &CalculationLogEntry) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// 始终写入失败
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }
}

impl CalculationLogSink for FailingSink {
    fn append(&self, _entry: &CalculationLogEntry) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err("log table locked".into())
    }
}
