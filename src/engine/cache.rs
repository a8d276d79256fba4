// ==========================================
// 分区运费计算系统 - 运费缓存
// ==========================================
// 职责: 持有启用区域、有效规则(按区域分组)、免运费门槛的内存快照
// 并发: 新快照完整构建后再整体替换,读者只会看到旧快照或新快照
// ==========================================

use crate::config::ShippingConfigReader;
use crate::domain::rule::ShippingRule;
use crate::domain::zone::ShippingZone;
use crate::engine::error::{ShippingError, ShippingResult};
use crate::engine::repositories::ShippingRepositories;
use crate::engine::sources::{RuleSource, ZoneSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::instrument;

/// 默认免运费门槛（配置缺失或格式错误时使用）
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: f64 = 150.0;

/// 默认兜底区域代码
pub const DEFAULT_FALLBACK_ZONE_CODE: &str = "PENINSULAR";

// ==========================================
// CacheSnapshot - 不可变缓存快照
// ==========================================
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    zones: HashMap<String, ShippingZone>,
    zone_order: Vec<String>, // 按 sort_order 排列的区域代码
    rules: HashMap<String, Vec<ShippingRule>>,
    free_shipping_threshold: f64,
    fallback_zone_code: String,
    last_refresh: DateTime<Utc>,
}

impl CacheSnapshot {
    /// 由已加载的数据构建快照
    ///
    /// - 区域按传入顺序（sort_order）登记；校验失败的区域跳过并告警
    /// - 同一地区代码出现在多个区域时保留排序靠前的区域并告警
    /// - 规则按区域代码分组，组内保持传入顺序
    pub fn build(
        zones: Vec<ShippingZone>,
        rules: Vec<ShippingRule>,
        free_shipping_threshold: f64,
        fallback_zone_code: impl Into<String>,
        last_refresh: DateTime<Utc>,
    ) -> Self {
        let mut zone_map = HashMap::with_capacity(zones.len());
        let mut zone_order = Vec::with_capacity(zones.len());
        let mut state_owner: HashMap<String, String> = HashMap::new();

        for zone in zones {
            if let Err(reason) = zone.validate() {
                tracing::warn!(zone = %zone.code, reason = %reason, "区域配置无效,已跳过");
                continue;
            }
            if zone_map.contains_key(&zone.code) {
                tracing::warn!(zone = %zone.code, "区域代码重复,已跳过后者");
                continue;
            }
            for state in &zone.states {
                let key = state.trim().to_uppercase();
                if let Some(owner) = state_owner.get(&key) {
                    tracing::warn!(
                        state = %key,
                        owner = %owner,
                        duplicate = %zone.code,
                        "地区代码同时属于多个区域,以排序靠前的区域为准"
                    );
                } else {
                    state_owner.insert(key, zone.code.clone());
                }
            }
            zone_order.push(zone.code.clone());
            zone_map.insert(zone.code.clone(), zone);
        }

        let mut rule_map: HashMap<String, Vec<ShippingRule>> = HashMap::new();
        for rule in rules {
            rule_map.entry(rule.zone_code.clone()).or_default().push(rule);
        }

        Self {
            zones: zone_map,
            zone_order,
            rules: rule_map,
            free_shipping_threshold,
            fallback_zone_code: fallback_zone_code.into(),
            last_refresh,
        }
    }

    /// 按 sort_order 遍历区域
    pub fn zones(&self) -> impl Iterator<Item = &ShippingZone> {
        self.zone_order.iter().filter_map(move |code| self.zones.get(code))
    }

    pub fn zone(&self, code: &str) -> Option<&ShippingZone> {
        self.zones.get(code)
    }

    /// 区域下的规则（已按 weight_min 排序）
    pub fn rules_for(&self, zone_code: &str) -> &[ShippingRule] {
        self.rules.get(zone_code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 兜底区域（未在缓存中时返回 None）
    pub fn fallback_zone(&self) -> Option<&ShippingZone> {
        self.zones.get(&self.fallback_zone_code)
    }

    pub fn fallback_zone_code(&self) -> &str {
        &self.fallback_zone_code
    }

    pub fn free_shipping_threshold(&self) -> f64 {
        self.free_shipping_threshold
    }

    pub fn last_refresh(&self) -> DateTime<Utc> {
        self.last_refresh
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            zones: self.zones.len(),
            rule_groups: self.rules.len(),
            free_shipping_threshold: self.free_shipping_threshold,
            last_refresh: Some(self.last_refresh),
        }
    }
}

// ==========================================
// CacheStats - 缓存统计（运维可见性）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub zones: usize,
    pub rule_groups: usize,
    pub free_shipping_threshold: f64,
    pub last_refresh: Option<DateTime<Utc>>,
}

// ==========================================
// ShippingCache - 运费缓存
// ==========================================
pub struct ShippingCache {
    zone_source: Arc<dyn ZoneSource>,
    rule_source: Arc<dyn RuleSource>,
    config: Arc<dyn ShippingConfigReader>,
    snapshot: RwLock<Option<Arc<CacheSnapshot>>>,
}

impl ShippingCache {
    /// 创建空缓存（首次读取时懒加载）
    pub fn new(sources: &ShippingRepositories) -> Self {
        Self {
            zone_source: sources.zone_source.clone(),
            rule_source: sources.rule_source.clone(),
            config: sources.config.clone(),
            snapshot: RwLock::new(None),
        }
    }

    /// 加载区域/规则/门槛并替换快照
    ///
    /// # 错误
    /// - 区域或规则加载失败 → CacheInitialization（原快照保留）
    /// - 门槛/兜底区域读取失败 → 告警后使用默认值
    #[instrument(skip(self))]
    pub async fn initialize(&self, now: DateTime<Utc>) -> ShippingResult<Arc<CacheSnapshot>> {
        let zones = self
            .zone_source
            .load_active_zones()
            .map_err(|e| ShippingError::CacheInitialization(format!("区域加载失败: {}", e)))?;

        let rules = self
            .rule_source
            .load_effective_rules(now)
            .map_err(|e| ShippingError::CacheInitialization(format!("规则加载失败: {}", e)))?;

        let threshold = match self.config.get_free_shipping_threshold().await {
            Ok(Some(v)) => v,
            Ok(None) => DEFAULT_FREE_SHIPPING_THRESHOLD,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    default = DEFAULT_FREE_SHIPPING_THRESHOLD,
                    "免运费门槛读取失败,使用默认值"
                );
                DEFAULT_FREE_SHIPPING_THRESHOLD
            }
        };

        let fallback_zone_code = match self.config.get_fallback_zone_code().await {
            Ok(Some(code)) => code,
            Ok(None) => DEFAULT_FALLBACK_ZONE_CODE.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "兜底区域读取失败,使用默认值");
                DEFAULT_FALLBACK_ZONE_CODE.to_string()
            }
        };

        let snapshot = Arc::new(CacheSnapshot::build(
            zones,
            rules,
            threshold,
            fallback_zone_code,
            now,
        ));

        if snapshot.fallback_zone().is_none() {
            tracing::warn!(
                fallback_zone = %snapshot.fallback_zone_code(),
                "兜底区域不在缓存中,未匹配地区将无法解析"
            );
        }

        {
            let mut guard = self
                .snapshot
                .write()
                .map_err(|e| ShippingError::LockError(e.to_string()))?;
            *guard = Some(snapshot.clone());
        }

        tracing::info!(
            zones = snapshot.stats().zones,
            rule_groups = snapshot.stats().rule_groups,
            threshold = snapshot.free_shipping_threshold(),
            "运费缓存已加载"
        );

        Ok(snapshot)
    }

    /// 重新加载缓存
    pub async fn refresh(&self, now: DateTime<Utc>) -> ShippingResult<()> {
        self.initialize(now).await.map(|_| ())
    }

    /// 当前快照（不触发加载）
    pub fn current(&self) -> Option<Arc<CacheSnapshot>> {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 当前快照；缓存为空时懒加载
    pub async fn snapshot_or_init(&self, now: DateTime<Utc>) -> ShippingResult<Arc<CacheSnapshot>> {
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }
        tracing::debug!("运费缓存为空,执行懒加载");
        self.initialize(now).await
    }

    /// 缓存统计；冷缓存返回零值与默认门槛
    pub fn stats(&self) -> CacheStats {
        match self.current() {
            Some(snapshot) => snapshot.stats(),
            None => CacheStats {
                zones: 0,
                rule_groups: 0,
                free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
                last_refresh: None,
            },
        }
    }
}
