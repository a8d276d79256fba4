// ==========================================
// 分区运费计算系统 - 运费计算器
// ==========================================
// 主流程:
// 1) 区域解析（缓存懒加载）
// 2) 计费重量（含包装）
// 3) 规则匹配
// 4) 区域系数 + 免运费门槛
// 5) 组装结果并异步记录日志
// 红线: calculate_shipping 永不返回错误,任一环节失败即降级为兜底估算
// ==========================================

use crate::domain::calculation::{
    CalculationDetails, DeliveryDays, ShippingCalculationRequest, ShippingCalculationResult,
};
use crate::domain::rule::ShippingRule;
use crate::domain::types::{round_money, CalculationMethod, ServiceType};
use crate::domain::zone::ShippingZone;
use crate::engine::cache::{CacheStats, ShippingCache, DEFAULT_FREE_SHIPPING_THRESHOLD};
use crate::engine::calculation_logger::CalculationLogger;
use crate::engine::error::{ShippingError, ShippingResult};
use crate::engine::fallback;
use crate::engine::packaging::compute_shipping_weight;
use crate::engine::repositories::ShippingRepositories;
use crate::engine::rule_matcher::find_rule;
use crate::engine::zone_resolver::resolve_zone;
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::instrument;

// ==========================================
// ShippingCalculator - 运费计算器
// ==========================================
pub struct ShippingCalculator {
    cache: ShippingCache,
    logger: CalculationLogger,
}

impl ShippingCalculator {
    /// 创建计算器（缓存在首次调用时加载）
    pub fn new(repos: ShippingRepositories) -> Self {
        Self {
            cache: ShippingCache::new(&repos),
            logger: CalculationLogger::new(repos.log_sink.clone()),
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 解析客户地区所属区域
    #[instrument(skip(self))]
    pub async fn resolve_shipping_zone(&self, region: &str) -> ShippingResult<Option<ShippingZone>> {
        let snapshot = self.cache.snapshot_or_init(Utc::now()).await?;
        Ok(resolve_zone(&snapshot, region).cloned())
    }

    /// 查找区域内适用的运费规则
    ///
    /// # 参数
    /// - service_type: 缺省为 STANDARD
    /// - effective_date: 缺省为当前时刻
    #[instrument(skip(self, zone), fields(zone = %zone.code))]
    pub async fn find_shipping_rule(
        &self,
        zone: &ShippingZone,
        weight: f64,
        service_type: Option<ServiceType>,
        effective_date: Option<DateTime<Utc>>,
    ) -> ShippingResult<Option<ShippingRule>> {
        let now = Utc::now();
        let snapshot = self.cache.snapshot_or_init(now).await?;
        let rule = find_rule(
            &snapshot,
            zone,
            weight,
            service_type.unwrap_or_default(),
            effective_date.unwrap_or(now),
        )?;
        Ok(rule.cloned())
    }

    /// 当前缓存中的全部启用区域（按 sort_order）
    pub async fn get_available_zones(&self) -> ShippingResult<Vec<ShippingZone>> {
        let snapshot = self.cache.snapshot_or_init(Utc::now()).await?;
        Ok(snapshot.zones().cloned().collect())
    }

    /// 某区域缓存中的规则；未知区域返回空列表
    pub async fn get_zone_rules(&self, zone_code: &str) -> ShippingResult<Vec<ShippingRule>> {
        let snapshot = self.cache.snapshot_or_init(Utc::now()).await?;
        Ok(snapshot.rules_for(&zone_code.trim().to_uppercase()).to_vec())
    }

    // ==========================================
    // 缓存管理
    // ==========================================

    pub async fn refresh_cache(&self) -> ShippingResult<()> {
        self.cache.refresh(Utc::now()).await
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // ==========================================
    // 运费计算
    // ==========================================

    /// 计算运费（当前时刻）
    pub async fn calculate_shipping(
        &self,
        request: &ShippingCalculationRequest,
    ) -> ShippingCalculationResult {
        self.calculate_shipping_at(request, Utc::now()).await
    }

    /// 按指定时刻计算运费（规则生效窗口以该时刻判定）
    #[instrument(skip(self, request), fields(region = %request.region, order_value = request.order_value))]
    pub async fn calculate_shipping_at(
        &self,
        request: &ShippingCalculationRequest,
        now: DateTime<Utc>,
    ) -> ShippingCalculationResult {
        let started = Instant::now();

        let result = match self.try_calculate(request, now).await {
            Ok(result) => result,
            Err(e) => {
                match &e {
                    ShippingError::CacheInitialization(_)
                    | ShippingError::Repository(_)
                    | ShippingError::LockError(_) => {
                        tracing::error!(region = %request.region, error = %e, "运费计算失败,降级为兜底估算")
                    }
                    _ => tracing::warn!(region = %request.region, error = %e, "运费计算未命中,降级为兜底估算"),
                }
                let threshold = self
                    .cache
                    .current()
                    .map(|s| s.free_shipping_threshold())
                    .unwrap_or(DEFAULT_FREE_SHIPPING_THRESHOLD);
                fallback::estimate(request, threshold, &e.to_string())
            }
        };

        tracing::debug!(
            method = %result.calculation_method,
            final_price = result.final_price,
            "运费计算完成"
        );
        self.logger.log_calculation(request, &result, started.elapsed());

        result
    }

    async fn try_calculate(
        &self,
        request: &ShippingCalculationRequest,
        now: DateTime<Utc>,
    ) -> ShippingResult<ShippingCalculationResult> {
        if request.region.trim().is_empty() {
            return Err(ShippingError::InvalidInput("客户地区为空".to_string()));
        }
        if !request.order_value.is_finite() || request.order_value < 0.0 {
            return Err(ShippingError::InvalidInput(format!(
                "订单金额无效: {}",
                request.order_value
            )));
        }

        // 1) 区域
        let snapshot = self.cache.snapshot_or_init(now).await?;
        let zone = resolve_zone(&snapshot, &request.region).ok_or_else(|| {
            ShippingError::ZoneNotResolved {
                region: request.region.clone(),
            }
        })?;

        // 2) 计费重量
        let weight = compute_shipping_weight(request)?;

        // 3) 规则
        let requested = request.service_type.unwrap_or_default();
        let rule = find_rule(&snapshot, zone, weight.total_shipping_weight, requested, now)?
            .ok_or_else(|| ShippingError::NoMatchingRule {
                zone_code: zone.code.clone(),
                weight: weight.total_shipping_weight,
                service_type: requested,
            })?;

        // 4) 定价
        let price_with_multiplier = round_money(rule.price * zone.multiplier);
        let threshold = snapshot.free_shipping_threshold();
        let free_shipping_applied = request.order_value >= threshold;
        let final_price = if free_shipping_applied {
            0.0
        } else {
            price_with_multiplier
        };

        // 5) 组装
        let from_items = weight.from_items();
        Ok(ShippingCalculationResult {
            zone_id: Some(zone.id.clone()),
            zone_name: zone.name.clone(),
            rule_id: Some(rule.id.clone()),
            base_price: price_with_multiplier,
            final_price,
            delivery_days: DeliveryDays {
                min: zone.delivery_time_min,
                max: zone.delivery_time_max,
            },
            free_shipping_applied,
            calculation_method: CalculationMethod::Standard,
            details: CalculationDetails {
                weight_band: rule.band_label(),
                zone_multiplier: zone.multiplier,
                original_price: rule.price,
                free_shipping_threshold: threshold,
                service_type: rule.service_type,
                requested_service_type: request.service_type,
                total_shipping_weight: from_items.then_some(weight.total_shipping_weight),
                original_item_weight: from_items.then_some(weight.original_item_weight),
                packaging_weight: from_items.then_some(weight.packaging_weight),
                packaging_preference: weight.packaging_preference,
                fallback_reason: None,
            },
        })
    }
}
