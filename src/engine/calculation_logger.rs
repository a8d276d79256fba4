// ==========================================
// 分区运费计算系统 - 计算日志记录器
// ==========================================
// 职责: 组装 CalculationLogEntry 并异步落地
// 红线: 日志写入不得阻塞/影响计算结果,失败只告警
// ==========================================

use crate::domain::calculation::{ShippingCalculationRequest, ShippingCalculationResult};
use crate::domain::calculation_log::CalculationLogEntry;
use crate::domain::types::UserType;
use crate::engine::sources::CalculationLogSink;
use crate::engine::zone_resolver::normalize_region;
use chrono::{NaiveDateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

// ==========================================
// CalculationLogger
// ==========================================
#[derive(Clone, Default)]
pub struct CalculationLogger {
    sink: Option<Arc<dyn CalculationLogSink>>,
}

impl CalculationLogger {
    pub fn new(sink: Option<Arc<dyn CalculationLogSink>>) -> Self {
        Self { sink }
    }

    /// 是否配置了日志落地
    pub fn is_configured(&self) -> bool {
        self.sink.is_some()
    }

    /// 组装日志条目
    pub fn build_entry(
        request: &ShippingCalculationRequest,
        result: &ShippingCalculationResult,
        elapsed: Duration,
        created_at: NaiveDateTime,
    ) -> CalculationLogEntry {
        let details_json = match serde_json::to_value(&result.details) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(error = %e, "计算明细序列化失败,日志中省略");
                None
            }
        };

        CalculationLogEntry {
            log_id: Uuid::new_v4().to_string(),
            order_id: request.order_id.clone(),
            session_id: request.session_id.clone(),
            user_id: request.user_id.clone(),
            customer_state: normalize_region(&request.region),
            total_weight: finite_or_zero(request.total_weight),
            order_value: finite_or_zero(request.order_value),
            item_count: request.item_count,
            zone_id: result.zone_id.clone(),
            rule_id: result.rule_id.clone(),
            base_price: finite_or_zero(result.base_price),
            final_price: finite_or_zero(result.final_price),
            discount_amount: finite_or_zero(result.discount_amount()),
            free_shipping_applied: result.free_shipping_applied,
            calculation_method: result.calculation_method,
            details_json,
            response_time_ms: elapsed.as_millis().min(i64::MAX as u128) as i64,
            user_type: UserType::from_user_id(request.user_id.as_deref()),
            created_at,
        }
    }

    /// 组装并提交日志（当前时间）
    pub fn log_calculation(
        &self,
        request: &ShippingCalculationRequest,
        result: &ShippingCalculationResult,
        elapsed: Duration,
    ) -> Option<JoinHandle<()>> {
        if !self.is_configured() {
            return None;
        }
        let entry = Self::build_entry(request, result, elapsed, Utc::now().naive_utc());
        self.record(entry)
    }

    /// 提交日志（不等待落地）
    ///
    /// # 返回
    /// - Some(handle): 已在 tokio 阻塞线程池中执行（可用于测试等待）
    /// - None: 未配置落地 / 不在 tokio 运行时中（改用独立线程）
    pub fn record(&self, entry: CalculationLogEntry) -> Option<JoinHandle<()>> {
        let sink = match &self.sink {
            Some(sink) => sink.clone(),
            None => {
                tracing::debug!(log_id = %entry.log_id, "未配置计算日志落地,跳过");
                return None;
            }
        };

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            return Some(handle.spawn_blocking(move || write_entry(sink.as_ref(), &entry)));
        }

        let spawned = std::thread::Builder::new()
            .name("shipping-calc-log".to_string())
            .spawn(move || write_entry(sink.as_ref(), &entry));
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "计算日志线程启动失败,日志已丢弃");
        }
        None
    }
}

/// 日志表数值列为 NOT NULL,非有限值记为 0
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn write_entry(sink: &dyn CalculationLogSink, entry: &CalculationLogEntry) {
    match sink.append(entry) {
        Ok(()) => tracing::debug!(log_id = %entry.log_id, "计算日志已写入"),
        Err(e) => tracing::warn!(
            log_id = %entry.log_id,
            error = %e,
            "计算日志写入失败(不影响计算结果)"
        ),
    }
}
