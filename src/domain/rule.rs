// ==========================================
// 分区运费计算系统 - 运费规则领域模型
// ==========================================
// 对齐: shipping_rule 表
// 说明: 同一区域+服务类型下重量区间允许重叠，由匹配器裁决
// ==========================================

use super::types::ServiceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ShippingRule - 重量分档运费规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRule {
    pub id: String,
    pub zone_id: String,
    pub zone_code: String, // 关联区域代码 (查询时 JOIN 得到)

    // ===== 重量区间 (闭区间) =====
    pub weight_min: f64,
    pub weight_max: f64,

    pub price: f64, // 基础运费 (>= 0)
    pub service_type: ServiceType,
    pub is_active: bool,

    // ===== 生效窗口 =====
    pub effective_from: Option<DateTime<Utc>>,
    pub effective_to: Option<DateTime<Utc>>,

    pub description: Option<String>,
}

impl ShippingRule {
    /// 区间跨度（越小越具体）
    pub fn band_span(&self) -> f64 {
        self.weight_max - self.weight_min
    }

    /// 区间标签，如 "0-1kg"、"1.5-3kg"
    pub fn band_label(&self) -> String {
        format!("{}-{}kg", self.weight_min, self.weight_max)
    }

    /// 重量是否落在区间内（两端闭合）
    pub fn covers_weight(&self, weight: f64) -> bool {
        self.weight_min <= weight && weight <= self.weight_max
    }

    /// 在给定时刻是否生效
    ///
    /// 无结束时间的规则在开始时间之后一直有效
    pub fn is_effective_at(&self, at: DateTime<Utc>) -> bool {
        let started = self.effective_from.map_or(true, |from| from <= at);
        let not_ended = self.effective_to.map_or(true, |to| to >= at);
        started && not_ended
    }

    /// 校验记录级约束
    pub fn validate(&self) -> Result<(), String> {
        if !self.weight_min.is_finite() || !self.weight_max.is_finite() || self.weight_min < 0.0 {
            return Err(format!(
                "重量区间无效: rule={}, min={}, max={}",
                self.id, self.weight_min, self.weight_max
            ));
        }
        if self.weight_min > self.weight_max {
            return Err(format!(
                "重量区间下限大于上限: rule={}, min={} > max={}",
                self.id, self.weight_min, self.weight_max
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("运费不能为负: rule={}, price={}", self.id, self.price));
        }
        if let (Some(from), Some(to)) = (self.effective_from, self.effective_to) {
            if from > to {
                return Err(format!(
                    "生效窗口无效: rule={}, from={} > to={}",
                    self.id, from, to
                ));
            }
        }
        Ok(())
    }
}
