// ==========================================
// 分区运费计算系统 - 重量与包装计算
// ==========================================
// 职责: 商品明细 → 计费重量 (货品重量 + 包装重量)
// 规则:
// - 含 FRAGILE/HAZARDOUS 商品时强制 SECURE 包装
// - 包装重量 = 货品重量 × 档位系数，最低 0.1kg
// - 无明细时直接使用申报总重，包装重量记 0
// 说明: 包装重量可能把订单推入更高的重量区间，属预期行为
// ==========================================

use crate::domain::calculation::ShippingCalculationRequest;
use crate::domain::types::PackagingPreference;
use crate::engine::error::{ShippingError, ShippingResult};
use serde::{Deserialize, Serialize};

/// 最低包装重量 (kg)
pub const MIN_PACKAGING_WEIGHT: f64 = 0.1;

// ==========================================
// ShippingWeight - 计费重量明细
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShippingWeight {
    pub total_shipping_weight: f64, // 参与规则匹配的重量
    pub original_item_weight: f64,  // 货品净重
    pub packaging_weight: f64,
    /// 实际使用的包装档位（无明细时为 None）
    pub packaging_preference: Option<PackagingPreference>,
}

impl ShippingWeight {
    /// 是否由商品明细计算得出
    pub fn from_items(&self) -> bool {
        self.packaging_preference.is_some()
    }
}

/// 计算计费重量
///
/// # 错误
/// - InvalidInput: 申报重量或单件重量为负数/非有限数
pub fn compute_shipping_weight(request: &ShippingCalculationRequest) -> ShippingResult<ShippingWeight> {
    let items = match request.items.as_deref() {
        Some(items) if !items.is_empty() => items,
        _ => {
            ensure_weight("total_weight", request.total_weight)?;
            return Ok(ShippingWeight {
                total_shipping_weight: request.total_weight,
                original_item_weight: request.total_weight,
                packaging_weight: 0.0,
                packaging_preference: None,
            });
        }
    };

    let mut item_weight = 0.0;
    for (idx, item) in items.iter().enumerate() {
        ensure_weight(&format!("items[{}].weight", idx), item.weight)?;
        item_weight += item.weight * item.quantity as f64;
    }

    let needs_secure = items.iter().any(|item| {
        item.shipping_class
            .map_or(false, |class| class.requires_secure_packaging())
    });

    let requested = request.packaging_preference.unwrap_or_default();
    let tier = if needs_secure {
        if requested != PackagingPreference::Secure {
            tracing::debug!(requested = %requested, "含易碎/危险品,包装强制升级为 SECURE");
        }
        PackagingPreference::Secure
    } else {
        requested
    };

    let packaging_weight = (item_weight * tier.weight_multiplier()).max(MIN_PACKAGING_WEIGHT);

    Ok(ShippingWeight {
        total_shipping_weight: item_weight + packaging_weight,
        original_item_weight: item_weight,
        packaging_weight,
        packaging_preference: Some(tier),
    })
}

fn ensure_weight(field: &str, value: f64) -> ShippingResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ShippingError::InvalidInput(format!(
            "{} 必须为非负有限数: {}",
            field, value
        )));
    }
    Ok(())
}
