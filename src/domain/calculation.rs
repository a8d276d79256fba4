// ==========================================
// 分区运费计算系统 - 运费计算请求/结果模型
// ==========================================
// 说明: 请求与结果均为单次调用的临时对象，不落库
//       落库的是 CalculationLogEntry (见 calculation_log.rs)
// ==========================================

use super::types::{CalculationMethod, PackagingPreference, ServiceType, ShippingClass};
use serde::{Deserialize, Serialize};

// ==========================================
// ShippingCalculationRequest - 运费计算请求
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingCalculationRequest {
    // ===== 核心输入 =====
    pub region: String,     // 客户地区 (全称/别名/代码)
    pub total_weight: f64,  // 申报总重 (kg)
    pub order_value: f64,   // 订单金额
    pub item_count: u32,    // 商品件数

    // ===== 可选输入 =====
    pub service_type: Option<ServiceType>,
    pub items: Option<Vec<ShippingItem>>,
    pub packaging_preference: Option<PackagingPreference>,

    // ===== 关联ID (仅用于日志) =====
    pub session_id: Option<String>,
    pub order_id: Option<String>,
    pub user_id: Option<String>,
}

impl ShippingCalculationRequest {
    /// 创建最简请求（按申报总重计算）
    pub fn new(region: impl Into<String>, total_weight: f64, order_value: f64) -> Self {
        Self {
            region: region.into(),
            total_weight,
            order_value,
            item_count: 1,
            ..Default::default()
        }
    }

    pub fn with_service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = Some(service_type);
        self
    }

    /// 设置明细，同时同步件数与申报总重
    pub fn with_items(mut self, items: Vec<ShippingItem>) -> Self {
        self.item_count = items.iter().map(|i| i.quantity).sum();
        self.total_weight = items.iter().map(|i| i.weight * i.quantity as f64).sum();
        self.items = Some(items);
        self
    }

    pub fn with_packaging(mut self, preference: PackagingPreference) -> Self {
        self.packaging_preference = Some(preference);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_order(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

// ==========================================
// ShippingItem - 商品明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingItem {
    pub weight: f64, // 单件重量 (kg)
    pub quantity: u32,
    pub shipping_class: Option<ShippingClass>,
    pub dimensions: Option<ItemDimensions>,
}

impl ShippingItem {
    pub fn new(weight: f64, quantity: u32) -> Self {
        Self {
            weight,
            quantity,
            shipping_class: None,
            dimensions: None,
        }
    }

    pub fn with_class(mut self, shipping_class: ShippingClass) -> Self {
        self.shipping_class = Some(shipping_class);
        self
    }
}

/// 商品尺寸 (cm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

// ==========================================
// ShippingCalculationResult - 运费计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingCalculationResult {
    pub zone_id: Option<String>, // FALLBACK/EMERGENCY 时为 None
    pub zone_name: String,
    pub rule_id: Option<String>,

    // ===== 价格 =====
    pub base_price: f64,  // 乘区域系数后、免运费前
    pub final_price: f64, // 实付运费

    pub delivery_days: DeliveryDays,
    pub free_shipping_applied: bool,
    pub calculation_method: CalculationMethod,
    pub details: CalculationDetails,
}

impl ShippingCalculationResult {
    /// 免运费减免金额
    pub fn discount_amount(&self) -> f64 {
        super::types::round_money(self.base_price - self.final_price)
    }
}

/// 送达天数范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDays {
    pub min: u32,
    pub max: u32,
}

// ==========================================
// CalculationDetails - 计算明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationDetails {
    pub weight_band: String, // "{min}-{max}kg"
    pub zone_multiplier: f64,
    pub original_price: f64, // 乘系数前
    pub free_shipping_threshold: f64,
    pub service_type: ServiceType, // 实际提供的服务
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_service_type: Option<ServiceType>,

    // ===== 重量/包装 (仅带明细时) =====
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_shipping_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_item_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging_preference: Option<PackagingPreference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}
