// ==========================================
// 分区运费计算系统 - 运费计算日志领域模型
// ==========================================
// 用途: 分析统计 (只追加)
// 对齐: shipping_calculation_log 表
// ==========================================

use super::types::{CalculationMethod, UserType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// CalculationLogEntry - 运费计算日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationLogEntry {
    pub log_id: String,

    // ===== 关联ID =====
    pub order_id: Option<String>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,

    // ===== 请求 =====
    pub customer_state: String, // 规范化后的地区代码
    pub total_weight: f64,      // 申报总重
    pub order_value: f64,
    pub item_count: u32,

    // ===== 结果 =====
    pub zone_id: Option<String>,
    pub rule_id: Option<String>,
    pub base_price: f64,
    pub final_price: f64,
    pub discount_amount: f64, // base - final
    pub free_shipping_applied: bool,
    pub calculation_method: CalculationMethod,
    pub details_json: Option<JsonValue>,

    // ===== 性能/画像 =====
    pub response_time_ms: i64,
    pub user_type: UserType,
    pub created_at: NaiveDateTime,
}

// ==========================================
// CalculationLogSummary - 日志汇总
// ==========================================
// 用途: 运营看板 (按计算方式计数、平均响应时间)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationLogSummary {
    pub total_count: i64,
    pub standard_count: i64,
    pub fallback_count: i64,
    pub emergency_count: i64,
    pub free_shipping_count: i64,
    pub avg_response_time_ms: f64,
    pub total_shipping_revenue: f64, // final_price 合计
}
