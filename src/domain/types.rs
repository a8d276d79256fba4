// ==========================================
// 分区运费计算系统 - 领域类型定义
// ==========================================
// 职责: 服务类型、货品运输类别、包装偏好、计算方式等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 服务类型 (Service Type)
// ==========================================
// 降级阶梯: OVERNIGHT > EXPRESS > STANDARD > ECONOMY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    #[default]
    Standard, // 标准
    Express,   // 快递
    Overnight, // 隔夜达
    Economy,   // 经济
}

impl ServiceType {
    /// 服务降级阶梯（优先级递减）
    pub const FALLBACK_LADDER: [ServiceType; 4] = [
        ServiceType::Overnight,
        ServiceType::Express,
        ServiceType::Standard,
        ServiceType::Economy,
    ];

    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Standard => "STANDARD",
            ServiceType::Express => "EXPRESS",
            ServiceType::Overnight => "OVERNIGHT",
            ServiceType::Economy => "ECONOMY",
        }
    }

    /// 从字符串解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "STANDARD" => Some(ServiceType::Standard),
            "EXPRESS" => Some(ServiceType::Express),
            "OVERNIGHT" => Some(ServiceType::Overnight),
            "ECONOMY" => Some(ServiceType::Economy),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 货品运输类别 (Shipping Class)
// ==========================================
// FRAGILE / HAZARDOUS 强制升级为 SECURE 包装
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingClass {
    #[default]
    Standard,  // 普通
    Fragile,   // 易碎
    Hazardous, // 危险品
}

impl ShippingClass {
    /// 是否需要加固包装
    pub fn requires_secure_packaging(&self) -> bool {
        matches!(self, ShippingClass::Fragile | ShippingClass::Hazardous)
    }
}

// ==========================================
// 包装偏好 (Packaging Preference)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackagingPreference {
    Minimal, // 简易 5%
    #[default]
    Standard, // 标准 10%
    Secure,   // 加固 20%
}

impl PackagingPreference {
    /// 包装重量系数（相对货品重量）
    pub fn weight_multiplier(&self) -> f64 {
        match self {
            PackagingPreference::Minimal => 0.05,
            PackagingPreference::Standard => 0.10,
            PackagingPreference::Secure => 0.20,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackagingPreference::Minimal => "MINIMAL",
            PackagingPreference::Standard => "STANDARD",
            PackagingPreference::Secure => "SECURE",
        }
    }
}

impl fmt::Display for PackagingPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 计算方式 (Calculation Method)
// ==========================================
// STANDARD: 规则命中
// FALLBACK: 缓存/规则缺失时的保守估算
// EMERGENCY: 连地区都无法识别时的最高档估算
// CACHED: 预留给宿主复用历史结果，引擎自身不产出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationMethod {
    Standard,
    Fallback,
    Emergency,
    Cached,
}

impl CalculationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::Standard => "STANDARD",
            CalculationMethod::Fallback => "FALLBACK",
            CalculationMethod::Emergency => "EMERGENCY",
            CalculationMethod::Cached => "CACHED",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "STANDARD" => CalculationMethod::Standard,
            "EMERGENCY" => CalculationMethod::Emergency,
            "CACHED" => CalculationMethod::Cached,
            _ => CalculationMethod::Fallback,
        }
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 用户类型 (User Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Member, // 已登录会员
    Guest,  // 游客
}

impl UserType {
    /// 按是否提供 user_id 判定
    pub fn from_user_id(user_id: Option<&str>) -> Self {
        match user_id {
            Some(id) if !id.trim().is_empty() => UserType::Member,
            _ => UserType::Guest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Member => "MEMBER",
            UserType::Guest => "GUEST",
        }
    }
}

// ==========================================
// 金额取整
// ==========================================

/// 金额保留两位小数（四舍五入）
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
