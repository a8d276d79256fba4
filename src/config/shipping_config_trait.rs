// ==========================================
// 分区运费计算系统 - 运费配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 配置读取错误（需跨线程传递）
pub type ConfigReadError = Box<dyn Error + Send + Sync>;

// ==========================================
// ShippingConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ShippingConfigReader: Send + Sync {
    /// 获取免运费门槛
    ///
    /// # 返回
    /// - Ok(Some(v)): 已配置且格式正确
    /// - Ok(None): 未配置
    /// - Err: 读取失败或格式错误（调用方保留默认值 150.00）
    async fn get_free_shipping_threshold(&self) -> Result<Option<f64>, ConfigReadError>;

    /// 获取兜底区域代码
    ///
    /// # 返回
    /// - Ok(Some(code)): 已配置
    /// - Ok(None): 未配置（调用方使用 PENINSULAR）
    async fn get_fallback_zone_code(&self) -> Result<Option<String>, ConfigReadError>;
}
