// ==========================================
// 分区运费计算系统 - 配置层
// ==========================================
// 职责: 系统配置管理 (免运费门槛/兜底区域)
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod shipping_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use shipping_config_trait::{ConfigReadError, ShippingConfigReader};
