// ==========================================
// 分区运费计算系统 - 运费计算日志数据仓储
// ==========================================
// 对齐: shipping_calculation_log 表
// 红线: 只追加,不更新
// ==========================================

mod core;
mod queries;


pub use core::CalculationLogRepository;
