//! 佣金结算引擎
//!
//! 预订完成后的 5% 平台费：幂等创建、凭证上传、管理员审核、
//! 逾期清扫 (级联删除经理及其场馆)、补建对账。

pub mod engine;
pub mod scheduler;

pub use engine::{COMMISSION_DUE_DAYS, ReconcileReport, SettlementEngine, SweepReport};
pub use scheduler::SettlementScheduler;
