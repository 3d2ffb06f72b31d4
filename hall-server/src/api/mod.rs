//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册/登录/当前用户
//! - [`upload`] - 文件上传与读取
//! - [`halls`] - 场馆管理接口
//! - [`bookings`] - 预订生命周期接口
//! - [`commissions`] - 佣金结算接口
//! - [`utility`] - 管理员维护接口 (补建佣金、手动清扫)

pub mod auth;
pub mod bookings;
pub mod commissions;
pub mod halls;
pub mod health;
pub mod upload;
pub mod utility;
