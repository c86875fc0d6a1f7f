//! 核心业务逻辑模块
//!
//! 关机调度、倒计时、配色计算和平台检查，不依赖GUI

pub mod color_scheme;
pub mod controller;
pub mod countdown;
pub mod error;
pub mod platform;
pub mod shutdown;
pub mod types;

pub use shutdown::SystemShutdown;
