//! 工具模块
//!
//! 配置文件和日志系统

pub mod config;
pub mod logger;
