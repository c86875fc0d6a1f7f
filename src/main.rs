//! Modern Shutdown Scheduler - Windows定时关机工具
//!
//! 用滑块选择0-24小时后的关机时间，界面配色随关机时刻所在时段变化，
//! 并显示实时倒计时。

#![cfg_attr(all(not(debug_assertions), target_os = "windows"), windows_subsystem = "windows")]

use log::{error, info, warn};

mod app;
mod core;
mod ui;
mod utils;

use crate::core::platform::{self, StartupAction};
use crate::utils::config::{AppConfig, ConfigManager};

/// 应用程序入口点
///
/// 加载配置、初始化日志、检查权限后启动GUI
fn main() -> anyhow::Result<()> {
    // 配置加载失败时使用默认配置，此时日志尚未初始化
    let loaded = ConfigManager::new();
    let config = match &loaded {
        Ok(manager) => manager.config().clone(),
        Err(_) => AppConfig::default(),
    };

    let _logger = utils::logger::init_logger(&config.logging)?;
    info!("Modern Shutdown Scheduler 启动中...");
    match &loaded {
        Ok(manager) => info!("配置文件: {:?}", manager.config_path()),
        Err(e) => warn!("加载配置失败，使用默认配置: {:#}", e),
    }

    match platform::prepare_startup(config.startup.require_elevation) {
        Ok(StartupAction::Continue) => {}
        Ok(StartupAction::Relaunched) => {
            info!("已以管理员身份重新启动，当前实例退出");
            return Ok(());
        }
        Err(e) if e.is_fatal() => {
            error!("启动检查失败: {}", e);
            return Err(e.into());
        }
        Err(e) => warn!("启动检查出现问题，继续启动: {}", e),
    }

    app::App::new(config).run()
}
