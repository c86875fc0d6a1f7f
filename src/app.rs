//! 应用程序主模块
//!
//! 根据配置组装关机设施和界面，管理应用程序的整体生命周期

use anyhow::{anyhow, Result};
use log::info;

use crate::core::SystemShutdown;
use crate::ui::manager::{self, UiFlags};
use crate::utils::config::AppConfig;

/// 应用程序主结构体
pub struct App {
    config: AppConfig,
}

impl App {
    /// 创建新的应用实例
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// 按配置构造系统关机设施
    pub fn facility(&self) -> SystemShutdown {
        SystemShutdown::new()
            .with_force(self.config.schedule.force_close_apps)
            .with_comment(self.config.schedule.comment.clone())
    }

    /// 界面启动参数
    pub fn flags(&self) -> UiFlags<SystemShutdown> {
        UiFlags {
            facility: self.facility(),
            color_scheme: self.config.ui.color_scheme,
            default_offset_minutes: self.config.schedule.default_offset_minutes,
        }
    }

    /// 运行应用程序
    ///
    /// 启动GUI界面并进入事件循环，窗口关闭后返回
    pub fn run(self) -> Result<()> {
        info!("启动用户界面...");
        manager::run(self.flags(), self.config.ui.window_size)
            .map_err(|e| anyhow!("GUI运行失败: {}", e))?;
        info!("用户界面已关闭");
        Ok(())
    }
}
