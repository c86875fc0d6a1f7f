//! 配置管理模块
//!
//! 负责应用程序配置的加载、保存和校验

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use dirs::config_dir;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::color_scheme::SchemeKind;
use crate::core::shutdown::MAX_COMMENT_LEN;
use crate::core::types::{MINUTES_IN_DAY, MIN_OFFSET_MINUTES};
use crate::utils::logger::LogLevelConverter;

/// 配置目录名
pub const APP_DIR_NAME: &str = "ShutdownScheduler";

/// 应用程序配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 关机设置
    pub schedule: ScheduleSettings,
    /// 界面设置
    pub ui: UISettings,
    /// 日志设置
    pub logging: LoggingSettings,
    /// 启动设置
    pub startup: StartupSettings,
}

/// 关机相关设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// 滑块初始值（分钟）
    pub default_offset_minutes: u32,
    /// 强制关闭应用程序
    pub force_close_apps: bool,
    /// 关机提示
    pub comment: Option<String>,
}

/// 界面设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UISettings {
    /// 配色方案
    pub color_scheme: SchemeKind,
    /// 窗口大小
    pub window_size: (f32, f32),
}

/// 日志设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 日志级别
    pub level: String,
    /// 是否写入日志文件
    pub file_logging: bool,
    /// 日志文件保留天数
    pub keep_log_days: u32,
}

/// 启动设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupSettings {
    /// 没有管理员权限时是否以管理员身份重新启动
    pub require_elevation: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            default_offset_minutes: MIN_OFFSET_MINUTES,
            force_close_apps: false,
            comment: None,
        }
    }
}

impl Default for UISettings {
    fn default() -> Self {
        Self {
            color_scheme: SchemeKind::default(),
            window_size: (700.0, 700.0),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            keep_log_days: 7,
        }
    }
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self {
            require_elevation: true,
        }
    }
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置文件路径
    config_path: PathBuf,
    /// 当前配置
    config: AppConfig,
}

impl ConfigManager {
    /// 从默认位置加载配置
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::open(config_path)
    }

    /// 从指定路径加载配置
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径，不存在时写入默认配置
    ///
    /// # 返回值
    ///
    /// 校验并修正后的配置管理器；读写文件失败时返回错误
    pub fn open(config_path: PathBuf) -> Result<Self> {
        let mut config = Self::load_config(&config_path)?;
        let problems = ConfigValidator::sanitize(&mut config);
        for problem in &problems {
            warn!("配置无效，已使用默认值: {}", problem);
        }

        Ok(Self {
            config_path,
            config,
        })
    }

    /// 获取默认配置文件路径
    fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().ok_or_else(|| anyhow!("无法获取配置目录"))?;
        Ok(config_dir.join(APP_DIR_NAME).join("config.json"))
    }

    /// 加载配置文件
    ///
    /// 文件不存在时写入默认配置；格式错误时备份原文件并使用默认配置
    fn load_config(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            info!("配置文件不存在，使用默认配置: {:?}", path);
            let default_config = AppConfig::default();
            Self::save_config_to_file(&default_config, path)?;
            return Ok(default_config);
        }

        info!("加载配置文件: {:?}", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("配置文件格式错误: {}, 使用默认配置", e);

                let backup_path = path.with_extension("json.backup");
                if let Err(backup_err) = fs::copy(path, &backup_path) {
                    warn!("备份损坏的配置文件失败: {}", backup_err);
                }

                let default_config = AppConfig::default();
                Self::save_config_to_file(&default_config, path)?;
                Ok(default_config)
            }
        }
    }

    /// 保存配置到文件
    fn save_config_to_file(config: &AppConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("创建配置目录失败: {:?}", parent))?;
            }
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(path, json).with_context(|| format!("写入配置文件失败: {:?}", path))?;
        info!("配置文件保存成功: {:?}", path);
        Ok(())
    }

    /// 获取当前配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取配置文件路径
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// 配置校验器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 校验配置，返回错误信息列表
    pub fn validate(config: &AppConfig) -> Vec<String> {
        let mut errors = Vec::new();

        let offset = config.schedule.default_offset_minutes;
        if !(MIN_OFFSET_MINUTES..=MINUTES_IN_DAY).contains(&offset) {
            errors.push(format!(
                "default_offset_minutes 应在{}-{}之间，实际为{}",
                MIN_OFFSET_MINUTES, MINUTES_IN_DAY, offset
            ));
        }

        if let Some(comment) = &config.schedule.comment {
            if comment.chars().count() > MAX_COMMENT_LEN {
                errors.push(format!("comment 不能超过{}个字符", MAX_COMMENT_LEN));
            }
        }

        let (width, height) = config.ui.window_size;
        if !(width > 0.0 && width <= 10000.0 && height > 0.0 && height <= 10000.0) {
            errors.push("窗口大小无效".to_string());
        }

        if !LogLevelConverter::is_valid(&config.logging.level) {
            errors.push(format!("无效的日志级别: {}", config.logging.level));
        }

        if config.logging.keep_log_days == 0 {
            errors.push("keep_log_days 至少为1".to_string());
        }

        errors
    }

    /// 把无效的字段恢复为默认值，返回发现的问题
    pub fn sanitize(config: &mut AppConfig) -> Vec<String> {
        let problems = Self::validate(config);
        if problems.is_empty() {
            return problems;
        }

        let defaults = AppConfig::default();
        let offset = config.schedule.default_offset_minutes;
        if !(MIN_OFFSET_MINUTES..=MINUTES_IN_DAY).contains(&offset) {
            config.schedule.default_offset_minutes = defaults.schedule.default_offset_minutes;
        }
        if let Some(comment) = &config.schedule.comment {
            if comment.chars().count() > MAX_COMMENT_LEN {
                config.schedule.comment = Some(comment.chars().take(MAX_COMMENT_LEN).collect());
            }
        }
        let (width, height) = config.ui.window_size;
        if !(width > 0.0 && width <= 10000.0 && height > 0.0 && height <= 10000.0) {
            config.ui.window_size = defaults.ui.window_size;
        }
        if !LogLevelConverter::is_valid(&config.logging.level) {
            config.logging.level = defaults.logging.level;
        }
        if config.logging.keep_log_days == 0 {
            config.logging.keep_log_days = defaults.logging.keep_log_days;
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.schedule.default_offset_minutes, 1);
        assert!(!config.schedule.force_close_apps);
        assert_eq!(config.ui.color_scheme, SchemeKind::DayCycle);
        assert_eq!(config.logging.level, "info");
        assert!(config.startup.require_elevation);
        assert!(ConfigValidator::validate(&config).is_empty());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let manager = ConfigManager::open(path.clone()).unwrap();

        assert!(path.exists());
        assert_eq!(manager.config(), &AppConfig::default());
        assert_eq!(manager.config_path(), path.as_path());
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "ui": { "color_scheme": "offset_gradient" }, "schedule": { "default_offset_minutes": 45 } }"#,
        )
        .unwrap();

        let manager = ConfigManager::open(path).unwrap();
        let config = manager.config();

        assert_eq!(config.ui.color_scheme, SchemeKind::OffsetGradient);
        assert_eq!(config.ui.window_size, (700.0, 700.0));
        assert_eq!(config.schedule.default_offset_minutes, 45);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::open(path.clone()).unwrap();

        assert_eq!(manager.config(), &AppConfig::default());
        let backup = fs::read_to_string(path.with_extension("json.backup")).unwrap();
        assert_eq!(backup, "{ not json");
    }

    #[test]
    fn test_invalid_values_are_sanitized() {
        let mut config = AppConfig::default();
        config.schedule.default_offset_minutes = 5000;
        config.ui.window_size = (-100.0, 200.0);
        config.logging.level = "loud".to_string();
        config.logging.keep_log_days = 0;

        let problems = ConfigValidator::sanitize(&mut config);

        assert_eq!(problems.len(), 4);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_long_comment_is_truncated() {
        let mut config = AppConfig::default();
        config.schedule.comment = Some("z".repeat(MAX_COMMENT_LEN + 1));

        let problems = ConfigValidator::sanitize(&mut config);

        assert_eq!(problems.len(), 1);
        assert_eq!(
            config.schedule.comment.map(|c| c.chars().count()),
            Some(MAX_COMMENT_LEN)
        );
    }
}
