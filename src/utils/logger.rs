//! 日志管理模块
//!
//! 负责日志系统的初始化、日志文件位置和旧日志清理

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use dirs::data_local_dir;
use env_logger::{Builder, Env, Target};
use log::{info, warn, LevelFilter};

use crate::utils::config::{LoggingSettings, APP_DIR_NAME};

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "shutdown_scheduler_";

/// 日志管理器
#[derive(Debug)]
pub struct LoggerManager {
    /// 日志文件路径
    log_file_path: Option<PathBuf>,
    /// 当前日志级别
    log_level: LevelFilter,
}

impl LoggerManager {
    /// 创建日志管理器
    ///
    /// # 参数
    ///
    /// * `log_level` - 日志级别
    /// * `log_dir` - 日志目录，为 `None` 时只输出到控制台
    ///
    /// # 返回值
    ///
    /// 日志目录无法创建时返回错误
    pub fn new(log_level: LevelFilter, log_dir: Option<&Path>) -> Result<Self> {
        let log_file_path = match log_dir {
            Some(dir) => {
                if !dir.exists() {
                    fs::create_dir_all(dir)
                        .with_context(|| format!("创建日志目录失败: {:?}", dir))?;
                }
                Some(dir.join(Self::log_file_name(Local::now())))
            }
            None => None,
        };

        Ok(Self {
            log_file_path,
            log_level,
        })
    }

    /// 按日期生成日志文件名
    pub fn log_file_name(now: DateTime<Local>) -> String {
        format!("{}{}.log", LOG_FILE_PREFIX, now.format("%Y%m%d"))
    }

    /// 默认日志目录
    pub fn default_log_dir() -> Result<PathBuf> {
        let data_dir = data_local_dir().ok_or_else(|| anyhow!("无法获取本地数据目录"))?;
        Ok(data_dir.join(APP_DIR_NAME).join("logs"))
    }

    /// 初始化全局日志
    ///
    /// `RUST_LOG` 环境变量优先于配置中的级别
    pub fn init(&self) -> Result<()> {
        let mut builder = Builder::new();
        builder.filter_level(self.log_level);
        builder.parse_env(Env::default());

        builder.format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            writeln!(
                buf,
                "[{}] [{}] [{}:{}] {}",
                timestamp,
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });

        match &self.log_file_path {
            Some(file_path) => {
                let file = fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(file_path)
                    .with_context(|| format!("打开日志文件失败: {:?}", file_path))?;
                builder.target(Target::Pipe(Box::new(file)));
            }
            None => {
                builder.target(Target::Stdout);
            }
        }

        builder
            .try_init()
            .map_err(|e| anyhow!("日志系统已初始化: {}", e))?;

        match self.log_file_path() {
            Some(path) => info!("日志系统初始化完成 - 级别: {}, 文件: {:?}", self.log_level(), path),
            None => info!("日志系统初始化完成 - 级别: {}, 控制台", self.log_level()),
        }
        Ok(())
    }

    /// 获取当前日志级别
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    /// 获取日志文件路径
    pub fn log_file_path(&self) -> Option<&Path> {
        self.log_file_path.as_deref()
    }

    /// 清理旧日志文件，返回删除的文件数
    pub fn cleanup_old_logs(&self, days_to_keep: u32) -> Result<usize> {
        let Some(log_dir) = self.log_file_path.as_deref().and_then(Path::parent) else {
            return Ok(0);
        };
        if !log_dir.exists() {
            return Ok(0);
        }

        let cutoff_time = Local::now() - chrono::Duration::days(i64::from(days_to_keep));
        let mut cleaned_count = 0;

        for entry in fs::read_dir(log_dir)? {
            let path = entry?.path();
            if !Self::is_log_file(&path) || Some(path.as_path()) == self.log_file_path.as_deref() {
                continue;
            }

            let modified: DateTime<Local> = fs::metadata(&path)?.modified()?.into();
            if modified < cutoff_time {
                match fs::remove_file(&path) {
                    Ok(_) => {
                        info!("删除旧日志文件: {:?}", path);
                        cleaned_count += 1;
                    }
                    Err(e) => warn!("删除日志文件失败 {:?}: {}", path, e),
                }
            }
        }

        Ok(cleaned_count)
    }

    fn is_log_file(path: &Path) -> bool {
        path.is_file()
            && path.extension().map_or(false, |ext| ext == "log")
            && path
                .file_name()
                .map_or(false, |name| name.to_string_lossy().starts_with(LOG_FILE_PREFIX))
    }
}

/// 日志级别转换工具
pub struct LogLevelConverter;

impl LogLevelConverter {
    /// 从字符串转换为日志级别，无法识别时为 Info
    pub fn from_string(level_str: &str) -> LevelFilter {
        level_str.trim().parse().unwrap_or(LevelFilter::Info)
    }

    /// 是否为可识别的日志级别
    pub fn is_valid(level_str: &str) -> bool {
        level_str.trim().parse::<LevelFilter>().is_ok()
    }
}

/// 按配置初始化日志，返回日志管理器
pub fn init_logger(settings: &LoggingSettings) -> Result<LoggerManager> {
    let level = LogLevelConverter::from_string(&settings.level);
    let log_dir = if settings.file_logging {
        Some(LoggerManager::default_log_dir()?)
    } else {
        None
    };

    let manager = LoggerManager::new(level, log_dir.as_deref())?;
    manager.init()?;

    if settings.file_logging {
        match manager.cleanup_old_logs(settings.keep_log_days) {
            Ok(0) => {}
            Ok(count) => info!("清理完成，删除了 {} 个旧日志文件", count),
            Err(e) => warn!("清理旧日志失败: {}", e),
        }
    }

    Ok(manager)
}
