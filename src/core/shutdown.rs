//! 关机执行器模块
//!
//! 封装系统的 shutdown.exe：安排延迟关机、取消待执行的关机

use std::future::Future;

use log::{debug, info};
use tokio::process::Command as AsyncCommand;

use crate::core::error::ShutdownError;
use crate::core::types::AbortOutcome;

/// `shutdown /a` 在没有待执行关机时的退出码（ERROR_NO_SHUTDOWN_IN_PROGRESS）
pub const EXIT_NO_SHUTDOWN_IN_PROGRESS: i32 = 1116;

/// shutdown.exe 允许的注释最大长度
pub const MAX_COMMENT_LEN: usize = 512;

/// 系统关机设施
///
/// 返回的 future 只持有设施自身的克隆，可以交给GUI执行器运行
pub trait ShutdownFacility: Clone + Send + Sync + 'static {
    /// 取消待执行的关机
    fn abort(&self) -> impl Future<Output = Result<AbortOutcome, ShutdownError>> + Send;

    /// 在指定秒数后关机
    fn schedule_in(&self, seconds: u64) -> impl Future<Output = Result<(), ShutdownError>> + Send;
}

/// 通过 shutdown.exe 实现的关机设施
#[derive(Debug, Clone, Default)]
pub struct SystemShutdown {
    /// 强制关闭应用程序 (/f)
    force_close_apps: bool,
    /// 关机提示 (/c)
    comment: Option<String>,
}

impl SystemShutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_force(mut self, force_close_apps: bool) -> Self {
        self.force_close_apps = force_close_apps;
        self
    }

    /// 设置关机提示，超长部分截断，空字符串视为不设置
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment
            .map(|c| c.chars().take(MAX_COMMENT_LEN).collect::<String>())
            .filter(|c| !c.trim().is_empty());
        self
    }

    /// 取消命令参数
    pub fn abort_args(&self) -> Vec<String> {
        vec!["/a".to_string()]
    }

    /// 关机命令参数
    pub fn schedule_args(&self, seconds: u64) -> Vec<String> {
        let mut args = vec!["/s".to_string(), "/t".to_string(), seconds.to_string()];
        if self.force_close_apps {
            args.push("/f".to_string());
        }
        if let Some(comment) = &self.comment {
            args.push("/c".to_string());
            args.push(comment.clone());
        }
        args
    }

    /// 根据取消命令的退出码判断结果
    pub fn classify_abort(code: Option<i32>, stderr: &str) -> Result<AbortOutcome, ShutdownError> {
        match code {
            Some(0) => Ok(AbortOutcome::Aborted),
            Some(EXIT_NO_SHUTDOWN_IN_PROGRESS) => Ok(AbortOutcome::NothingPending),
            code => Err(ShutdownError::CommandFailed {
                command: "shutdown /a".to_string(),
                code,
                stderr: stderr.trim().to_string(),
            }),
        }
    }

    async fn run(args: Vec<String>) -> Result<(Option<i32>, String), ShutdownError> {
        let command = format!("shutdown {}", args.join(" "));
        debug!("执行命令: {}", command);

        let output = AsyncCommand::new("shutdown")
            .args(&args)
            .output()
            .await
            .map_err(|e| ShutdownError::Spawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        debug!("命令 `{}` 退出码: {:?}", command, output.status.code());
        Ok((output.status.code(), stderr))
    }
}

impl ShutdownFacility for SystemShutdown {
    fn abort(&self) -> impl Future<Output = Result<AbortOutcome, ShutdownError>> + Send {
        let args = self.abort_args();
        async move {
            let (code, stderr) = Self::run(args).await?;
            let outcome = Self::classify_abort(code, &stderr)?;
            info!("取消关机结果: {:?}", outcome);
            Ok(outcome)
        }
    }

    fn schedule_in(&self, seconds: u64) -> impl Future<Output = Result<(), ShutdownError>> + Send {
        let args = self.schedule_args(seconds);
        async move {
            let command = format!("shutdown {}", args.join(" "));
            let (code, stderr) = Self::run(args).await?;
            if code == Some(0) {
                info!("已安排 {} 秒后关机", seconds);
                Ok(())
            } else {
                Err(ShutdownError::CommandFailed {
                    command,
                    code,
                    stderr: stderr.trim().to_string(),
                })
            }
        }
    }
}
