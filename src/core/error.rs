//! 错误类型定义
//!
//! 关机控制器和平台检查使用的统一错误类型

use thiserror::Error;

/// 关机相关错误
///
/// 需要通过GUI消息传递，因此只携带可克隆的数据
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShutdownError {
    /// 非Windows系统
    #[error("This application can only run on Windows (detected: {os})")]
    UnsupportedPlatform { os: String },

    /// 提权重启失败
    #[error("Failed to relaunch with administrator rights: {0}")]
    Elevation(String),

    /// 偏移量不在 [1, 1440] 范围内
    #[error("Shutdown offset must be between 1 and 1440 minutes, got {0}")]
    InvalidOffset(u32),

    /// 无法启动系统命令
    #[error("Failed to run `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    /// 系统命令返回非零退出码
    #[error("`{command}` exited with {}: {stderr}", .code.map_or_else(|| "no exit code".to_string(), |c| format!("code {c}")))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// 取消时没有待执行的关机
    #[error("No shutdown was scheduled to cancel.")]
    NoScheduledShutdown,
}

impl ShutdownError {
    /// 是否为预期内的警告（而非错误）
    pub fn is_warning(&self) -> bool {
        matches!(self, ShutdownError::NoScheduledShutdown)
    }

    /// 是否为启动阶段的致命错误
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShutdownError::UnsupportedPlatform { .. } | ShutdownError::Elevation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        assert!(ShutdownError::NoScheduledShutdown.is_warning());
        assert!(!ShutdownError::InvalidOffset(0).is_warning());
        assert!(ShutdownError::UnsupportedPlatform { os: "linux".into() }.is_fatal());
        assert!(!ShutdownError::NoScheduledShutdown.is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = ShutdownError::CommandFailed {
            command: "shutdown /a".to_string(),
            code: Some(5),
            stderr: "Access is denied.".to_string(),
        };
        assert_eq!(err.to_string(), "`shutdown /a` exited with code 5: Access is denied.");

        let err = ShutdownError::CommandFailed {
            command: "shutdown /a".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("no exit code"));

        assert_eq!(
            ShutdownError::NoScheduledShutdown.to_string(),
            "No shutdown was scheduled to cancel."
        );
    }
}
