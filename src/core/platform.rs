//! 平台检查模块
//!
//! 启动时检查操作系统和管理员权限，必要时以管理员身份重新启动自身

use log::{info, warn};

use crate::core::error::ShutdownError;

/// 当前进程需要做的启动处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupAction {
    /// 继续启动GUI
    Continue,
    /// 已以管理员身份重新启动，当前实例应退出
    Relaunched,
}

/// 检查是否运行在Windows上
pub fn ensure_supported() -> Result<(), ShutdownError> {
    check_os(std::env::consts::OS)
}

fn check_os(os: &str) -> Result<(), ShutdownError> {
    if os == "windows" {
        Ok(())
    } else {
        Err(ShutdownError::UnsupportedPlatform { os: os.to_string() })
    }
}

/// 决定启动流程
///
/// 需要提权但当前不是管理员时，请求以管理员身份重新启动
pub fn prepare_startup(require_elevation: bool) -> Result<StartupAction, ShutdownError> {
    ensure_supported()?;

    if !require_elevation {
        info!("配置为不要求管理员权限，直接启动");
        return Ok(StartupAction::Continue);
    }

    if is_elevated() {
        info!("当前进程已具有管理员权限");
        return Ok(StartupAction::Continue);
    }

    warn!("当前进程没有管理员权限，尝试以管理员身份重新启动");
    relaunch_elevated()?;
    Ok(StartupAction::Relaunched)
}

/// 检查当前进程是否具有管理员权限
#[cfg(windows)]
pub fn is_elevated() -> bool {
    use winapi::shared::minwindef::{DWORD, FALSE};
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcessToken};
    use winapi::um::securitybaseapi::GetTokenInformation;
    use winapi::um::winnt::{TokenElevation, HANDLE, TOKEN_ELEVATION, TOKEN_QUERY};

    unsafe {
        let mut token: HANDLE = std::ptr::null_mut();

        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) == FALSE || token.is_null() {
            return false;
        }

        let mut elevation = TOKEN_ELEVATION { TokenIsElevated: 0 };
        let mut return_length: DWORD = 0;

        let result = GetTokenInformation(
            token,
            TokenElevation,
            &mut elevation as *mut _ as *mut _,
            std::mem::size_of::<TOKEN_ELEVATION>() as DWORD,
            &mut return_length,
        );

        CloseHandle(token);

        result != FALSE && elevation.TokenIsElevated != 0
    }
}

#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    false
}

/// 以管理员身份重新启动当前程序（UAC "runas"）
#[cfg(windows)]
pub fn relaunch_elevated() -> Result<(), ShutdownError> {
    use std::os::windows::ffi::OsStrExt;
    use winapi::um::shellapi::ShellExecuteW;
    use winapi::um::winuser::SW_SHOWNORMAL;

    fn wide(s: &std::ffi::OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    let exe = std::env::current_exe().map_err(|e| ShutdownError::Elevation(e.to_string()))?;
    let args = std::env::args().skip(1).map(|a| quote_arg(&a)).collect::<Vec<_>>().join(" ");

    let verb = wide(std::ffi::OsStr::new("runas"));
    let file = wide(exe.as_os_str());
    let params = wide(std::ffi::OsStr::new(&args));

    let result = unsafe {
        ShellExecuteW(
            std::ptr::null_mut(),
            verb.as_ptr(),
            file.as_ptr(),
            params.as_ptr(),
            std::ptr::null(),
            SW_SHOWNORMAL,
        )
    };

    // ShellExecuteW 返回值大于32表示成功
    if result as isize > 32 {
        info!("已请求以管理员身份重新启动: {:?}", exe);
        Ok(())
    } else {
        Err(ShutdownError::Elevation(format!(
            "ShellExecuteW returned {}",
            result as isize
        )))
    }
}

#[cfg(not(windows))]
pub fn relaunch_elevated() -> Result<(), ShutdownError> {
    Err(ShutdownError::Elevation(
        "elevation is only available on Windows".to_string(),
    ))
}

/// 为命令行参数加引号
pub fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains([' ', '\t', '"']) {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_os() {
        assert!(check_os("windows").is_ok());
        assert_eq!(
            check_os("linux"),
            Err(ShutdownError::UnsupportedPlatform { os: "linux".to_string() })
        );
    }

    #[test]
    fn test_ensure_supported_matches_target() {
        assert_eq!(ensure_supported().is_ok(), cfg!(windows));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_startup_fails_off_windows() {
        let err = prepare_startup(false).unwrap_err();
        assert!(err.is_fatal());
        assert!(!is_elevated());
    }

    #[test]
    fn test_quote_arg() {
        assert_eq!(quote_arg("plain"), "plain");
        assert_eq!(quote_arg("with space"), "\"with space\"");
        assert_eq!(quote_arg(""), "\"\"");
        assert_eq!(quote_arg("a\"b"), "\"a\\\"b\"");
    }
}
