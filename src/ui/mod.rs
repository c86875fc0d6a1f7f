//! 用户界面模块
//!
//! 包含主窗口、主题样式和对话框等GUI组件

pub mod components;
pub mod manager;
pub mod theme;
