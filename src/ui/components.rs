//! UI组件模块
//!
//! 主窗口中各个区域的构建函数，以及刻度标签、预览文本等纯计算

use chrono::{DateTime, Duration, Local};
use iced::widget::{
    button, column, container, progress_bar, scrollable, slider, text, Column, Row, Space,
};
use iced::{Alignment, Element, Length};

use crate::core::countdown::CountdownProgress;
use crate::core::error::ShutdownError;
use crate::core::types::{TimeOfDayBucket, MINUTES_IN_DAY, MIN_OFFSET_MINUTES};
use crate::ui::manager::Message;
use crate::ui::theme::Theme;

/// 滑块下方的刻度标签数量
pub const SLIDER_TICK_COUNT: u32 = 20;

/// 对话框级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// 模态对话框
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl From<&ShutdownError> for Dialog {
    fn from(err: &ShutdownError) -> Self {
        if err.is_warning() {
            Self {
                severity: Severity::Warning,
                title: "Warning".to_string(),
                message: err.to_string(),
            }
        } else {
            Self {
                severity: Severity::Error,
                title: "Error".to_string(),
                message: format!("An error occurred: {}", err),
            }
        }
    }
}

/// 刻度标签：均匀分布在 [0, 1440] 分钟上，显示对应的时刻
pub fn slider_tick_labels(now: DateTime<Local>, count: u32) -> Vec<String> {
    if count < 2 {
        return vec![now.format("%H:%M").to_string()];
    }
    (0..count)
        .map(|i| {
            let offset = i64::from(i * MINUTES_IN_DAY / (count - 1));
            (now + Duration::minutes(offset)).format("%H:%M").to_string()
        })
        .collect()
}

/// 关机时间预览
pub fn preview_label(now: DateTime<Local>, offset_minutes: u32) -> String {
    let target = now + Duration::minutes(i64::from(offset_minutes));
    format!("Shutdown at {}", target.format("%H:%M"))
}

/// 标题和时段图标
pub fn header<'a>(theme: &Theme, bucket: TimeOfDayBucket) -> Element<'a, Message> {
    column![
        text("☀️ Modern Shutdown Scheduler 🌑")
            .size(24)
            .style(theme.text),
        text(bucket.icon()).size(64),
    ]
    .spacing(12)
    .align_items(Alignment::Center)
    .width(Length::Fill)
    .into()
}

/// 倒计时进度条
pub fn countdown_bar<'a>(theme: &Theme, progress: &CountdownProgress) -> Element<'a, Message> {
    column![
        progress_bar(0.0..=100.0, progress.percent())
            .height(Length::Fixed(18.0))
            .style(theme.progress_bar()),
        text(progress.label()).size(14).style(theme.text),
    ]
    .spacing(4)
    .align_items(Alignment::Center)
    .into()
}

/// 偏移量滑块、刻度标签和预览文本
pub fn offset_picker<'a>(
    theme: &Theme,
    now: DateTime<Local>,
    offset_minutes: u32,
) -> Element<'a, Message> {
    let ticks = slider_tick_labels(now, SLIDER_TICK_COUNT)
        .into_iter()
        .map(|label| {
            container(text(label).size(12).style(theme.text))
                .width(Length::FillPortion(1))
                .center_x()
                .into()
        })
        .collect::<Vec<Element<'a, Message>>>();

    column![
        text("Pick shutdown time:").size(16).style(theme.text),
        slider(
            MIN_OFFSET_MINUTES..=MINUTES_IN_DAY,
            offset_minutes,
            Message::OffsetChanged
        )
        .step(1u32)
        .style(theme.slider()),
        Row::with_children(ticks).width(Length::Fill),
        container(
            text(preview_label(now, offset_minutes))
                .size(18)
                .style(theme.text)
        )
        .width(Length::Fill)
        .center_x(),
    ]
    .spacing(8)
    .into()
}

/// 安排/取消按钮，请求进行中时禁用
pub fn action_buttons<'a>(theme: &Theme, busy: bool) -> Element<'a, Message> {
    let schedule = button(text("Schedule Shutdown").size(16))
        .padding([10, 20])
        .style(theme.schedule_button())
        .on_press_maybe((!busy).then_some(Message::Schedule));

    let cancel = button(text("Cancel Shutdown").size(16))
        .padding([10, 20])
        .style(theme.cancel_button())
        .on_press_maybe((!busy).then_some(Message::Cancel));

    column![schedule, cancel]
        .spacing(8)
        .align_items(Alignment::Center)
        .width(Length::Fill)
        .into()
}

/// 系统日志面板
pub fn log_pane<'a>(theme: &Theme, lines: &[String]) -> Element<'a, Message> {
    let entries = lines
        .iter()
        .map(|line| text(line.clone()).size(14).into())
        .collect::<Vec<Element<'a, Message>>>();

    column![
        text("System Log:").size(16).style(theme.text),
        container(scrollable(Column::with_children(entries).spacing(2)).width(Length::Fill))
            .padding(10)
            .height(Length::Fixed(120.0))
            .width(Length::Fill)
            .style(theme.log_pane()),
    ]
    .spacing(6)
    .into()
}

/// 模态对话框
pub fn dialog<'a>(theme: &Theme, dialog: &Dialog) -> Element<'a, Message> {
    let icon = match dialog.severity {
        Severity::Warning => "⚠",
        Severity::Error => "✖",
    };

    let content = column![
        text(format!("{} {}", icon, dialog.title)).size(22),
        Space::with_height(10),
        text(dialog.message.clone()).size(16),
        Space::with_height(20),
        button(text("OK")).padding([8, 24]).on_press(Message::DismissDialog),
    ]
    .spacing(10)
    .padding(24)
    .align_items(Alignment::Center)
    .width(Length::Fixed(420.0));

    container(container(content).style(theme.dialog()))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slider_tick_labels() {
        let now = Local.with_ymd_and_hms(2026, 1, 5, 14, 0, 0).unwrap();
        let labels = slider_tick_labels(now, SLIDER_TICK_COUNT);

        assert_eq!(labels.len(), SLIDER_TICK_COUNT as usize);
        assert_eq!(labels[0], "14:00");
        // 1440 / 19 = 75 分钟
        assert_eq!(labels[1], "15:15");
        assert_eq!(labels[19], "14:00");
    }

    #[test]
    fn test_preview_label() {
        let now = Local.with_ymd_and_hms(2026, 1, 5, 23, 59, 0).unwrap();
        assert_eq!(preview_label(now, 1), "Shutdown at 00:00");
        assert_eq!(preview_label(now, 61), "Shutdown at 01:00");
    }

    #[test]
    fn test_dialog_from_error() {
        let warning = Dialog::from(&ShutdownError::NoScheduledShutdown);
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.message, "No shutdown was scheduled to cancel.");

        let error = Dialog::from(&ShutdownError::InvalidOffset(0));
        assert_eq!(error.severity, Severity::Error);
        assert!(error.message.starts_with("An error occurred:"));
    }
}
