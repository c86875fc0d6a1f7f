//! UI管理器模块
//!
//! iced 应用程序：唯一持有控制器和界面状态，每秒刷新一次倒计时和配色

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local};
use iced::widget::{column, container};
use iced::{
    executor, window, Application, Command, Element, Length, Settings, Size, Subscription,
    Theme as IcedTheme,
};
use log::{debug, info};

use crate::core::color_scheme::{ColorSample, ColorScheme, Palette, SchemeKind};
use crate::core::controller::ShutdownController;
use crate::core::countdown::CountdownProgress;
use crate::core::error::ShutdownError;
use crate::core::shutdown::{ShutdownFacility, SystemShutdown};
use crate::core::types::{
    AbortOutcome, ScheduleFailure, ScheduleReceipt, ScheduleRequest, MINUTES_IN_DAY,
    MIN_OFFSET_MINUTES,
};
use crate::ui::components::{self, Dialog};
use crate::ui::theme::Theme;

/// 刷新间隔（毫秒）
pub const TICK_INTERVAL_MS: u64 = 1000;

/// 应用程序消息类型
#[derive(Debug, Clone)]
pub enum Message {
    /// 滑块值改变
    OffsetChanged(u32),
    /// 点击安排关机
    Schedule,
    /// 点击取消关机
    Cancel,
    /// 安排关机的系统调用完成
    Scheduled(Result<ScheduleReceipt, ScheduleFailure>),
    /// 取消关机的系统调用完成
    Canceled(Result<AbortOutcome, ShutdownError>),
    /// 每秒刷新
    Tick,
    /// 关闭对话框
    DismissDialog,
}

/// 启动参数
#[derive(Debug, Clone)]
pub struct UiFlags<F> {
    pub facility: F,
    pub color_scheme: SchemeKind,
    pub default_offset_minutes: u32,
}

/// 根据当前状态构造配色输入
///
/// 已安排关机时使用实际目标时间，否则使用滑块预览时间
pub fn color_sample(
    now: DateTime<Local>,
    offset_minutes: u32,
    scheduled_target: Option<DateTime<Local>>,
) -> ColorSample {
    ColorSample {
        target: scheduled_target
            .unwrap_or_else(|| now + Duration::minutes(i64::from(offset_minutes))),
        offset_minutes,
    }
}

/// UI管理器应用程序状态
#[derive(Debug)]
pub struct UIManager<F> {
    controller: ShutdownController<F>,
    scheme: Box<dyn ColorScheme>,
    offset_minutes: u32,
    now: DateTime<Local>,
    palette: Palette,
    progress: Option<CountdownProgress>,
    busy: bool,
    dialog: Option<Dialog>,
}

impl<F: ShutdownFacility> UIManager<F> {
    fn from_flags(flags: UiFlags<F>, now: DateTime<Local>) -> Self {
        let scheme = flags.color_scheme.build();
        let offset_minutes = flags
            .default_offset_minutes
            .clamp(MIN_OFFSET_MINUTES, MINUTES_IN_DAY);
        let palette = scheme.palette(&color_sample(now, offset_minutes, None));
        info!("使用配色方案: {}", scheme.name());

        Self {
            controller: ShutdownController::new(flags.facility),
            scheme,
            offset_minutes,
            now,
            palette,
            progress: None,
            busy: false,
            dialog: None,
        }
    }

    fn refresh_palette(&mut self) {
        let target = self.controller.active().map(|s| s.target_time);
        self.palette = self
            .scheme
            .palette(&color_sample(self.now, self.offset_minutes, target));
    }

    fn show_error(&mut self, err: &ShutdownError) {
        self.dialog = Some(Dialog::from(err));
    }

    fn handle(&mut self, message: Message, now: DateTime<Local>) -> Command<Message> {
        self.now = now;
        let command = match message {
            Message::OffsetChanged(value) => {
                self.offset_minutes = value.clamp(MIN_OFFSET_MINUTES, MINUTES_IN_DAY);
                Command::none()
            }
            Message::Schedule => {
                if self.busy {
                    return Command::none();
                }
                match ScheduleRequest::new(self.offset_minutes) {
                    Ok(request) => {
                        self.busy = true;
                        let pending = self.controller.begin_schedule(request, now);
                        Command::perform(pending, Message::Scheduled)
                    }
                    Err(e) => {
                        self.show_error(&e);
                        Command::none()
                    }
                }
            }
            Message::Scheduled(result) => {
                self.busy = false;
                if let Err(e) = self.controller.finish_schedule(result) {
                    self.show_error(&e);
                }
                // 失败时旧的关机可能仍在等待执行
                self.progress = self.controller.progress(now);
                Command::none()
            }
            Message::Cancel => {
                if self.busy {
                    return Command::none();
                }
                self.busy = true;
                let pending = self.controller.begin_cancel();
                Command::perform(pending, Message::Canceled)
            }
            Message::Canceled(result) => {
                self.busy = false;
                if let Err(e) = self.controller.finish_cancel(result) {
                    self.show_error(&e);
                }
                if self.controller.active().is_none() {
                    self.progress = None;
                }
                Command::none()
            }
            Message::Tick => {
                if let Some(progress) = self.controller.tick(now) {
                    debug!("倒计时刷新: {}", progress.label());
                    self.progress = Some(progress);
                }
                Command::none()
            }
            Message::DismissDialog => {
                self.dialog = None;
                Command::none()
            }
        };
        self.refresh_palette();
        command
    }
}

/// 运行UI应用程序
pub fn run(flags: UiFlags<SystemShutdown>, window_size: (f32, f32)) -> iced::Result {
    let (width, height) = window_size;
    let settings = Settings {
        window: window::Settings {
            size: Size::new(width, height),
            resizable: false,
            ..window::Settings::default()
        },
        ..Settings::with_flags(flags)
    };
    UIManager::run(settings)
}

impl<F: ShutdownFacility> Application for UIManager<F> {
    type Message = Message;
    type Theme = IcedTheme;
    type Executor = executor::Default;
    type Flags = UiFlags<F>;

    fn new(flags: Self::Flags) -> (Self, Command<Self::Message>) {
        (Self::from_flags(flags, Local::now()), Command::none())
    }

    fn title(&self) -> String {
        "Modern Shutdown Scheduler".to_string()
    }

    fn update(&mut self, message: Self::Message) -> Command<Self::Message> {
        self.handle(message, Local::now())
    }

    fn subscription(&self) -> Subscription<Self::Message> {
        iced::time::every(StdDuration::from_millis(TICK_INTERVAL_MS)).map(|_| Message::Tick)
    }

    fn view(&self) -> Element<'_, Self::Message> {
        let theme = Theme::from_palette(&self.palette);

        if let Some(dialog) = &self.dialog {
            return components::dialog(&theme, dialog);
        }

        let mut content = column![components::header(&theme, self.palette.bucket)]
            .spacing(18)
            .padding(30)
            .width(Length::Fill);

        if let Some(progress) = &self.progress {
            content = content.push(components::countdown_bar(&theme, progress));
        }

        let content = content
            .push(components::offset_picker(&theme, self.now, self.offset_minutes))
            .push(components::action_buttons(&theme, self.busy))
            .push(components::log_pane(&theme, self.controller.log().lines()));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(theme.window())
            .into()
    }

    fn theme(&self) -> Self::Theme {
        IcedTheme::Dark
    }
}
