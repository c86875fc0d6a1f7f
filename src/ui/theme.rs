//! UI主题模块
//!
//! 把配色方案计算出的 [`Palette`] 转换为 iced 的颜色和样式表

use iced::widget::{button, container, progress_bar, slider};
use iced::{Background, Border, Color, Shadow, Theme as IcedTheme, Vector};

use crate::core::color_scheme::{Palette, Rgb};

/// 圆角配置
pub const WINDOW_RADIUS: f32 = 32.0;
pub const BUTTON_RADIUS: f32 = 10.0;
pub const BAR_RADIUS: f32 = 12.0;

/// 按钮渐变色（固定，不随时段变化）
const SCHEDULE_BUTTON: Rgb = Rgb::new(163, 132, 232);
const CANCEL_BUTTON: Rgb = Rgb::new(179, 157, 219);
const DIALOG_BACKGROUND: Rgb = Rgb::new(40, 40, 50);

pub fn to_color(rgb: Rgb) -> Color {
    Color::from_rgb8(rgb.r, rgb.g, rgb.b)
}

fn with_alpha(color: Color, a: f32) -> Color {
    Color { a, ..color }
}

/// 当前配色
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub accent: Color,
}

impl Theme {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            background: to_color(palette.background),
            text: to_color(palette.text),
            accent: to_color(palette.slider),
        }
    }

    /// 主窗口容器样式
    pub fn window(&self) -> impl Fn(&IcedTheme) -> container::Appearance + 'static {
        let background = self.background;
        let text = self.text;
        move |_theme: &IcedTheme| container::Appearance {
            text_color: Some(text),
            background: Some(Background::Color(background)),
            border: Border {
                radius: WINDOW_RADIUS.into(),
                ..Border::default()
            },
            shadow: Shadow::default(),
        }
    }

    /// 日志面板样式
    pub fn log_pane(&self) -> impl Fn(&IcedTheme) -> container::Appearance + 'static {
        move |_theme: &IcedTheme| container::Appearance {
            text_color: Some(Color::WHITE),
            background: Some(Background::Color(Color::from_rgba8(40, 40, 50, 0.7))),
            border: Border {
                color: Color::from_rgb8(61, 61, 61),
                width: 1.5,
                radius: 18.0.into(),
            },
            shadow: Shadow::default(),
        }
    }

    /// 对话框样式
    pub fn dialog(&self) -> impl Fn(&IcedTheme) -> container::Appearance + 'static {
        let border_color = self.accent;
        move |_theme: &IcedTheme| container::Appearance {
            text_color: Some(Color::WHITE),
            background: Some(Background::Color(to_color(DIALOG_BACKGROUND))),
            border: Border {
                color: border_color,
                width: 2.0,
                radius: 18.0.into(),
            },
            shadow: Shadow::default(),
        }
    }

    pub fn slider(&self) -> iced::theme::Slider {
        iced::theme::Slider::Custom(Box::new(SliderStyle { accent: self.accent }))
    }

    pub fn progress_bar(&self) -> iced::theme::ProgressBar {
        iced::theme::ProgressBar::Custom(Box::new(ProgressStyle { accent: self.accent }))
    }

    pub fn schedule_button(&self) -> iced::theme::Button {
        iced::theme::Button::Custom(Box::new(ButtonStyle {
            fill: to_color(SCHEDULE_BUTTON),
        }))
    }

    pub fn cancel_button(&self) -> iced::theme::Button {
        iced::theme::Button::Custom(Box::new(ButtonStyle {
            fill: to_color(CANCEL_BUTTON),
        }))
    }
}

/// 滑块样式：已选部分和手柄使用强调色
struct SliderStyle {
    accent: Color,
}

impl slider::StyleSheet for SliderStyle {
    type Style = IcedTheme;

    fn active(&self, _style: &Self::Style) -> slider::Appearance {
        slider::Appearance {
            rail: slider::Rail {
                colors: (self.accent, with_alpha(Color::WHITE, 0.12)),
                width: 12.0,
                border_radius: 6.0.into(),
            },
            handle: slider::Handle {
                shape: slider::HandleShape::Circle { radius: 8.0 },
                color: self.accent,
                border_width: 2.0,
                border_color: Color::WHITE,
            },
        }
    }

    fn hovered(&self, style: &Self::Style) -> slider::Appearance {
        let mut appearance = self.active(style);
        appearance.handle.shape = slider::HandleShape::Circle { radius: 9.0 };
        appearance
    }

    fn dragging(&self, style: &Self::Style) -> slider::Appearance {
        self.hovered(style)
    }
}

/// 进度条样式
struct ProgressStyle {
    accent: Color,
}

impl progress_bar::StyleSheet for ProgressStyle {
    type Style = IcedTheme;

    fn appearance(&self, _style: &Self::Style) -> progress_bar::Appearance {
        progress_bar::Appearance {
            background: Background::Color(with_alpha(Color::WHITE, 0.08)),
            bar: Background::Color(self.accent),
            border_radius: BAR_RADIUS.into(),
        }
    }
}

/// 按钮样式
struct ButtonStyle {
    fill: Color,
}

impl button::StyleSheet for ButtonStyle {
    type Style = IcedTheme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            shadow_offset: Vector::default(),
            background: Some(Background::Color(self.fill)),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb8(179, 157, 219),
                width: 1.0,
                radius: BUTTON_RADIUS.into(),
            },
            shadow: Shadow::default(),
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        let mut appearance = self.active(style);
        appearance.background = Some(Background::Color(with_alpha(self.fill, 0.85)));
        appearance
    }

    fn disabled(&self, style: &Self::Style) -> button::Appearance {
        let mut appearance = self.active(style);
        appearance.background = Some(Background::Color(with_alpha(self.fill, 0.4)));
        appearance.text_color = with_alpha(Color::WHITE, 0.6);
        appearance
    }
}
