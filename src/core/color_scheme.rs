//! 配色方案模块
//!
//! 根据时间计算界面的背景色、文字色、滑块色以及时段图标。
//! 配色方案是可替换的策略，所有计算都是无副作用的纯函数。

use std::fmt;

use chrono::{DateTime, Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::core::types::{TimeOfDayBucket, MINUTES_IN_DAY};

/// RGB颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 线性插值，t 会被限制在 [0, 1]，t=0 和 t=1 时精确返回端点颜色
    pub fn lerp(from: Rgb, to: Rgb, t: f32) -> Rgb {
        Self::interpolate(from, to, t, f32::round)
    }

    /// 线性插值，通道值向零取整
    pub fn lerp_truncated(from: Rgb, to: Rgb, t: f32) -> Rgb {
        Self::interpolate(from, to, t, f32::trunc)
    }

    fn interpolate(from: Rgb, to: Rgb, t: f32, to_integer: fn(f32) -> f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let channel = |a: u8, b: u8| -> u8 {
            let value = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
            to_integer(value).clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            channel(from.r, to.r),
            channel(from.g, to.g),
            channel(from.b, to.b),
        )
    }

    /// 各通道差值的最大值
    #[cfg(test)]
    pub fn max_channel_distance(&self, other: &Rgb) -> u8 {
        self.r
            .abs_diff(other.r)
            .max(self.g.abs_diff(other.g))
            .max(self.b.abs_diff(other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// 一组界面颜色以及对应的时段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub text: Rgb,
    pub slider: Rgb,
    pub bucket: TimeOfDayBucket,
}

/// 配色计算的输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample {
    /// 关机目标时间（未安排时为滑块预览时间）
    pub target: DateTime<Local>,
    /// 滑块偏移量（分钟）
    pub offset_minutes: u32,
}

/// 配色方案
pub trait ColorScheme: fmt::Debug + Send + Sync {
    /// 方案名称
    fn name(&self) -> &'static str;

    /// 计算配色
    fn palette(&self, sample: &ColorSample) -> Palette;
}

/// 配置文件中可选的配色方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    /// 按目标时间所在时段渐变
    #[default]
    DayCycle,
    /// 按偏移量占一天的比例渐变
    OffsetGradient,
}

impl SchemeKind {
    pub fn build(self) -> Box<dyn ColorScheme> {
        match self {
            SchemeKind::DayCycle => Box::new(DayCycle::default()),
            SchemeKind::OffsetGradient => Box::new(OffsetGradient),
        }
    }
}

/// 单个时段的固定颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BucketColors {
    background: Rgb,
    text: Rgb,
    slider: Rgb,
}

/// 时段起点
#[derive(Debug, Clone, Copy)]
struct Breakpoint {
    bucket: TimeOfDayBucket,
    /// 从零点开始的分钟数
    starts_at: u32,
    colors: BucketColors,
}

/// 按起始时间升序排列
const BREAKPOINTS: [Breakpoint; 4] = [
    Breakpoint {
        bucket: TimeOfDayBucket::Morning,
        starts_at: 5 * 60,
        colors: BucketColors {
            background: Rgb::new(255, 183, 130),
            text: Rgb::new(60, 36, 24),
            slider: Rgb::new(255, 140, 90),
        },
    },
    Breakpoint {
        bucket: TimeOfDayBucket::Day,
        starts_at: 8 * 60,
        colors: BucketColors {
            background: Rgb::new(255, 255, 255),
            text: Rgb::new(0, 0, 0),
            slider: Rgb::new(79, 140, 255),
        },
    },
    Breakpoint {
        bucket: TimeOfDayBucket::Evening,
        starts_at: 19 * 60,
        colors: BucketColors {
            background: Rgb::new(220, 140, 60),
            text: Rgb::new(255, 255, 255),
            slider: Rgb::new(255, 60, 60),
        },
    },
    Breakpoint {
        bucket: TimeOfDayBucket::Night,
        starts_at: 22 * 60,
        colors: BucketColors {
            background: Rgb::new(20, 24, 40),
            text: Rgb::new(255, 255, 255),
            slider: Rgb::new(150, 120, 230),
        },
    },
];

/// 默认过渡时长（分钟）
pub const DEFAULT_TRANSITION_MINUTES: u32 = 240;

/// 按一天中的时段渐变的配色
///
/// 进入某个时段时，颜色从上一个时段的颜色线性过渡到本时段的颜色，
/// 过渡时长为 `min(transition_minutes, 距下一个时段的分钟数)`，
/// 因此整天（包括零点）颜色连续。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCycle {
    transition_minutes: u32,
}

impl Default for DayCycle {
    fn default() -> Self {
        Self {
            transition_minutes: DEFAULT_TRANSITION_MINUTES,
        }
    }
}

impl DayCycle {
    /// 所在时段的下标和过渡进度 [0, 1]
    fn locate(&self, time: NaiveTime) -> (usize, f32) {
        let minute = time.num_seconds_from_midnight() as f32 / 60.0;
        let day = MINUTES_IN_DAY as f32;

        // 零点到第一个时段之前属于前一天的最后一个时段
        let index = BREAKPOINTS
            .iter()
            .rposition(|bp| bp.starts_at as f32 <= minute)
            .unwrap_or(BREAKPOINTS.len() - 1);

        let start = BREAKPOINTS[index].starts_at as f32;
        let elapsed = if minute >= start { minute - start } else { minute + day - start };

        let next = BREAKPOINTS[(index + 1) % BREAKPOINTS.len()].starts_at as f32;
        let span = if next > start { next - start } else { next + day - start };
        let window = span.min(self.transition_minutes as f32);

        (index, (elapsed / window).clamp(0.0, 1.0))
    }

    /// 指定时刻的配色
    pub fn palette_at(&self, time: NaiveTime) -> Palette {
        let (index, progress) = self.locate(time);
        let previous = &BREAKPOINTS[(index + BREAKPOINTS.len() - 1) % BREAKPOINTS.len()].colors;
        let current = &BREAKPOINTS[index];

        Palette {
            background: Rgb::lerp(previous.background, current.colors.background, progress),
            text: Rgb::lerp(previous.text, current.colors.text, progress),
            slider: Rgb::lerp(previous.slider, current.colors.slider, progress),
            bucket: current.bucket,
        }
    }
}

impl ColorScheme for DayCycle {
    fn name(&self) -> &'static str {
        "day_cycle"
    }

    fn palette(&self, sample: &ColorSample) -> Palette {
        self.palette_at(sample.target.time())
    }
}

const DAY_COLOR: Rgb = Rgb::new(255, 255, 255);
const MID_COLOR: Rgb = Rgb::new(220, 140, 60);
const NIGHT_COLOR: Rgb = Rgb::new(0, 0, 0);
const BLUE_COLOR: Rgb = Rgb::new(79, 140, 255);
const ORANGE_COLOR: Rgb = Rgb::new(220, 140, 60);
const RED_COLOR: Rgb = Rgb::new(255, 60, 60);

/// 前四分之一使用第一段渐变，其余使用第二段
const GRADIENT_SPLIT: f32 = 0.25;

/// 按偏移量占一天比例渐变的配色
///
/// 偏移量越大，背景越暗，滑块从蓝色经橙色变为红色。
/// 中间颜色的通道值向零取整。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffsetGradient;

impl OffsetGradient {
    /// 偏移量占一天的比例 [0, 1]
    pub fn transition_factor(offset_minutes: u32) -> f32 {
        (offset_minutes as f32 / MINUTES_IN_DAY as f32).clamp(0.0, 1.0)
    }

    fn two_stage(first: Rgb, middle: Rgb, last: Rgb, factor: f32) -> Rgb {
        if factor < GRADIENT_SPLIT {
            Rgb::lerp_truncated(first, middle, factor / GRADIENT_SPLIT)
        } else {
            Rgb::lerp_truncated(middle, last, (factor - GRADIENT_SPLIT) / (1.0 - GRADIENT_SPLIT))
        }
    }

    pub fn palette_for_offset(offset_minutes: u32) -> Palette {
        let factor = Self::transition_factor(offset_minutes);
        // 太阳和月亮按不透明度比较，太阳更亮时显示太阳
        let bucket = if 1.0 - factor > factor {
            TimeOfDayBucket::Day
        } else {
            TimeOfDayBucket::Night
        };

        Palette {
            background: Self::two_stage(DAY_COLOR, MID_COLOR, NIGHT_COLOR, factor),
            text: Rgb::lerp_truncated(NIGHT_COLOR, DAY_COLOR, factor),
            slider: Self::two_stage(BLUE_COLOR, ORANGE_COLOR, RED_COLOR, factor),
            bucket,
        }
    }
}

impl ColorScheme for OffsetGradient {
    fn name(&self) -> &'static str {
        "offset_gradient"
    }

    fn palette(&self, sample: &ColorSample) -> Palette {
        Self::palette_for_offset(sample.offset_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb::new(10, 200, 30);
        let b = Rgb::new(250, 0, 31);
        assert_eq!(Rgb::lerp(a, b, 0.0), a);
        assert_eq!(Rgb::lerp(a, b, 1.0), b);
        assert_eq!(Rgb::lerp(a, b, -3.0), a);
        assert_eq!(Rgb::lerp(a, b, 7.0), b);
        assert_eq!(Rgb::lerp(a, b, f32::NAN), a);
        assert_eq!(Rgb::lerp(Rgb::new(0, 0, 0), Rgb::new(200, 100, 50), 0.5), Rgb::new(100, 50, 25));
    }

    #[test]
    fn test_day_cycle_exact_at_breakpoints() {
        let scheme = DayCycle::default();
        for (i, bp) in BREAKPOINTS.iter().enumerate() {
            let previous = BREAKPOINTS[(i + BREAKPOINTS.len() - 1) % BREAKPOINTS.len()].colors;
            let start = hm(bp.starts_at / 60, bp.starts_at % 60);

            // 进度为0：精确等于上一个时段的颜色
            let at_start = scheme.palette_at(start);
            assert_eq!(at_start.background, previous.background);
            assert_eq!(at_start.text, previous.text);
            assert_eq!(at_start.slider, previous.slider);
            assert_eq!(at_start.bucket, bp.bucket);

            // 进度为1：精确等于本时段的颜色
            let next = BREAKPOINTS[(i + 1) % BREAKPOINTS.len()].starts_at;
            let span = (next + MINUTES_IN_DAY - bp.starts_at) % MINUTES_IN_DAY;
            let window = span.min(DEFAULT_TRANSITION_MINUTES);
            let end_minute = (bp.starts_at + window) % MINUTES_IN_DAY;
            let at_end = scheme.palette_at(hm(end_minute / 60, end_minute % 60));
            assert_eq!(at_end.background, bp.colors.background);
            assert_eq!(at_end.text, bp.colors.text);
            assert_eq!(at_end.slider, bp.colors.slider);
        }
    }

    #[test]
    fn test_day_cycle_is_continuous() {
        let scheme = DayCycle::default();
        let mut previous = scheme.palette_at(hm(0, 0));
        // 覆盖整天并回到零点
        for minute in 1..=MINUTES_IN_DAY {
            let m = minute % MINUTES_IN_DAY;
            let current = scheme.palette_at(hm(m / 60, m % 60));
            assert!(current.background.max_channel_distance(&previous.background) <= 3, "jump at minute {}", m);
            assert!(current.text.max_channel_distance(&previous.text) <= 3, "jump at minute {}", m);
            assert!(current.slider.max_channel_distance(&previous.slider) <= 3, "jump at minute {}", m);
            previous = current;
        }
    }

    #[test]
    fn test_day_cycle_buckets() {
        let bucket = |h, m| DayCycle::default().palette_at(hm(h, m)).bucket;
        assert_eq!(bucket(0, 0), TimeOfDayBucket::Night);
        assert_eq!(bucket(4, 59), TimeOfDayBucket::Night);
        assert_eq!(bucket(5, 0), TimeOfDayBucket::Morning);
        assert_eq!(bucket(12, 0), TimeOfDayBucket::Day);
        assert_eq!(bucket(19, 30), TimeOfDayBucket::Evening);
        assert_eq!(bucket(23, 0), TimeOfDayBucket::Night);
    }

    #[test]
    fn test_day_cycle_midday_is_plain_day() {
        let palette = DayCycle::default().palette_at(hm(13, 0));
        assert_eq!(palette.background, Rgb::new(255, 255, 255));
        assert_eq!(palette.text, Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_offset_gradient_endpoints() {
        let start = OffsetGradient::palette_for_offset(0);
        assert_eq!(start.background, DAY_COLOR);
        assert_eq!(start.text, NIGHT_COLOR);
        assert_eq!(start.slider, BLUE_COLOR);
        assert_eq!(start.bucket, TimeOfDayBucket::Day);

        let split = OffsetGradient::palette_for_offset(MINUTES_IN_DAY / 4);
        assert_eq!(split.background, MID_COLOR);
        assert_eq!(split.slider, ORANGE_COLOR);

        let end = OffsetGradient::palette_for_offset(MINUTES_IN_DAY);
        assert_eq!(end.background, NIGHT_COLOR);
        assert_eq!(end.text, DAY_COLOR);
        assert_eq!(end.slider, RED_COLOR);
        assert_eq!(end.bucket, TimeOfDayBucket::Night);
    }

    #[test]
    fn test_lerp_truncated_rounds_toward_zero() {
        let blue = Rgb::new(79, 140, 255);
        let orange = Rgb::new(220, 140, 60);
        assert_eq!(Rgb::lerp(blue, orange, 0.5), Rgb::new(150, 140, 158));
        assert_eq!(Rgb::lerp_truncated(blue, orange, 0.5), Rgb::new(149, 140, 157));
        assert_eq!(Rgb::lerp_truncated(blue, orange, 0.0), blue);
        assert_eq!(Rgb::lerp_truncated(blue, orange, 1.0), orange);
    }

    #[test]
    fn test_offset_gradient_truncates_midpoints() {
        // 180 / 1440 = 0.125，第一段渐变的中点
        let palette = OffsetGradient::palette_for_offset(180);
        assert_eq!(palette.slider, Rgb::new(149, 140, 157));
        assert_eq!(palette.background, Rgb::new(237, 197, 157));
        // 0.125 * 255 = 31.875
        assert_eq!(palette.text, Rgb::new(31, 31, 31));
    }

    #[test]
    fn test_offset_gradient_icon_switch() {
        assert_eq!(OffsetGradient::palette_for_offset(719).bucket, TimeOfDayBucket::Day);
        assert_eq!(OffsetGradient::palette_for_offset(720).bucket, TimeOfDayBucket::Night);
    }

    #[test]
    fn test_schemes_through_trait() {
        let now = Local.with_ymd_and_hms(2026, 7, 1, 20, 0, 0).unwrap();
        let sample = ColorSample {
            target: now + Duration::minutes(180),
            offset_minutes: 180,
        };

        let day_cycle = SchemeKind::DayCycle.build();
        assert_eq!(day_cycle.name(), "day_cycle");
        assert_eq!(day_cycle.palette(&sample).bucket, TimeOfDayBucket::Night);

        let gradient = SchemeKind::OffsetGradient.build();
        assert_eq!(gradient.name(), "offset_gradient");
        assert_eq!(gradient.palette(&sample), OffsetGradient::palette_for_offset(180));
    }

    #[test]
    fn test_scheme_kind_serde() {
        assert_eq!(serde_json::to_string(&SchemeKind::DayCycle).unwrap(), "\"day_cycle\"");
        let kind: SchemeKind = serde_json::from_str("\"offset_gradient\"").unwrap();
        assert_eq!(kind, SchemeKind::OffsetGradient);
    }
}
