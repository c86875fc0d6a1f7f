//! 倒计时模块
//!
//! 根据关机开始时间和目标时间计算进度，供每秒一次的刷新使用

use chrono::{DateTime, Duration, Local};

use crate::core::types::ScheduledShutdown;

/// 倒计时进度快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownProgress {
    /// 总秒数
    pub total_seconds: u64,
    /// 已经过的秒数（不超过总秒数）
    pub elapsed_seconds: u64,
    /// 剩余秒数
    pub remaining_seconds: u64,
}

impl CountdownProgress {
    /// 是否已到达目标时间
    pub fn is_finished(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// 进度百分比 [0, 100]
    pub fn percent(&self) -> f32 {
        if self.total_seconds == 0 {
            return 100.0;
        }
        (self.elapsed_seconds as f32 / self.total_seconds as f32 * 100.0).clamp(0.0, 100.0)
    }

    /// 进度条文本
    pub fn label(&self) -> String {
        format!("{} seconds left", self.remaining_seconds)
    }

    pub fn remaining(&self) -> Duration {
        Duration::seconds(self.remaining_seconds as i64)
    }
}

/// 倒计时
///
/// 只保存起止时间，进度每次从墙上时钟重新计算
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    start_time: DateTime<Local>,
    target_time: DateTime<Local>,
}

impl Countdown {
    /// 创建倒计时
    ///
    /// # 参数
    ///
    /// * `start_time` - 安排关机的时刻
    /// * `target_time` - 关机目标时间
    pub fn new(start_time: DateTime<Local>, target_time: DateTime<Local>) -> Self {
        Self {
            start_time,
            target_time,
        }
    }

    /// 计算指定时刻的进度
    ///
    /// 时钟回拨到开始时间之前时，已过时间按0处理
    pub fn progress_at(&self, now: DateTime<Local>) -> CountdownProgress {
        let total_seconds = (self.target_time - self.start_time).num_seconds().max(0) as u64;
        let elapsed_seconds = ((now - self.start_time).num_seconds().max(0) as u64).min(total_seconds);

        CountdownProgress {
            total_seconds,
            elapsed_seconds,
            remaining_seconds: total_seconds - elapsed_seconds,
        }
    }
}

impl From<&ScheduledShutdown> for Countdown {
    fn from(scheduled: &ScheduledShutdown) -> Self {
        Self::new(scheduled.start_time, scheduled.target_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_progress_midway() {
        let countdown = Countdown::new(at(10, 0, 0), at(11, 0, 0));
        let progress = countdown.progress_at(at(10, 15, 0));

        assert_eq!(progress.total_seconds, 3600);
        assert_eq!(progress.elapsed_seconds, 900);
        assert_eq!(progress.remaining_seconds, 2700);
        assert!(!progress.is_finished());
        assert_eq!(progress.percent(), 25.0);
        assert_eq!(progress.label(), "2700 seconds left");
    }

    #[test]
    fn test_progress_clamped() {
        let countdown = Countdown::new(at(10, 0, 0), at(10, 1, 0));

        let late = countdown.progress_at(at(10, 5, 0));
        assert_eq!(late.remaining_seconds, 0);
        assert_eq!(late.elapsed_seconds, 60);
        assert!(late.is_finished());

        let early = countdown.progress_at(at(9, 59, 0));
        assert_eq!(early.elapsed_seconds, 0);
        assert_eq!(early.remaining_seconds, 60);
    }
}
