//! 核心数据类型定义
//!
//! 定义关机请求、已安排的关机以及倒计时状态等数据结构

use chrono::{DateTime, Duration, Local, SubsecRound};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::ShutdownError;

/// 一天的分钟数，也是滑块的最大值
pub const MINUTES_IN_DAY: u32 = 24 * 60;

/// 最小偏移量（分钟）
pub const MIN_OFFSET_MINUTES: u32 = 1;

/// 关机请求
///
/// 由滑块值构造，提交给系统后不可修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    offset_minutes: u32,
}

impl ScheduleRequest {
    /// 创建关机请求
    ///
    /// # 参数
    ///
    /// * `offset_minutes` - 距现在的分钟数，必须在 [1, 1440] 之间
    ///
    /// # 返回值
    ///
    /// 偏移量超出范围时返回 [`ShutdownError::InvalidOffset`]
    pub fn new(offset_minutes: u32) -> Result<Self, ShutdownError> {
        if (MIN_OFFSET_MINUTES..=MINUTES_IN_DAY).contains(&offset_minutes) {
            Ok(Self { offset_minutes })
        } else {
            Err(ShutdownError::InvalidOffset(offset_minutes))
        }
    }

    pub fn offset_minutes(&self) -> u32 {
        self.offset_minutes
    }

    /// 根据当前时间计算关机计划
    ///
    /// 起始时间截断到整秒，目标时间 = 起始时间 + 偏移量
    pub fn plan(&self, now: DateTime<Local>) -> SchedulePlan {
        let start_time = now.trunc_subsecs(0);
        let target_time = start_time + Duration::minutes(i64::from(self.offset_minutes));
        let seconds_until = (target_time - start_time).num_seconds().max(0) as u64;

        SchedulePlan {
            request: *self,
            start_time,
            target_time,
            seconds_until,
        }
    }
}

/// 关机计划
///
/// 调用系统命令之前计算出的纯数据
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePlan {
    pub request: ScheduleRequest,
    pub start_time: DateTime<Local>,
    pub target_time: DateTime<Local>,
    pub seconds_until: u64,
}

impl SchedulePlan {
    /// 日志中使用的描述
    pub fn describe(&self) -> String {
        format!(
            "Initiating system shutdown at {} (in {} seconds)",
            self.target_time.format("%H:%M"),
            self.seconds_until
        )
    }
}

/// 取消并重新安排关机的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleReceipt {
    pub plan: SchedulePlan,
    /// 之前是否存在待执行的关机并已被取消
    pub replaced_pending: bool,
}

/// 安排关机失败
///
/// `previous` 记录预先取消的结果；为 `None` 时预先取消没有生效，
/// 之前安排的关机可能仍在系统中等待执行
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleFailure {
    pub error: ShutdownError,
    pub previous: Option<AbortOutcome>,
}

/// 系统取消命令的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortOutcome {
    /// 存在待执行的关机，已取消
    Aborted,
    /// 没有待执行的关机
    NothingPending,
}

/// 已安排的关机
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledShutdown {
    pub start_time: DateTime<Local>,
    pub target_time: DateTime<Local>,
    pub offset_minutes: u32,
}

impl From<&SchedulePlan> for ScheduledShutdown {
    fn from(plan: &SchedulePlan) -> Self {
        Self {
            start_time: plan.start_time,
            target_time: plan.target_time,
            offset_minutes: plan.request.offset_minutes(),
        }
    }
}

/// 倒计时状态枚举
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownStatus {
    /// 空闲状态，没有待执行的关机
    Idle,
    /// 运行中，包含剩余时间
    Running { remaining: Duration },
    /// 倒计时结束，系统即将关机
    Finished,
}

impl fmt::Display for CountdownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownStatus::Idle => write!(f, "No shutdown scheduled"),
            CountdownStatus::Running { remaining } => {
                write!(f, "{} seconds left", remaining.num_seconds().max(0))
            }
            CountdownStatus::Finished => write!(f, "Shutting down..."),
        }
    }
}

/// 时段分类，仅用于配色和图标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDayBucket {
    Morning,
    Day,
    Evening,
    Night,
}

impl TimeOfDayBucket {
    /// 时段图标
    pub fn icon(&self) -> &'static str {
        match self {
            TimeOfDayBucket::Morning => "🌅",
            TimeOfDayBucket::Day => "☀",
            TimeOfDayBucket::Evening => "🌇",
            TimeOfDayBucket::Night => "🌙",
        }
    }
}

impl fmt::Display for TimeOfDayBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDayBucket::Morning => write!(f, "morning"),
            TimeOfDayBucket::Day => write!(f, "day"),
            TimeOfDayBucket::Evening => write!(f, "evening"),
            TimeOfDayBucket::Night => write!(f, "night"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn test_request_bounds() {
        assert!(ScheduleRequest::new(1).is_ok());
        assert!(ScheduleRequest::new(MINUTES_IN_DAY).is_ok());
        assert_eq!(ScheduleRequest::new(0), Err(ShutdownError::InvalidOffset(0)));
        assert_eq!(
            ScheduleRequest::new(1441),
            Err(ShutdownError::InvalidOffset(1441))
        );
    }

    #[test]
    fn test_plan_one_hour() {
        let plan = ScheduleRequest::new(60).unwrap().plan(at(14, 0, 0));
        assert_eq!(plan.target_time, at(15, 0, 0));
        assert_eq!(plan.seconds_until, 3600);
        assert_eq!(
            plan.describe(),
            "Initiating system shutdown at 15:00 (in 3600 seconds)"
        );
    }

    #[test]
    fn test_plan_crosses_midnight() {
        let plan = ScheduleRequest::new(1).unwrap().plan(at(23, 59, 0));
        assert_eq!(plan.target_time.hour(), 0);
        assert_eq!(plan.target_time.minute(), 0);
        assert_eq!(plan.target_time.date_naive(), at(23, 59, 0).date_naive().succ_opt().unwrap());
        assert_eq!(plan.seconds_until, 60);
    }

    #[test]
    fn test_plan_truncates_subseconds() {
        let now = at(9, 30, 15) + Duration::milliseconds(750);
        for offset in [1, 7, 59, 60, 333, 1439, 1440] {
            let plan = ScheduleRequest::new(offset).unwrap().plan(now);
            assert_eq!(plan.target_time.nanosecond(), 0);
            assert_eq!(plan.start_time, at(9, 30, 15));
            let expected = i64::from(offset) * 60;
            assert!((plan.seconds_until as i64 - expected).abs() <= 1);
        }
    }

    #[test]
    fn test_scheduled_shutdown_from_plan() {
        let plan = ScheduleRequest::new(90).unwrap().plan(at(20, 0, 0));
        let scheduled = ScheduledShutdown::from(&plan);
        assert_eq!(scheduled.start_time, at(20, 0, 0));
        assert_eq!(scheduled.target_time, at(21, 30, 0));
        assert_eq!(scheduled.offset_minutes, 90);
    }

    #[test]
    fn test_countdown_status_display() {
        assert_eq!(
            CountdownStatus::Running { remaining: Duration::seconds(42) }.to_string(),
            "42 seconds left"
        );
        assert_eq!(CountdownStatus::Idle.to_string(), "No shutdown scheduled");
    }
}
