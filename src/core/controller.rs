//! 关机控制器模块
//!
//! 持有唯一的已安排关机、倒计时状态和界面日志。
//! 系统调用拆成 `begin_*`（生成只持有设施克隆的 future）和
//! `finish_*`（把结果写回控制器）两步，以便在GUI事件循环中执行。

use std::future::Future;

use chrono::{DateTime, Local};
use log::{error, info, warn};

use crate::core::countdown::{Countdown, CountdownProgress};
use crate::core::error::ShutdownError;
use crate::core::shutdown::ShutdownFacility;
use crate::core::types::{
    AbortOutcome, CountdownStatus, ScheduleFailure, SchedulePlan, ScheduleReceipt,
    ScheduleRequest, ScheduledShutdown,
};

/// 界面日志最多保留的行数
pub const MAX_LOG_LINES: usize = 200;

/// 界面日志
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    lines: Vec<String>,
}

impl ActivityLog {
    pub fn push(&mut self, message: impl Into<String>) {
        self.lines.push(format!("> {}", message.into()));
        if self.lines.len() > MAX_LOG_LINES {
            let excess = self.lines.len() - MAX_LOG_LINES;
            self.lines.drain(..excess);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}

/// 先取消已有关机再安排新的关机
///
/// 预先取消时"没有待执行关机"和命令失败都会被忽略，只有无法启动命令时中止。
/// 失败结果中带有预先取消的结果，用于判断旧的关机是否仍在等待执行。
pub async fn reschedule<F: ShutdownFacility>(
    facility: F,
    plan: SchedulePlan,
) -> Result<ScheduleReceipt, ScheduleFailure> {
    let previous = match facility.abort().await {
        Ok(outcome) => Some(outcome),
        Err(e @ ShutdownError::CommandFailed { .. }) => {
            warn!("预先取消关机失败，继续安排: {}", e);
            None
        }
        Err(error) => {
            return Err(ScheduleFailure {
                error,
                previous: None,
            })
        }
    };

    if let Err(error) = facility.schedule_in(plan.seconds_until).await {
        return Err(ScheduleFailure { error, previous });
    }

    Ok(ScheduleReceipt {
        plan,
        replaced_pending: previous == Some(AbortOutcome::Aborted),
    })
}

/// 关机控制器
#[derive(Debug)]
pub struct ShutdownController<F> {
    facility: F,
    active: Option<ScheduledShutdown>,
    countdown: Option<Countdown>,
    status: CountdownStatus,
    log: ActivityLog,
}

impl<F: ShutdownFacility> ShutdownController<F> {
    pub fn new(facility: F) -> Self {
        Self {
            facility,
            active: None,
            countdown: None,
            status: CountdownStatus::Idle,
            log: ActivityLog::default(),
        }
    }

    pub fn active(&self) -> Option<&ScheduledShutdown> {
        self.active.as_ref()
    }

    #[cfg(test)]
    pub fn status(&self) -> &CountdownStatus {
        &self.status
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// 是否需要每秒刷新倒计时
    pub fn is_polling(&self) -> bool {
        matches!(self.status, CountdownStatus::Running { .. })
    }

    /// 开始安排关机
    ///
    /// 返回的 future 执行"取消-安排"两次系统调用，结果交给 [`Self::finish_schedule`]
    pub fn begin_schedule(
        &mut self,
        request: ScheduleRequest,
        now: DateTime<Local>,
    ) -> impl Future<Output = Result<ScheduleReceipt, ScheduleFailure>> + Send + 'static {
        let plan = request.plan(now);
        info!(
            "请求安排关机: 偏移 {} 分钟, 目标 {}",
            request.offset_minutes(),
            plan.target_time.format("%Y-%m-%d %H:%M:%S")
        );
        reschedule(self.facility.clone(), plan)
    }

    /// 应用安排关机的结果
    ///
    /// 只有系统调用成功后才记录已安排的关机并开始倒计时。
    /// 失败时只有确认旧的关机已不在系统中，才清除之前的倒计时。
    pub fn finish_schedule(
        &mut self,
        result: Result<ScheduleReceipt, ScheduleFailure>,
    ) -> Result<ScheduledShutdown, ShutdownError> {
        match result {
            Ok(receipt) => {
                if receipt.replaced_pending {
                    self.record_info("A shutdown was already pending and has been canceled.");
                }
                self.record_info(receipt.plan.describe());

                let scheduled = ScheduledShutdown::from(&receipt.plan);
                self.countdown = Some(Countdown::from(&scheduled));
                self.status = CountdownStatus::Running {
                    remaining: chrono::Duration::seconds(receipt.plan.seconds_until as i64),
                };
                self.active = Some(scheduled.clone());
                Ok(scheduled)
            }
            Err(ScheduleFailure { error, previous }) => {
                match previous {
                    Some(AbortOutcome::Aborted) => {
                        self.clear();
                        self.record_info("A shutdown was already pending and has been canceled.");
                    }
                    Some(AbortOutcome::NothingPending) => self.clear(),
                    None => {
                        if let Some(active) = &self.active {
                            let message = format!(
                                "The shutdown scheduled for {} is still active.",
                                active.target_time.format("%H:%M")
                            );
                            self.record_warning(message);
                        }
                    }
                }
                self.record_error(format!("Failed to schedule shutdown: {}", error));
                Err(error)
            }
        }
    }

    /// 安排关机
    #[cfg(test)]
    pub async fn schedule(
        &mut self,
        request: ScheduleRequest,
        now: DateTime<Local>,
    ) -> Result<ScheduledShutdown, ShutdownError> {
        let pending = self.begin_schedule(request, now);
        let result = pending.await;
        self.finish_schedule(result)
    }

    /// 开始取消关机
    pub fn begin_cancel(
        &mut self,
    ) -> impl Future<Output = Result<AbortOutcome, ShutdownError>> + Send + 'static {
        info!("请求取消关机");
        let facility = self.facility.clone();
        async move { facility.abort().await }
    }

    /// 应用取消关机的结果
    ///
    /// 没有待执行的关机时返回 [`ShutdownError::NoScheduledShutdown`]
    pub fn finish_cancel(
        &mut self,
        result: Result<AbortOutcome, ShutdownError>,
    ) -> Result<(), ShutdownError> {
        match result {
            Ok(AbortOutcome::Aborted) => {
                self.clear();
                self.record_info("Shutdown has been canceled.");
                Ok(())
            }
            Ok(AbortOutcome::NothingPending) => {
                // 系统中已经没有待执行的关机，本地状态随之清除
                self.clear();
                self.record_warning("Failed to cancel shutdown - No shutdown was scheduled.");
                Err(ShutdownError::NoScheduledShutdown)
            }
            Err(e) => {
                self.record_error(format!("Error: {}", e));
                Err(e)
            }
        }
    }

    /// 取消关机
    #[cfg(test)]
    pub async fn cancel(&mut self) -> Result<(), ShutdownError> {
        let pending = self.begin_cancel();
        let result = pending.await;
        self.finish_cancel(result)
    }

    /// 每秒调用一次，刷新倒计时
    ///
    /// 没有运行中的倒计时时返回 `None`；剩余时间为0后停止刷新
    pub fn tick(&mut self, now: DateTime<Local>) -> Option<CountdownProgress> {
        if !self.is_polling() {
            return None;
        }
        let countdown = self.countdown.as_ref()?;
        let progress = countdown.progress_at(now);

        if progress.is_finished() {
            info!("倒计时结束，系统即将关机");
            self.status = CountdownStatus::Finished;
        } else {
            self.status = CountdownStatus::Running {
                remaining: progress.remaining(),
            };
        }
        Some(progress)
    }

    /// 当前进度（不改变状态）
    pub fn progress(&self, now: DateTime<Local>) -> Option<CountdownProgress> {
        self.countdown.as_ref().map(|c| c.progress_at(now))
    }

    fn clear(&mut self) {
        self.active = None;
        self.countdown = None;
        self.status = CountdownStatus::Idle;
    }

    fn record_info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.log.push(message);
    }

    fn record_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.log.push(message);
    }

    fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.log.push(message);
    }
}
