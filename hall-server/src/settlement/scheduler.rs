//! 结算定时任务
//!
//! 周期触发逾期清扫与佣金补建。注册为 `TaskKind::Periodic`，
//! 通过 CancellationToken 响应 shutdown。两个过程本身无状态，
//! 以当前时刻为参数调用。

use tokio_util::sync::CancellationToken;

use crate::settlement::SettlementEngine;
use crate::utils::time::now_millis;

/// 结算调度器
pub struct SettlementScheduler {
    engine: SettlementEngine,
    interval: std::time::Duration,
    shutdown: CancellationToken,
}

impl SettlementScheduler {
    pub fn new(
        engine: SettlementEngine,
        interval: std::time::Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            engine,
            interval,
            shutdown,
        }
    }

    /// 主循环：启动时先跑一轮，然后按间隔触发
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Settlement scheduler started"
        );

        self.tick().await;

        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        timer.tick().await; // first tick fires immediately; already ran above

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = timer.tick() => self.tick().await,
            }
        }

        tracing::info!("Settlement scheduler stopped");
    }

    async fn tick(&self) {
        let now = now_millis();

        let sweep = self.engine.overdue_sweep(now).await;
        tracing::debug!(
            overdue = sweep.overdue,
            swept = sweep.swept,
            failed = sweep.failed,
            "Overdue sweep tick"
        );

        if let Err(e) = self.engine.reconcile_missing(now).await {
            tracing::error!(error = %e, "Commission reconciliation tick failed");
        }
    }
}
