//! Server Implementation
//!
//! HTTP 服务器启动和后台任务生命周期管理

use std::net::SocketAddr;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerState};
use crate::settlement::SettlementScheduler;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (for tests and embedding)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Background tasks: periodic overdue sweep + commission reconciliation
        let mut tasks = BackgroundTasks::new();
        if self.config.sweep_enabled {
            let scheduler = SettlementScheduler::new(
                state.settlement_engine.clone(),
                std::time::Duration::from_secs(self.config.sweep_interval_secs),
                tasks.shutdown_token(),
            );
            tasks.spawn("settlement_scheduler", TaskKind::Periodic, scheduler.run());
        } else {
            tracing::warn!("Settlement scheduler disabled (SWEEP_ENABLED=false)");
        }

        let app = crate::services::https::build_router(state.clone());

        let host: std::net::IpAddr = self
            .config
            .http_host
            .parse()
            .unwrap_or_else(|_| [0, 0, 0, 0].into());
        let addr = SocketAddr::from((host, self.config.http_port));
        tracing::info!("Hallbook server starting on http://{}", addr);

        let handle = axum_server::Handle::new();

        // Graceful shutdown on Ctrl-C
        let handle_clone = handle.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
            handle_clone.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
        });

        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;

        tasks.shutdown().await;

        Ok(())
    }
}
