//! Module orchestration -- assembly, channel wiring, and lifecycle management.
//!
//! The [`Orchestrator`] is the central coordinator of `srcstat-daemon`.
//! It validates configuration, builds the listener and the match engine,
//! wires them together, manages startup/shutdown ordering, and logs
//! every completed match.
//!
//! # Startup Order (consumers before producers)
//!
//! 1. Match Engine (consumes ServerEvents)
//! 2. Log Listener (binds the UDP socket, produces ServerEvents)
//!
//! # Shutdown Order (producers first)
//!
//! 1. Log Listener (cancel, socket dropped, queue drained)
//! 2. Match Engine (workers drain their channels)

use std::net::SocketAddr;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};

use srcstat_core::config::SrcstatConfig;
use srcstat_core::pipeline::Pipeline;
use srcstat_log_pipeline::LogPipeline;
use srcstat_log_pipeline::collector::ListenerStatsSnapshot;
use srcstat_match_engine::{CompletedMatch, MatchEngine};

use crate::health::{
    DaemonHealth, MODULE_LISTENER, MODULE_MATCH_ENGINE, ModuleHealth, aggregate_status,
};
use crate::metrics_server;
use crate::modules;

/// Listener -> match engine channel capacity.
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Seconds between health log lines.
const HEALTH_LOG_INTERVAL_SECS: u64 = 60;

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: SrcstatConfig,
    listener: LogPipeline,
    engine: MatchEngine,
    /// Completed matches from the engine, taken by the match logger task.
    completed_rx: Option<mpsc::Receiver<CompletedMatch>>,
    /// Shutdown broadcast sender (signals all background tasks).
    shutdown_tx: broadcast::Sender<()>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
    running: bool,
}

impl Orchestrator {
    /// Load configuration and build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or parsed
    /// - Configuration validation fails
    /// - Any module fails to initialize
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = SrcstatConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config)
    }

    /// Build from an already-loaded configuration.
    pub fn build_from_config(config: SrcstatConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        // Install metrics recorder before module initialization
        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        let (listener, event_rx) = modules::listener::init(&config, EVENT_CHANNEL_CAPACITY)?;
        let (engine, completed_rx) = modules::match_engine::init(&config, event_rx)?;
        let (shutdown_tx, _) = broadcast::channel(16);

        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!(srcstat_core::metrics::DAEMON_CONFIGURED_SERVERS)
            .set(config.servers.len() as f64);

        tracing::info!(servers = config.servers.len(), "orchestrator initialized");

        Ok(Self {
            config,
            listener,
            engine,
            completed_rx: Some(completed_rx),
            shutdown_tx,
            tasks: Vec::new(),
            start_time: Instant::now(),
            running: false,
        })
    }

    /// Start both modules and the background tasks.
    ///
    /// If the listener fails to start, the already-started engine is stopped again.
    pub async fn start(&mut self) -> Result<()> {
        if self.running {
            return Err(anyhow::anyhow!("orchestrator already running"));
        }

        tracing::info!("starting match engine");
        self.engine.start().await?;

        tracing::info!("starting log listener");
        if let Err(e) = self.listener.start().await {
            tracing::warn!("listener startup failed, rolling back match engine");
            if let Err(stop_err) = self.engine.stop().await {
                tracing::error!(
                    startup_error = %e,
                    rollback_error = %stop_err,
                    "rollback also failed during startup failure cleanup"
                );
            }
            return Err(e.into());
        }

        if let Some(completed_rx) = self.completed_rx.take() {
            let shutdown_rx = self.shutdown_tx.subscribe();
            self.tasks.push(spawn_match_logger(completed_rx, shutdown_rx));
        }
        if self.config.metrics.enabled {
            let shutdown_rx = self.shutdown_tx.subscribe();
            self.tasks
                .push(spawn_uptime_updater(self.start_time, shutdown_rx));
        }

        self.running = true;
        tracing::info!(local_addr = ?self.listener.local_addr(), "srcstat-daemon running");
        Ok(())
    }

    /// Start, block until SIGTERM/SIGINT, then shut down gracefully.
    pub async fn run(&mut self) -> Result<()> {
        self.start().await?;

        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(
            HEALTH_LOG_INTERVAL_SECS,
        ));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let signal = wait_for_shutdown_signal();
        tokio::pin!(signal);

        let signal = loop {
            tokio::select! {
                result = &mut signal => break result?,
                _ = interval.tick() => {
                    let health = self.health().await;
                    if health.status.is_healthy() {
                        tracing::debug!(uptime_secs = health.uptime_secs, "daemon healthy");
                    } else {
                        tracing::warn!(status = %health.status, "daemon health degraded");
                    }
                }
            }
        };
        tracing::info!(signal = signal, "shutdown signal received");

        self.shutdown().await
    }

    /// Stop the listener, then the engine, then the background tasks.
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.running {
            return Err(anyhow::anyhow!("orchestrator not running"));
        }

        tracing::info!("stopping log listener");
        let listener_result = self.listener.stop().await;
        if let Err(e) = &listener_result {
            tracing::error!(error = %e, "failed to stop log listener");
        }

        tracing::info!("stopping match engine");
        let engine_result = self.engine.stop().await;
        if let Err(e) = &engine_result {
            tracing::error!(error = %e, "failed to stop match engine");
        }

        // Engine workers have drained; let the logger flush and exit
        let _ = self.shutdown_tx.send(());
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }

        self.running = false;
        tracing::info!("srcstat-daemon shut down");
        listener_result?;
        engine_result?;
        Ok(())
    }

    /// Get the current aggregated health status.
    pub async fn health(&self) -> DaemonHealth {
        let modules = vec![
            ModuleHealth::new(MODULE_LISTENER, self.listener.health_check().await),
            ModuleHealth::new(MODULE_MATCH_ENGINE, self.engine.health_check().await),
        ];
        let uptime_secs = self.start_time.elapsed().as_secs();

        DaemonHealth {
            status: aggregate_status(&modules),
            uptime_secs,
            modules,
        }
    }

    /// UDP address the listener is bound to, once started.
    pub fn listener_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr()
    }

    /// Listener packet counters.
    pub fn listener_stats(&self) -> ListenerStatsSnapshot {
        self.listener.stats()
    }

    /// Events the match engine has received from the listener.
    pub fn events_received(&self) -> u64 {
        self.engine.events_received()
    }

    pub fn config(&self) -> &SrcstatConfig {
        &self.config
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Spawn a background task that logs every completed match as a JSON summary.
///
/// On shutdown the channel is drained before the task exits.
pub fn spawn_match_logger(
    mut completed_rx: mpsc::Receiver<CompletedMatch>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                next = completed_rx.recv() => {
                    match next {
                        Some(done) => log_completed(&done),
                        None => {
                            tracing::debug!("completed match channel closed, exiting logger");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    while let Ok(done) = completed_rx.try_recv() {
                        log_completed(&done);
                    }
                    tracing::debug!("match logger shutting down");
                    break;
                }
            }
        }
    })
}

fn log_completed(done: &CompletedMatch) {
    match serde_json::to_string(&done.summary) {
        Ok(summary) => tracing::info!(
            server_id = done.summary.server_id,
            match_id = %done.summary.match_id,
            summary = %summary,
            "match summary"
        ),
        Err(e) => tracing::error!(
            match_id = %done.summary.match_id,
            error = %e,
            "failed to serialize match summary"
        ),
    }
}

/// Spawn a background task that periodically updates the uptime metric.
///
/// Updates every 10 seconds to keep the metric fresh for Prometheus scrapes.
fn spawn_uptime_updater(
    start_time: Instant,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    use srcstat_core::metrics as m;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(10));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let uptime_secs = start_time.elapsed().as_secs();
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(uptime_secs as f64);
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("uptime updater shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn match_logger_exits_on_shutdown_signal() {
        let (_tx, rx) = mpsc::channel::<CompletedMatch>(4);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task = spawn_match_logger(rx, shutdown_rx);
        let _ = shutdown_tx.send(());

        let result = tokio::time::timeout(tokio::time::Duration::from_millis(200), task).await;
        assert!(result.is_ok(), "match logger should shut down within timeout");
    }

    #[tokio::test]
    async fn match_logger_exits_when_channel_closes() {
        let (tx, rx) = mpsc::channel::<CompletedMatch>(4);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task = spawn_match_logger(rx, shutdown_rx);
        drop(tx);

        let result = tokio::time::timeout(tokio::time::Duration::from_millis(200), task).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn uptime_updater_stops_on_shutdown() {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = spawn_uptime_updater(Instant::now(), shutdown_rx);
        let _ = shutdown_tx.send(());
        let result = tokio::time::timeout(tokio::time::Duration::from_millis(200), task).await;
        assert!(result.is_ok());
    }
}
