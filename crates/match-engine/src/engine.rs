//! 매치 엔진 -- 이벤트 수신과 워커 라우팅 생명주기 관리
//!
//! [`MatchEngine`]은 core의 [`Pipeline`] trait을 구현하여 `srcstat-daemon`에서
//! 로그 파이프라인과 같은 방식으로 관리됩니다.
//!
//! # 내부 아키텍처
//! ```text
//! ServerEvent ──mpsc──> MatchEngine ── MatchRouter
//!                                         |
//!                               server_id별 MatchWorker
//!                                         |
//!                      CompletedMatch ──mpsc──> downstream
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use srcstat_core::config::MatchConfig;
use srcstat_core::error::{PipelineError, SrcstatError};
use srcstat_core::pipeline::{HealthStatus, Pipeline};
use srcstat_log_pipeline::ServerEvent;

use crate::error::MatchEngineError;
use crate::router::MatchRouter;
use crate::worker::CompletedMatch;

/// 정지 시 라우터 태스크 대기 시간
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Initialized,
    Running,
    Stopped,
}

/// 매치 엔진
///
/// # 사용 예시
/// ```ignore
/// use srcstat_match_engine::MatchEngineBuilder;
///
/// let (mut engine, completed_rx) = MatchEngineBuilder::new()
///     .config(config.match_engine.clone())
///     .event_receiver(event_rx)  // from log-pipeline
///     .build()?;
///
/// engine.start().await?;
/// ```
pub struct MatchEngine {
    use_real_dmg: bool,
    worker_capacity: usize,
    state: EngineState,
    event_rx: Option<mpsc::Receiver<ServerEvent>>,
    completed_tx: mpsc::Sender<CompletedMatch>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
    events_received: Arc<AtomicU64>,
}

impl MatchEngine {
    pub fn state_name(&self) -> &str {
        match self.state {
            EngineState::Initialized => "initialized",
            EngineState::Running => "running",
            EngineState::Stopped => "stopped",
        }
    }

    /// 수신한 이벤트 수
    pub fn events_received(&self) -> u64 {
        self.events_received.load(Ordering::Relaxed)
    }

    pub fn use_real_dmg(&self) -> bool {
        self.use_real_dmg
    }
}

impl Pipeline for MatchEngine {
    async fn start(&mut self) -> Result<(), SrcstatError> {
        if self.state == EngineState::Running {
            return Err(PipelineError::AlreadyRunning.into());
        }

        // 입력 채널은 한 번만 소비됨. 재시작하려면 빌더로 새 엔진을 만들어야 함
        let mut event_rx = self.event_rx.take().ok_or(MatchEngineError::ReceiverTaken)?;

        let cancel = CancellationToken::new();
        let mut router = MatchRouter::new(
            self.use_real_dmg,
            self.worker_capacity,
            self.completed_tx.clone(),
            cancel.clone(),
        );
        let received = Arc::clone(&self.events_received);
        let loop_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = loop_cancel.cancelled() => break,
                    next = event_rx.recv() => {
                        let Some(event) = next else {
                            info!("event channel closed, stopping match engine loop");
                            break;
                        };
                        received.fetch_add(1, Ordering::Relaxed);
                        router.route(event);
                    }
                }
            }
            router.shutdown().await;
        });

        self.cancel = Some(cancel);
        self.task = Some(task);
        self.state = EngineState::Running;
        info!(use_real_dmg = self.use_real_dmg, "match engine started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), SrcstatError> {
        if self.state != EngineState::Running {
            return Err(PipelineError::NotRunning.into());
        }

        info!("stopping match engine");
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(mut task) = self.task.take()
            && tokio::time::timeout(STOP_TIMEOUT, &mut task).await.is_err()
        {
            warn!("match engine task did not stop in time, aborting");
            task.abort();
        }

        self.state = EngineState::Stopped;
        info!(events = self.events_received(), "match engine stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            EngineState::Running => match &self.task {
                Some(task) if task.is_finished() => {
                    HealthStatus::Unhealthy("event loop exited".to_owned())
                }
                _ => HealthStatus::Healthy,
            },
            EngineState::Initialized => HealthStatus::Unhealthy("not started".to_owned()),
            EngineState::Stopped => HealthStatus::Unhealthy("stopped".to_owned()),
        }
    }
}

/// 매치 엔진 빌더
///
/// 완료 매치 출력 채널을 함께 생성합니다.
pub struct MatchEngineBuilder {
    config: MatchConfig,
    event_rx: Option<mpsc::Receiver<ServerEvent>>,
    completed_channel_capacity: usize,
}

impl MatchEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: MatchConfig::default(),
            event_rx: None,
            completed_channel_capacity: 64,
        }
    }

    pub fn config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    /// 로그 파이프라인에서 오는 이벤트 채널
    pub fn event_receiver(mut self, rx: mpsc::Receiver<ServerEvent>) -> Self {
        self.event_rx = Some(rx);
        self
    }

    pub fn completed_channel_capacity(mut self, capacity: usize) -> Self {
        self.completed_channel_capacity = capacity;
        self
    }

    /// 엔진과 완료 매치 수신 채널을 만듭니다.
    pub fn build(
        self,
    ) -> Result<(MatchEngine, mpsc::Receiver<CompletedMatch>), MatchEngineError> {
        let use_real_dmg = self.config.use_real_dmg.ok_or_else(|| MatchEngineError::Config {
            field: "match.use_real_dmg".to_owned(),
            reason: "must be set explicitly".to_owned(),
        })?;
        if self.config.worker_channel_capacity == 0 {
            return Err(MatchEngineError::Config {
                field: "match.worker_channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        if self.completed_channel_capacity == 0 {
            return Err(MatchEngineError::Config {
                field: "completed_channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        let event_rx = self.event_rx.ok_or_else(|| MatchEngineError::Config {
            field: "event_receiver".to_owned(),
            reason: "event receiver is required".to_owned(),
        })?;

        let (completed_tx, completed_rx) = mpsc::channel(self.completed_channel_capacity);
        let engine = MatchEngine {
            use_real_dmg,
            worker_capacity: self.config.worker_channel_capacity,
            state: EngineState::Initialized,
            event_rx: Some(event_rx),
            completed_tx,
            cancel: None,
            task: None,
            events_received: Arc::new(AtomicU64::new(0)),
        };
        Ok((engine, completed_rx))
    }
}

impl Default for MatchEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
