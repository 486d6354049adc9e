//! 리스너 생명주기 -- 수신/디스패치 태스크를 소유하고 관리합니다.
//!
//! [`LogPipeline`]은 core의 [`Pipeline`](srcstat_core::pipeline::Pipeline) trait을 구현하여
//! `srcstat-daemon`에서 다른 모듈과 같은 생명주기로 관리됩니다.
//!
//! # 내부 아키텍처
//! ```text
//! UdpSocket -> recv loop -> PacketQueue -> dispatch loop -> SecretTable -> LineParser -> EventSink
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use srcstat_core::error::{PipelineError, SrcstatError};
use srcstat_core::pipeline::{HealthStatus, Pipeline};

use crate::buffer::PacketQueue;
use crate::collector::{ListenerStats, ListenerStatsSnapshot, SrcdsListener};
use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::event::ServerEvent;
use crate::parser::LineParser;
use crate::secret::SecretTable;
use crate::sink::EventSink;

/// 큐 사용률이 이 값을 넘으면 Degraded
const DEGRADED_UTILIZATION: f64 = 0.9;
/// stop 시 태스크 종료 대기 시간
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Initialized,
    Running,
    Stopped,
}

/// srcds 로그 수신 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use srcstat_log_pipeline::{LogPipelineBuilder, SecretTable};
///
/// let (mut pipeline, event_rx) = LogPipelineBuilder::new()
///     .config(config)
///     .secrets(SecretTable::from_entries(&servers))
///     .build()?;
///
/// pipeline.start().await?;
/// ```
pub struct LogPipeline {
    config: PipelineConfig,
    state: PipelineState,
    parser: Arc<LineParser>,
    secrets: SecretTable,
    sink: Arc<dyn EventSink>,
    stats: Arc<ListenerStats>,
    queue: Option<Arc<PacketQueue>>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl LogPipeline {
    pub fn state_name(&self) -> &str {
        match self.state {
            PipelineState::Initialized => "initialized",
            PipelineState::Running => "running",
            PipelineState::Stopped => "stopped",
        }
    }

    /// 런타임에 서버를 추가/제거할 수 있는 시크릿 테이블 핸들
    pub fn secrets(&self) -> &SecretTable {
        &self.secrets
    }

    pub fn stats(&self) -> ListenerStatsSnapshot {
        self.stats.snapshot()
    }

    /// 실행 중일 때 실제로 바인드된 주소
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 큐 사용률. 실행 중이 아니면 0.
    pub async fn queue_utilization(&self) -> f64 {
        match &self.queue {
            Some(queue) => queue.utilization().await,
            None => 0.0,
        }
    }
}

impl Pipeline for LogPipeline {
    async fn start(&mut self) -> Result<(), SrcstatError> {
        if self.state == PipelineState::Running {
            return Err(PipelineError::AlreadyRunning.into());
        }

        tracing::info!(bind_addr = %self.config.bind_addr, "starting log pipeline");

        let queue = Arc::new(PacketQueue::new(
            self.config.queue_capacity,
            self.config.drop_policy,
        ));
        let listener = SrcdsListener::bind(
            &self.config,
            Arc::clone(&queue),
            self.secrets.clone(),
            Arc::clone(&self.parser),
            Arc::clone(&self.sink),
            Arc::clone(&self.stats),
        )
        .await?;
        let local_addr = listener.local_addr()?;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(listener.run(cancel.clone()));

        self.queue = Some(queue);
        self.cancel = Some(cancel);
        self.task = Some(task);
        self.local_addr = Some(local_addr);
        self.state = PipelineState::Running;

        tracing::info!(addr = %local_addr, "log pipeline started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), SrcstatError> {
        if self.state != PipelineState::Running {
            return Err(PipelineError::NotRunning.into());
        }

        tracing::info!("stopping log pipeline");

        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(STOP_TIMEOUT, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "listener task failed"),
                Err(_) => {
                    tracing::warn!("listener task did not stop in time, aborting");
                    task.abort();
                }
            }
        }

        self.queue = None;
        self.local_addr = None;
        self.state = PipelineState::Stopped;

        let stats = self.stats.snapshot();
        tracing::info!(
            received = stats.received,
            dispatched = stats.dispatched,
            dropped = stats.dropped,
            "log pipeline stopped"
        );
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            PipelineState::Running => {
                if self.task.as_ref().is_some_and(JoinHandle::is_finished) {
                    return HealthStatus::Unhealthy("listener task exited".to_owned());
                }
                let utilization = self.queue_utilization().await;
                if utilization > DEGRADED_UTILIZATION {
                    HealthStatus::Degraded(format!(
                        "queue utilization high: {:.1}%",
                        utilization * 100.0
                    ))
                } else {
                    HealthStatus::Healthy
                }
            }
            PipelineState::Initialized => HealthStatus::Unhealthy("not started".to_owned()),
            PipelineState::Stopped => HealthStatus::Unhealthy("stopped".to_owned()),
        }
    }
}

/// 로그 파이프라인 빌더
pub struct LogPipelineBuilder {
    config: PipelineConfig,
    secrets: SecretTable,
    sink: Option<Arc<dyn EventSink>>,
    event_channel_capacity: usize,
}

impl LogPipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            secrets: SecretTable::new(),
            sink: None,
            event_channel_capacity: 1024,
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn secrets(mut self, secrets: SecretTable) -> Self {
        self.secrets = secrets;
        self
    }

    /// 외부 싱크를 설정합니다. 설정하지 않으면 빌더가 mpsc 채널을 만듭니다.
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 내부 이벤트 채널 용량 (외부 싱크 미사용 시)
    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// 파이프라인을 빌드합니다.
    ///
    /// 외부 싱크를 설정했다면 수신 채널은 `None`입니다.
    pub fn build(
        self,
    ) -> Result<(LogPipeline, Option<mpsc::Receiver<ServerEvent>>), LogPipelineError> {
        self.config.validate()?;

        let (sink, event_rx) = match self.sink {
            Some(sink) => (sink, None),
            None => {
                let (tx, rx) = mpsc::channel(self.event_channel_capacity.max(1));
                (Arc::new(tx) as Arc<dyn EventSink>, Some(rx))
            }
        };

        let pipeline = LogPipeline {
            config: self.config,
            state: PipelineState::Initialized,
            parser: Arc::new(LineParser::new()?),
            secrets: self.secrets,
            sink,
            stats: Arc::new(ListenerStats::default()),
            queue: None,
            cancel: None,
            task: None,
            local_addr: None,
        };

        Ok((pipeline, event_rx))
    }
}

impl Default for LogPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
