//! 서버 ID 기준 이벤트 라우팅
//!
//! 서버마다 [`MatchWorker`] 태스크를 하나씩 지연 생성하고, 이벤트를 해당 워커의
//! 입력 채널로 보냅니다. 같은 서버의 이벤트 순서는 채널이 보존합니다.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use srcstat_core::metrics as m;
use srcstat_log_pipeline::{ParseResult, ServerEvent};

use crate::worker::{CompletedMatch, MatchWorker};

/// 워커 종료 대기 시간
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

struct WorkerHandle {
    tx: mpsc::Sender<ParseResult>,
    task: JoinHandle<()>,
}

/// 서버별 워커 라우터
pub struct MatchRouter {
    use_real_dmg: bool,
    worker_capacity: usize,
    completed_tx: mpsc::Sender<CompletedMatch>,
    cancel: CancellationToken,
    workers: HashMap<i64, WorkerHandle>,
    routed: u64,
    dropped: u64,
}

impl MatchRouter {
    pub fn new(
        use_real_dmg: bool,
        worker_capacity: usize,
        completed_tx: mpsc::Sender<CompletedMatch>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            use_real_dmg,
            worker_capacity,
            completed_tx,
            cancel,
            workers: HashMap::new(),
            routed: 0,
            dropped: 0,
        }
    }

    /// 활성 워커 수
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn routed(&self) -> u64 {
        self.routed
    }

    /// 워커 채널이 가득 차 버린 이벤트 수
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// 이벤트를 서버 워커로 보냅니다. 워커가 없으면 새로 만듭니다.
    pub fn route(&mut self, event: ServerEvent) {
        let server_id = event.server_id();
        let ServerEvent { server, result } = event;

        let handle = self.workers.entry(server_id).or_insert_with(|| {
            let (tx, rx) = mpsc::channel(self.worker_capacity);
            let worker = MatchWorker::new(server, self.use_real_dmg);
            let task = tokio::spawn(worker.run(
                rx,
                self.completed_tx.clone(),
                self.cancel.child_token(),
            ));
            info!(server_id, "match worker spawned");
            WorkerHandle { tx, task }
        });

        match handle.tx.try_send(result) {
            Ok(()) => self.routed += 1,
            Err(mpsc::error::TrySendError::Full(result)) => {
                self.dropped += 1;
                metrics::counter!(m::MATCH_EVENTS_DROPPED_TOTAL).increment(1);
                warn!(
                    server_id,
                    event_type = %result.event_type,
                    "match worker channel full, dropping event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(server_id, "match worker gone, removing");
                self.workers.remove(&server_id);
            }
        }

        metrics::gauge!(m::MATCH_ACTIVE_MATCHES).set(self.workers.len() as f64);
    }

    /// 모든 워커 입력을 닫고, 남은 이벤트를 처리할 때까지 기다립니다.
    ///
    /// 제한 시간을 넘긴 워커는 중단합니다.
    pub async fn shutdown(mut self) {
        let count = self.workers.len();
        for (server_id, WorkerHandle { tx, mut task }) in self.workers.drain() {
            drop(tx);
            if tokio::time::timeout(WORKER_DRAIN_TIMEOUT, &mut task)
                .await
                .is_err()
            {
                warn!(server_id, "match worker did not drain in time, aborting");
                task.abort();
            }
        }
        metrics::gauge!(m::MATCH_ACTIVE_MATCHES).set(0.0);
        debug!(workers = count, routed = self.routed, dropped = self.dropped, "match router shut down");
    }
}
