//! 서버별 매치 워커
//!
//! 워커 하나가 한 서버의 [`Match`]를 단독으로 소유하고, 입력 채널에서 받은 순서대로
//! 적용합니다. 게임이 끝나면 [`CompletedMatch`]를 내보내고 새 매치를 시작합니다.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use srcstat_core::metrics as m;
use srcstat_log_pipeline::{ParseResult, ServerIdentity};

use crate::state::Match;
use crate::summary::MatchSummary;

/// 게임 종료로 완료된 매치
#[derive(Debug, Clone, Serialize)]
pub struct CompletedMatch {
    pub summary: MatchSummary,
    /// 전체 집계
    pub detail: Match,
}

/// 한 서버의 매치 소유자
pub struct MatchWorker {
    server: Arc<ServerIdentity>,
    use_real_dmg: bool,
    current: Match,
    applied: u64,
    rejected: u64,
    completed: u64,
}

impl MatchWorker {
    pub fn new(server: Arc<ServerIdentity>, use_real_dmg: bool) -> Self {
        let current = Match::new(server.server_id, server.server_name.clone(), use_real_dmg);
        Self {
            server,
            use_real_dmg,
            current,
            applied: 0,
            rejected: 0,
            completed: 0,
        }
    }

    pub fn server_id(&self) -> i64 {
        self.server.server_id
    }

    /// 진행 중인 매치
    pub fn current(&self) -> &Match {
        &self.current
    }

    /// 적용에 성공한 이벤트 수
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// 계약 위반으로 거부된 이벤트 수
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// 이벤트 하나를 적용합니다. 이 이벤트로 게임이 끝났으면 완료된 매치를 반환합니다.
    pub fn handle(&mut self, result: &ParseResult) -> Option<CompletedMatch> {
        match self.current.apply(result) {
            Ok(()) => {
                self.applied += 1;
                metrics::counter!(m::MATCH_EVENTS_APPLIED_TOTAL).increment(1);
            }
            Err(e) if e.is_contract_violation() => {
                self.rejected += 1;
                metrics::counter!(
                    m::MATCH_APPLY_ERRORS_TOTAL,
                    m::LABEL_EVENT_TYPE => result.event_type.as_str()
                )
                .increment(1);
                warn!(server_id = self.server.server_id, error = %e, "event rejected");
            }
            Err(e) => {
                trace!(server_id = self.server.server_id, error = %e, "event skipped");
            }
        }

        if !self.current.is_over() {
            return None;
        }

        let fresh = Match::new(
            self.server.server_id,
            self.server.server_name.clone(),
            self.use_real_dmg,
        );
        let finished = std::mem::replace(&mut self.current, fresh);
        // 같은 맵 재시작은 맵 로드 라인 없이 이어짐
        self.current.map_name.clone_from(&finished.map_name);
        self.completed += 1;
        metrics::counter!(m::MATCH_COMPLETED_TOTAL).increment(1);

        let summary = finished.summary();
        info!(
            server_id = summary.server_id,
            match_id = %summary.match_id,
            map = %summary.map_name,
            rounds = summary.rounds,
            players = summary.players.len(),
            "match completed"
        );
        Some(CompletedMatch {
            summary,
            detail: finished,
        })
    }

    /// 입력 채널이 닫히거나 취소될 때까지 이벤트를 처리합니다.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<ParseResult>,
        completed_tx: mpsc::Sender<CompletedMatch>,
        cancel: CancellationToken,
    ) {
        debug!(server_id = self.server.server_id, "match worker started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = rx.recv() => {
                    let Some(result) = next else { break };
                    if let Some(done) = self.handle(&result)
                        && completed_tx.send(done).await.is_err()
                    {
                        debug!(server_id = self.server.server_id, "completed match receiver dropped");
                    }
                }
            }
        }

        if self.current.in_match() {
            info!(
                server_id = self.server.server_id,
                match_id = %self.current.match_id,
                rounds = self.current.rounds().len(),
                "match worker stopped with unfinished match"
            );
        }
        debug!(
            server_id = self.server.server_id,
            applied = self.applied,
            rejected = self.rejected,
            completed = self.completed,
            "match worker stopped"
        );
    }
}
