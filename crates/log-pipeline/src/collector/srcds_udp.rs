//! srcds UDP 로그 리스너
//!
//! 두 개의 루프로 구성됩니다.
//! - 수신 루프: 소켓에서 데이터그램을 읽고 헤더를 검증해 [`PacketQueue`]에 넣습니다.
//! - 디스패치 루프: 큐에서 배치로 꺼내 시크릿을 해석하고, 라인을 파싱해 싱크로 넘깁니다.
//!
//! 소켓은 수신 루프가 소유하므로 취소 토큰이 발동하면 루프 종료와 함께 닫힙니다.
//! 패킷 단위 에러(헤더, 시크릿, 파싱)는 카운트 후 버리며 루프를 멈추지 않습니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use bytes::Bytes;
use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use srcstat_core::metrics as m;

use super::RawLog;
use super::packet::decode_packet;
use crate::buffer::PacketQueue;
use crate::config::PipelineConfig;
use crate::error::{LogPipelineError, PacketError};
use crate::event::ServerEvent;
use crate::parser::LineParser;
use crate::reject::RejectionLimiter;
use crate::secret::SecretTable;
use crate::sink::EventSink;

/// 레거시 패킷 경고 로그 간격 (첫 번째와 이후 N번째마다)
const LEGACY_LOG_EVERY: u64 = 10_000;

/// 리스너 카운터
#[derive(Debug, Default)]
pub struct ListenerStats {
    received: AtomicU64,
    queued: AtomicU64,
    dropped: AtomicU64,
    legacy: AtomicU64,
    malformed: AtomicU64,
    unknown_secret: AtomicU64,
    rejections_logged: AtomicU64,
    parse_errors: AtomicU64,
    dispatched: AtomicU64,
}

/// [`ListenerStats`]의 특정 시점 값
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListenerStatsSnapshot {
    pub received: u64,
    pub queued: u64,
    pub dropped: u64,
    pub legacy: u64,
    pub malformed: u64,
    pub unknown_secret: u64,
    pub rejections_logged: u64,
    pub parse_errors: u64,
    pub dispatched: u64,
}

impl ListenerStats {
    pub fn snapshot(&self) -> ListenerStatsSnapshot {
        ListenerStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            legacy: self.legacy.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unknown_secret: self.unknown_secret.load(Ordering::Relaxed),
            rejections_logged: self.rejections_logged.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed)
    }
}

/// 바인드된 srcds 로그 리스너
pub struct SrcdsListener {
    socket: UdpSocket,
    max_packet_size: usize,
    batch_size: usize,
    queue: Arc<PacketQueue>,
    secrets: SecretTable,
    parser: Arc<LineParser>,
    sink: Arc<dyn EventSink>,
    stats: Arc<ListenerStats>,
    limiter: Mutex<RejectionLimiter>,
}

impl SrcdsListener {
    /// 소켓을 바인드합니다. 바인드 실패는 시작 시점의 유일한 치명적 에러입니다.
    pub async fn bind(
        config: &PipelineConfig,
        queue: Arc<PacketQueue>,
        secrets: SecretTable,
        parser: Arc<LineParser>,
        sink: Arc<dyn EventSink>,
        stats: Arc<ListenerStats>,
    ) -> Result<Self, LogPipelineError> {
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|e| LogPipelineError::Bind {
                addr: config.bind_addr.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            socket,
            max_packet_size: config.max_packet_size,
            batch_size: config.batch_size,
            queue,
            secrets,
            parser,
            sink,
            stats,
            limiter: Mutex::new(RejectionLimiter::new(config.reject_cooldown)),
        })
    }

    /// 실제로 바인드된 주소 (포트 0으로 바인드한 경우 확인용)
    pub fn local_addr(&self) -> Result<SocketAddr, LogPipelineError> {
        Ok(self.socket.local_addr()?)
    }

    /// 취소될 때까지 수신/디스패치 루프를 실행합니다.
    pub async fn run(self, cancel: CancellationToken) {
        let addr = self
            .socket
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_default();
        info!(addr = %addr, "srcds log listener started");

        let Self {
            socket,
            max_packet_size,
            batch_size,
            queue,
            secrets,
            parser,
            sink,
            stats,
            limiter,
        } = self;

        let dispatcher = Dispatcher {
            secrets,
            parser,
            sink,
            stats: Arc::clone(&stats),
            limiter,
        };

        tokio::join!(
            recv_loop(socket, max_packet_size, Arc::clone(&queue), stats, cancel.clone()),
            dispatcher.run(queue, batch_size, cancel),
        );

        info!(addr = %addr, "srcds log listener stopped");
    }
}

async fn recv_loop(
    socket: UdpSocket,
    max_packet_size: usize,
    queue: Arc<PacketQueue>,
    stats: Arc<ListenerStats>,
    cancel: CancellationToken,
) {
    let mut buf = vec![0u8; max_packet_size];

    loop {
        let (len, peer) = tokio::select! {
            _ = cancel.cancelled() => break,
            result = socket.recv_from(&mut buf) => match result {
                Ok(received) => received,
                Err(e) => {
                    // ICMP port unreachable 등은 일시적인 에러
                    debug!(error = %e, "udp recv error");
                    continue;
                }
            },
        };

        ListenerStats::bump(&stats.received);
        metrics::counter!(m::LISTENER_PACKETS_RECEIVED_TOTAL).increment(1);

        match decode_packet(&buf[..len]) {
            Ok(packet) => {
                let raw = RawLog::new(packet.secret, Bytes::copy_from_slice(packet.line), peer);
                if queue.push(raw).await {
                    ListenerStats::bump(&stats.dropped);
                } else {
                    ListenerStats::bump(&stats.queued);
                }
            }
            Err(PacketError::LegacyPacket) => {
                let seen = ListenerStats::bump(&stats.legacy);
                metrics::counter!(m::LISTENER_PACKETS_REJECTED_TOTAL, m::LABEL_REASON => "legacy")
                    .increment(1);
                if seen % LEGACY_LOG_EVERY == 0 {
                    warn!(
                        peer = %peer,
                        count = seen + 1,
                        "rejected legacy log packet without secret, configure sv_logsecret"
                    );
                }
            }
            Err(e) => {
                ListenerStats::bump(&stats.malformed);
                metrics::counter!(m::LISTENER_PACKETS_REJECTED_TOTAL, m::LABEL_REASON => e.reason())
                    .increment(1);
                debug!(peer = %peer, error = %e, "malformed log packet");
            }
        }
    }

    // 소켓은 여기서 drop되어 닫힘
    queue.close().await;
}

struct Dispatcher {
    secrets: SecretTable,
    parser: Arc<LineParser>,
    sink: Arc<dyn EventSink>,
    stats: Arc<ListenerStats>,
    limiter: Mutex<RejectionLimiter>,
}

impl Dispatcher {
    async fn run(&self, queue: Arc<PacketQueue>, batch_size: usize, cancel: CancellationToken) {
        loop {
            let batch = tokio::select! {
                _ = cancel.cancelled() => break,
                batch = queue.pop_batch(batch_size) => batch,
            };
            if batch.is_empty() {
                break;
            }
            for raw in batch {
                self.dispatch(raw).await;
            }
        }
    }

    async fn dispatch(&self, raw: RawLog) {
        let Some(server) = self.secrets.resolve(raw.secret).await else {
            self.reject_unknown(&raw).await;
            return;
        };

        let line = raw.line_lossy();
        match self.parser.parse(&line) {
            Ok(result) => {
                ListenerStats::bump(&self.stats.dispatched);
                metrics::counter!(m::LISTENER_LINES_PARSED_TOTAL).increment(1);
                let event_type = result.event_type;
                self.sink
                    .on_event(event_type, ServerEvent { server, result });
            }
            Err(e) => {
                ListenerStats::bump(&self.stats.parse_errors);
                metrics::counter!(m::LISTENER_PARSE_ERRORS_TOTAL).increment(1);
                debug!(
                    server_id = server.server_id,
                    error = %e,
                    line = %line,
                    "failed to parse log line"
                );
            }
        }
    }

    async fn reject_unknown(&self, raw: &RawLog) {
        ListenerStats::bump(&self.stats.unknown_secret);
        metrics::counter!(m::LISTENER_PACKETS_REJECTED_TOTAL, m::LABEL_REASON => "unknown_secret")
            .increment(1);

        let should_log = self
            .limiter
            .lock()
            .await
            .should_log(raw.secret, Instant::now());
        if should_log {
            ListenerStats::bump(&self.stats.rejections_logged);
            warn!(
                secret = raw.secret,
                peer = %raw.peer,
                "rejected log packet with unknown secret"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::packet::encode_packet;
    use crate::config::{DropPolicy, PipelineConfigBuilder};
    use crate::event::EventType;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const LINE: &str = r#"L 02/21/2021 - 06:23:11: World triggered "Round_Start""#;

    async fn start(
        secrets: SecretTable,
    ) -> (
        SocketAddr,
        Arc<ListenerStats>,
        mpsc::Receiver<ServerEvent>,
        CancellationToken,
        tokio::task::JoinHandle<()>,
    ) {
        let config = PipelineConfigBuilder::new()
            .bind_addr("127.0.0.1:0".parse().unwrap())
            .build()
            .unwrap();
        let (tx, rx) = mpsc::channel(64);
        let stats = Arc::new(ListenerStats::default());
        let listener = SrcdsListener::bind(
            &config,
            Arc::new(PacketQueue::new(config.queue_capacity, DropPolicy::Oldest)),
            secrets,
            Arc::new(LineParser::new().unwrap()),
            Arc::new(tx),
            Arc::clone(&stats),
        )
        .await
        .unwrap();
        let addr = listener.local_addr().unwrap();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(listener.run(cancel.clone()));
        (addr, stats, rx, cancel, handle)
    }

    #[tokio::test]
    async fn known_secret_is_dispatched() {
        let secrets = SecretTable::new();
        secrets
            .insert(
                77,
                crate::event::ServerIdentity {
                    server_id: 3,
                    server_name: "pug".to_owned(),
                },
            )
            .await;
        let (addr, stats, mut rx, cancel, handle) = start(secrets).await;

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&encode_packet(77, LINE), addr).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.server_id(), 3);
        assert_eq!(event.event_type(), EventType::WRoundStart);
        assert_eq!(stats.snapshot().dispatched, 1);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn bad_packets_are_counted() {
        let (addr, stats, _rx, cancel, handle) = start(SecretTable::new()).await;

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut legacy = encode_packet(1, LINE);
        legacy[4] = 0x52;
        client.send_to(&legacy, addr).await.unwrap();
        client.send_to(b"garbage", addr).await.unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while stats.snapshot().received < 2 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.legacy, 1);
        assert_eq!(snapshot.malformed, 1);
        assert_eq!(snapshot.queued, 0);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn bind_conflict_is_fatal() {
        let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = PipelineConfigBuilder::new()
            .bind_addr(taken.local_addr().unwrap())
            .build()
            .unwrap();
        let result = SrcdsListener::bind(
            &config,
            Arc::new(PacketQueue::new(4, DropPolicy::Oldest)),
            SecretTable::new(),
            Arc::new(LineParser::new().unwrap()),
            Arc::new(crate::sink::NullSink),
            Arc::new(ListenerStats::default()),
        )
        .await;
        assert!(matches!(result, Err(LogPipelineError::Bind { .. })));
    }
}
