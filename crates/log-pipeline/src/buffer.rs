//! 수신 태스크와 디스패치 태스크 사이의 유계 패킷 큐
//!
//! [`PacketBuffer`]는 동기 자료구조이고, [`PacketQueue`]는 여기에 비동기 대기와
//! 종료 신호를 더한 래퍼입니다.
//!
//! # 오버플로우 정책
//! 큐가 가득 찬 경우:
//! - [`DropPolicy::Oldest`](crate::config::DropPolicy::Oldest): 가장 오래된 패킷을 버리고 새 패킷을 넣음 (기본값)
//! - [`DropPolicy::Newest`](crate::config::DropPolicy::Newest): 새 패킷을 거부
//!
//! 어느 쪽이든 드롭은 경고 로그와 `srcstat_listener_packets_dropped_total` 메트릭으로 남습니다.
//! 수신 태스크는 절대 블록되지 않습니다.

use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};

use srcstat_core::metrics as m;

use crate::collector::RawLog;
use crate::config::DropPolicy;

/// 인메모리 패킷 버퍼
pub struct PacketBuffer {
    buffer: VecDeque<RawLog>,
    capacity: usize,
    drop_policy: DropPolicy,
    /// 드롭된 패킷 수
    dropped_count: u64,
    /// 총 유입 패킷 수
    total_received: u64,
}

impl PacketBuffer {
    pub fn new(capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity.min(10_000)),
            capacity,
            drop_policy,
            dropped_count: 0,
            total_received: 0,
        }
    }

    /// 패킷을 추가합니다. 드롭이 발생하면 `true`를 반환합니다.
    pub fn push(&mut self, raw: RawLog) -> bool {
        self.total_received += 1;

        if self.buffer.len() < self.capacity {
            self.buffer.push_back(raw);
            return false;
        }

        self.dropped_count += 1;
        match self.drop_policy {
            DropPolicy::Oldest => {
                self.buffer.pop_front();
                self.buffer.push_back(raw);
                tracing::warn!(
                    dropped = self.dropped_count,
                    capacity = self.capacity,
                    "packet queue full, dropped oldest packet"
                );
            }
            DropPolicy::Newest => {
                tracing::warn!(
                    dropped = self.dropped_count,
                    capacity = self.capacity,
                    "packet queue full, rejected new packet"
                );
            }
        }
        true
    }

    /// 최대 `batch_size`개를 꺼냅니다.
    pub fn drain_batch(&mut self, batch_size: usize) -> Vec<RawLog> {
        let count = batch_size.min(self.buffer.len());
        self.buffer.drain(..count).collect()
    }

    pub fn drain_all(&mut self) -> Vec<RawLog> {
        self.buffer.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    pub fn total_received(&self) -> u64 {
        self.total_received
    }

    /// 사용률 (0.0~1.0)
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        f64::from(u32::try_from(self.buffer.len()).unwrap_or(u32::MAX))
            / f64::from(u32::try_from(self.capacity).unwrap_or(u32::MAX))
    }
}

struct QueueState {
    buffer: PacketBuffer,
    closed: bool,
}

/// 비동기 유계 큐
///
/// 생산자는 [`push`](Self::push)로 즉시 반환하고, 소비자는 [`pop_batch`](Self::pop_batch)로
/// 패킷이 들어오거나 큐가 닫힐 때까지 기다립니다.
pub struct PacketQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl PacketQueue {
    pub fn new(capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            state: Mutex::new(QueueState {
                buffer: PacketBuffer::new(capacity, drop_policy),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// 패킷을 넣습니다. 드롭이 발생하면 `true`. 닫힌 큐에는 넣지 않습니다.
    pub async fn push(&self, raw: RawLog) -> bool {
        let (dropped, depth) = {
            let mut state = self.state.lock().await;
            if state.closed {
                return true;
            }
            let dropped = state.buffer.push(raw);
            (dropped, state.buffer.len())
        };

        if dropped {
            metrics::counter!(m::LISTENER_PACKETS_DROPPED_TOTAL).increment(1);
        }
        metrics::gauge!(m::LISTENER_QUEUE_DEPTH).set(depth as f64);
        self.notify.notify_one();
        dropped
    }

    /// 최대 `batch_size`개를 꺼냅니다.
    ///
    /// 비어 있으면 기다리며, 큐가 닫히고 비었으면 빈 `Vec`을 반환합니다.
    pub async fn pop_batch(&self, batch_size: usize) -> Vec<RawLog> {
        loop {
            {
                let mut state = self.state.lock().await;
                if !state.buffer.is_empty() {
                    let batch = state.buffer.drain_batch(batch_size.max(1));
                    metrics::gauge!(m::LISTENER_QUEUE_DEPTH).set(state.buffer.len() as f64);
                    return batch;
                }
                if state.closed {
                    return Vec::new();
                }
            }
            self.notify.notified().await;
        }
    }

    /// 큐를 닫습니다. 남은 패킷은 계속 꺼낼 수 있습니다.
    pub async fn close(&self) {
        self.state.lock().await.closed = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.buffer.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.buffer.is_empty()
    }

    pub async fn dropped_count(&self) -> u64 {
        self.state.lock().await.buffer.dropped_count()
    }

    pub async fn utilization(&self) -> f64 {
        self.state.lock().await.buffer.utilization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::time::Duration;

    fn raw(n: i64) -> RawLog {
        RawLog::new(
            n,
            Bytes::from(format!("L line {n}")),
            "127.0.0.1:27015".parse().unwrap(),
        )
    }

    #[test]
    fn oldest_policy_keeps_newest_packets() {
        let mut buf = PacketBuffer::new(3, DropPolicy::Oldest);
        for i in 1..=3 {
            assert!(!buf.push(raw(i)));
        }
        assert!(buf.push(raw(4)));
        assert_eq!(buf.dropped_count(), 1);
        assert_eq!(buf.total_received(), 4);

        let secrets: Vec<i64> = buf.drain_all().iter().map(|r| r.secret).collect();
        assert_eq!(secrets, vec![2, 3, 4]);
    }

    #[test]
    fn newest_policy_rejects_incoming() {
        let mut buf = PacketBuffer::new(2, DropPolicy::Newest);
        buf.push(raw(1));
        buf.push(raw(2));
        assert!(buf.push(raw(3)));

        let secrets: Vec<i64> = buf.drain_all().iter().map(|r| r.secret).collect();
        assert_eq!(secrets, vec![1, 2]);
    }

    #[test]
    fn utilization_and_batches() {
        let mut buf = PacketBuffer::new(100, DropPolicy::Oldest);
        assert_eq!(buf.utilization(), 0.0);
        for i in 0..50 {
            buf.push(raw(i));
        }
        let util = buf.utilization();
        assert!(util > 0.49 && util < 0.51);

        assert_eq!(buf.drain_batch(20).len(), 20);
        assert_eq!(buf.drain_batch(100).len(), 30);
        assert!(buf.is_empty());
    }

    #[tokio::test]
    async fn pop_waits_for_push() {
        let queue = Arc::new(PacketQueue::new(8, DropPolicy::Oldest));
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop_batch(4).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(raw(7)).await;

        let batch = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].secret, 7);
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let queue = PacketQueue::new(8, DropPolicy::Oldest);
        queue.push(raw(1)).await;
        queue.push(raw(2)).await;
        queue.close().await;

        assert!(queue.push(raw(3)).await);
        assert_eq!(queue.pop_batch(10).await.len(), 2);
        assert!(queue.pop_batch(10).await.is_empty());
    }

    #[tokio::test]
    async fn full_queue_counts_drops() {
        let queue = PacketQueue::new(2, DropPolicy::Oldest);
        for i in 0..5 {
            queue.push(raw(i)).await;
        }
        assert_eq!(queue.len().await, 2);
        assert_eq!(queue.dropped_count().await, 3);
        assert!((queue.utilization().await - 1.0).abs() < f64::EPSILON);
    }
}
