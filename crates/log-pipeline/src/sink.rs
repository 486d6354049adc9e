//! 이벤트 싱크 -- 파싱된 이벤트를 받는 콜백 인터페이스
//!
//! 디스패치 태스크는 라인마다 [`EventSink::on_event`]를 호출합니다.
//! 구현은 블록되면 안 됩니다. 느린 소비자는 채널 싱크로 자체 버퍼를 두어야 합니다.

use tokio::sync::{broadcast, mpsc};

use srcstat_core::metrics as m;

use crate::event::{EventType, ServerEvent};

/// 파싱된 이벤트 수신자
pub trait EventSink: Send + Sync {
    fn on_event(&self, event_type: EventType, event: ServerEvent);
}

impl<F> EventSink for F
where
    F: Fn(EventType, ServerEvent) + Send + Sync,
{
    fn on_event(&self, event_type: EventType, event: ServerEvent) {
        self(event_type, event);
    }
}

/// mpsc 채널 싱크. 채널이 가득 차면 이벤트를 버리고 카운트합니다.
impl EventSink for mpsc::Sender<ServerEvent> {
    fn on_event(&self, event_type: EventType, event: ServerEvent) {
        match self.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                metrics::counter!(m::MATCH_EVENTS_DROPPED_TOTAL).increment(1);
                tracing::warn!(
                    server_id = event.server_id(),
                    event_type = %event_type,
                    "event channel full, dropping event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(event_type = %event_type, "event channel closed");
            }
        }
    }
}

/// broadcast 싱크. 구독자가 없으면 조용히 버립니다.
impl EventSink for broadcast::Sender<ServerEvent> {
    fn on_event(&self, _event_type: EventType, event: ServerEvent) {
        let _ = self.send(event);
    }
}

/// 아무 것도 하지 않는 싱크
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&self, _event_type: EventType, _event: ServerEvent) {}
}
