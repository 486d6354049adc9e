//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않았다면 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `srcstat_`
//! - 모듈명: `listener_`, `match_`, `daemon_`
//! - 접미어: `_total` (counter), `_seconds`, 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! metrics::counter!(srcstat_core::metrics::LISTENER_PACKETS_RECEIVED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 거부 사유 레이블 키 (legacy, header, secret, unknown_secret)
pub const LABEL_REASON: &str = "reason";

/// 이벤트 종류 레이블 키
pub const LABEL_EVENT_TYPE: &str = "event_type";

// ─── UDP Listener 메트릭 ───────────────────────────────────────────

/// 수신한 전체 데이터그램 수 (counter)
pub const LISTENER_PACKETS_RECEIVED_TOTAL: &str = "srcstat_listener_packets_received_total";

/// 큐 오버플로로 버려진 패킷 수 (counter)
pub const LISTENER_PACKETS_DROPPED_TOTAL: &str = "srcstat_listener_packets_dropped_total";

/// 헤더/시크릿 검증에서 거부된 패킷 수 (counter, label: reason)
pub const LISTENER_PACKETS_REJECTED_TOTAL: &str = "srcstat_listener_packets_rejected_total";

/// 이벤트로 변환된 라인 수 (counter)
pub const LISTENER_LINES_PARSED_TOTAL: &str = "srcstat_listener_lines_parsed_total";

/// 필드 파싱에 실패한 라인 수 (counter)
pub const LISTENER_PARSE_ERRORS_TOTAL: &str = "srcstat_listener_parse_errors_total";

/// 현재 큐 깊이 (gauge)
pub const LISTENER_QUEUE_DEPTH: &str = "srcstat_listener_queue_depth";

// ─── Match Engine 메트릭 ───────────────────────────────────────────

/// 매치에 적용된 이벤트 수 (counter)
pub const MATCH_EVENTS_APPLIED_TOTAL: &str = "srcstat_match_events_applied_total";

/// 적용 에러 수 (counter, label: event_type)
pub const MATCH_APPLY_ERRORS_TOTAL: &str = "srcstat_match_apply_errors_total";

/// 워커 채널이 가득 차 버려진 이벤트 수 (counter)
pub const MATCH_EVENTS_DROPPED_TOTAL: &str = "srcstat_match_events_dropped_total";

/// 활성 매치 워커 수 (gauge)
pub const MATCH_ACTIVE_MATCHES: &str = "srcstat_match_active_matches";

/// 게임 종료로 완료된 매치 수 (counter)
pub const MATCH_COMPLETED_TOTAL: &str = "srcstat_match_completed_total";

// ─── Daemon 메트릭 ─────────────────────────────────────────────────

/// 데몬 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "srcstat_daemon_uptime_seconds";

/// 설정된 서버 수 (gauge)
pub const DAEMON_CONFIGURED_SERVERS: &str = "srcstat_daemon_configured_servers";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        LISTENER_PACKETS_RECEIVED_TOTAL,
        "Total number of UDP datagrams received by the log listener"
    );
    describe_counter!(
        LISTENER_PACKETS_DROPPED_TOTAL,
        "Packets discarded because the ingest queue was full"
    );
    describe_counter!(
        LISTENER_PACKETS_REJECTED_TOTAL,
        "Packets rejected by header or secret validation, by reason"
    );
    describe_counter!(
        LISTENER_LINES_PARSED_TOTAL,
        "Log lines converted into typed events"
    );
    describe_counter!(
        LISTENER_PARSE_ERRORS_TOTAL,
        "Log lines whose fields failed to parse"
    );
    describe_gauge!(LISTENER_QUEUE_DEPTH, "Current number of packets waiting for dispatch");

    describe_counter!(
        MATCH_EVENTS_APPLIED_TOTAL,
        "Events applied to a live match"
    );
    describe_counter!(
        MATCH_APPLY_ERRORS_TOTAL,
        "Events rejected by a match, by event type"
    );
    describe_counter!(
        MATCH_EVENTS_DROPPED_TOTAL,
        "Events dropped because a match worker channel was full"
    );
    describe_gauge!(MATCH_ACTIVE_MATCHES, "Number of live match workers");
    describe_counter!(MATCH_COMPLETED_TOTAL, "Matches finished by a game over event");

    describe_gauge!(DAEMON_UPTIME_SECONDS, "Daemon uptime in seconds");
    describe_gauge!(DAEMON_CONFIGURED_SERVERS, "Number of servers in the secret table");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_follow_convention() {
        let counters = [
            LISTENER_PACKETS_RECEIVED_TOTAL,
            LISTENER_PACKETS_DROPPED_TOTAL,
            LISTENER_PACKETS_REJECTED_TOTAL,
            LISTENER_LINES_PARSED_TOTAL,
            LISTENER_PARSE_ERRORS_TOTAL,
            MATCH_EVENTS_APPLIED_TOTAL,
            MATCH_APPLY_ERRORS_TOTAL,
            MATCH_EVENTS_DROPPED_TOTAL,
            MATCH_COMPLETED_TOTAL,
        ];
        for name in counters {
            assert!(name.starts_with("srcstat_"), "{name}");
            assert!(name.ends_with("_total"), "{name}");
        }
        assert!(DAEMON_UPTIME_SECONDS.ends_with("_seconds"));
    }

    #[test]
    fn describe_all_without_recorder_is_noop() {
        describe_all();
    }
}
