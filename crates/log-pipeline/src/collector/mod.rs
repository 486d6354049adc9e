//! 로그 수집 모듈 -- srcds UDP 로그 패킷 수신
//!
//! - [`packet`]: 데이터그램 헤더/시크릿 디코딩 (순수 함수)
//! - [`srcds_udp`]: 소켓 수신 태스크와 디스패치 태스크
//!
//! # 아키텍처
//! 수신 태스크는 소켓을 비우는 일만 하고 디코딩된 패킷을 [`PacketQueue`](crate::buffer::PacketQueue)에
//! 넣습니다. 디스패치 태스크가 큐에서 꺼내 시크릿 확인, 파싱, 싱크 호출을 수행합니다.

pub mod packet;
pub mod srcds_udp;

pub use packet::{DecodedPacket, decode_packet};
pub use srcds_udp::{ListenerStats, ListenerStatsSnapshot, SrcdsListener};

use std::net::SocketAddr;
use std::time::SystemTime;

use bytes::Bytes;

/// 헤더 검증을 통과한 원시 로그 라인
///
/// 수신 태스크가 생성하고 디스패치 태스크가 소비합니다.
#[derive(Debug, Clone)]
pub struct RawLog {
    /// 패킷에 실린 로그 시크릿 (아직 검증 전)
    pub secret: i64,
    /// `L `부터 시작하는 로그 라인 바이트
    pub line: Bytes,
    /// 송신 주소
    pub peer: SocketAddr,
    /// 수신 시각
    pub received_at: SystemTime,
}

impl RawLog {
    pub fn new(secret: i64, line: Bytes, peer: SocketAddr) -> Self {
        Self {
            secret,
            line,
            peer,
            received_at: SystemTime::now(),
        }
    }

    /// 라인을 문자열로 봅니다. 잘못된 UTF-8은 대체 문자로 바뀝니다.
    pub fn line_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_log_lossy_line() {
        let peer: SocketAddr = "127.0.0.1:27015".parse().unwrap();
        let raw = RawLog::new(42, Bytes::from_static(b"L 01/01/2024 - 00:00:00: \xffhi"), peer);
        assert_eq!(raw.secret, 42);
        assert!(raw.line_lossy().ends_with("\u{fffd}hi"));
    }
}
