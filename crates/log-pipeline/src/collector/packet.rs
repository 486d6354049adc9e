//! srcds 로그 패킷 디코더
//!
//! ```text
//! FF FF FF FF | 0x53 | <secret ASCII> | L MM/DD/YYYY - HH:MM:SS: ... | \n \0
//! ```
//!
//! `0x52`(시크릿 없는 레거시 형식)는 인증할 수 없으므로 거부합니다.

use crate::error::PacketError;

/// 모든 out-of-band 패킷 공통 헤더
pub const PACKET_HEADER: [u8; 4] = [0xFF; 4];
/// 시크릿이 포함된 로그 패킷
pub const SECURE_LOG_PACKET: u8 = 0x53;
/// 레거시 로그 패킷
pub const LEGACY_LOG_PACKET: u8 = 0x52;

const LINE_MARKER: &[u8] = b"L ";
/// 라인 끝 종결 바이트 수
const TRAILER_LEN: usize = 2;

/// 디코딩된 패킷 (원본 버퍼를 빌림)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPacket<'a> {
    pub secret: i64,
    /// `L `로 시작하는 라인 (종결 바이트 제외)
    pub line: &'a [u8],
}

/// 데이터그램 하나를 검증하고 시크릿과 라인을 분리합니다.
///
/// 실패는 모두 [`PacketError`]이며 호출자는 카운트 후 버립니다.
pub fn decode_packet(datagram: &[u8]) -> Result<DecodedPacket<'_>, PacketError> {
    if datagram.len() < PACKET_HEADER.len() + 1 {
        return Err(PacketError::TooShort {
            len: datagram.len(),
        });
    }
    if datagram[..PACKET_HEADER.len()] != PACKET_HEADER {
        return Err(PacketError::BadHeader);
    }

    match datagram[PACKET_HEADER.len()] {
        SECURE_LOG_PACKET => {}
        LEGACY_LOG_PACKET => return Err(PacketError::LegacyPacket),
        other => return Err(PacketError::UnknownPacketType(other)),
    }

    let body = &datagram[PACKET_HEADER.len() + 1..];
    let marker = body
        .windows(LINE_MARKER.len())
        .position(|w| w == LINE_MARKER)
        .ok_or(PacketError::MissingMarker)?;

    let raw_secret = &body[..marker];
    let secret = std::str::from_utf8(raw_secret)
        .ok()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| PacketError::MalformedSecret {
            value: String::from_utf8_lossy(raw_secret).into_owned(),
        })?;

    let end = body.len().saturating_sub(TRAILER_LEN).max(marker);
    Ok(DecodedPacket {
        secret,
        line: &body[marker..end],
    })
}

/// 테스트와 벤치마크용 패킷 생성기
pub fn encode_packet(secret: i64, line: &str) -> Vec<u8> {
    let mut packet = Vec::with_capacity(line.len() + 32);
    packet.extend_from_slice(&PACKET_HEADER);
    packet.push(SECURE_LOG_PACKET);
    packet.extend_from_slice(secret.to_string().as_bytes());
    packet.extend_from_slice(line.as_bytes());
    packet.extend_from_slice(b"\n\0");
    packet
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = r#"L 02/21/2021 - 06:22:24: rcon from "23.239.22.163:42004": command "status""#;

    #[test]
    fn decodes_secure_packet() {
        let packet = encode_packet(1_234_567, LINE);
        let decoded = decode_packet(&packet).unwrap();
        assert_eq!(decoded.secret, 1_234_567);
        assert_eq!(decoded.line, LINE.as_bytes());
    }

    #[test]
    fn rejects_legacy_packet() {
        let mut packet = encode_packet(1, LINE);
        packet[4] = LEGACY_LOG_PACKET;
        assert_eq!(decode_packet(&packet), Err(PacketError::LegacyPacket));
    }

    #[test]
    fn rejects_bad_header_and_short_input() {
        assert_eq!(
            decode_packet(b"\xff\xff"),
            Err(PacketError::TooShort { len: 2 })
        );
        assert_eq!(
            decode_packet(b"\xff\xff\xff\xfeS123L x\n\0"),
            Err(PacketError::BadHeader)
        );
        assert_eq!(
            decode_packet(b"\xff\xff\xff\xff\x01123L x\n\0"),
            Err(PacketError::UnknownPacketType(0x01))
        );
    }

    #[test]
    fn rejects_missing_marker_and_bad_secret() {
        assert_eq!(
            decode_packet(b"\xff\xff\xff\xffS12345"),
            Err(PacketError::MissingMarker)
        );
        assert!(matches!(
            decode_packet(b"\xff\xff\xff\xffS12a45L line\n\0"),
            Err(PacketError::MalformedSecret { .. })
        ));
        assert!(matches!(
            decode_packet(b"\xff\xff\xff\xffSL line\n\0"),
            Err(PacketError::MalformedSecret { .. })
        ));
    }

    #[test]
    fn truncated_trailer_never_panics() {
        let decoded = decode_packet(b"\xff\xff\xff\xffS9L ").unwrap();
        assert_eq!(decoded.secret, 9);
        assert_eq!(decoded.line, b"");
    }
}
