//! 로그 파이프라인 에러 타입
//!
//! - [`ParseError`]: 라인 하나의 필드 파싱 실패. 해당 라인만 버리고 스트림은 계속됩니다.
//! - [`PacketError`]: UDP 데이터그램 헤더/시크릿 검증 실패. 카운트 후 드롭합니다.
//! - [`LogPipelineError`]: 파이프라인 전체 에러. `From<LogPipelineError> for SrcstatError`가
//!   구현되어 있어 상위 레이어에서 `?`로 전파할 수 있습니다.

use srcstat_core::error::{PipelineError, SrcstatError};

/// 라인 필드 파싱 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// `MM/DD/YYYY - HH:MM:SS` 형식이 아님
    #[error("invalid date: {value:?}")]
    InvalidDate { value: String },

    /// `"X Y Z"` 형식이 아님
    #[error("invalid position: {value:?}")]
    InvalidPosition { value: String },

    /// 숫자 필드 파싱 실패
    #[error("invalid number for '{field}': {value:?}")]
    InvalidNumber { field: String, value: String },

    /// SteamID 토큰 파싱 실패
    #[error("invalid steam id: {value:?}")]
    InvalidSteamId { value: String },

    /// 팀/병과/메디건 등 열거형 토큰 파싱 실패
    #[error("invalid {field} token: {value:?}")]
    InvalidToken { field: &'static str, value: String },

    /// 필수 필드 누락
    #[error("missing field '{field}'")]
    MissingField { field: String },
}

/// UDP 패킷 검증 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    /// 헤더보다 짧은 데이터그램
    #[error("packet too short: {len} bytes")]
    TooShort { len: usize },

    /// `0xFF 0xFF 0xFF 0xFF` 헤더가 아님
    #[error("bad packet header")]
    BadHeader,

    /// 시크릿 없는 레거시 로그 패킷 (`0x52`)
    #[error("legacy unauthenticated log packet")]
    LegacyPacket,

    /// 알 수 없는 패킷 타입
    #[error("unknown packet type: 0x{0:02x}")]
    UnknownPacketType(u8),

    /// `"L "` 마커 없음
    #[error("failed to find log marker")]
    MissingMarker,

    /// 시크릿이 정수가 아님
    #[error("malformed log secret: {value:?}")]
    MalformedSecret { value: String },
}

impl PacketError {
    /// 메트릭 레이블용 짧은 사유
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TooShort { .. } | Self::BadHeader | Self::UnknownPacketType(_) => "header",
            Self::LegacyPacket => "legacy",
            Self::MissingMarker | Self::MalformedSecret { .. } => "secret",
        }
    }
}

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 라인 파싱 실패
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 패킷 검증 실패
    #[error("packet error: {0}")]
    Packet(#[from] PacketError),

    /// 소켓 바인드 실패 (시작 시에만 치명적)
    #[error("failed to bind {addr}: {reason}")]
    Bind {
        /// 바인드 주소
        addr: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogPipelineError> for SrcstatError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Io(e) => SrcstatError::Io(e),
            other => SrcstatError::Pipeline(PipelineError::InitFailed(other.to_string())),
        }
    }
}
