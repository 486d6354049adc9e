//! 에러 타입 -- 도메인별 에러 정의

/// srcstat 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SrcstatError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 채널 수신 실패
    #[error("channel receive failed: {0}")]
    ChannelRecv(String),

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 이미 실행 중
    #[error("pipeline is already running")]
    AlreadyRunning,

    /// 실행 중이 아님
    #[error("pipeline is not running")]
    NotRunning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_top_level() {
        let err: SrcstatError = ConfigError::InvalidValue {
            field: "listener.bind_addr".to_owned(),
            reason: "empty".to_owned(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.starts_with("config error"));
        assert!(msg.contains("listener.bind_addr"));
    }

    #[test]
    fn pipeline_state_errors_display() {
        let err: SrcstatError = PipelineError::AlreadyRunning.into();
        assert_eq!(err.to_string(), "pipeline error: pipeline is already running");
        assert!(PipelineError::NotRunning.to_string().contains("not running"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err = SrcstatError::from(io);
        assert!(matches!(err, SrcstatError::Io(_)));
    }
}
