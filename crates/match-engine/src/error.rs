//! 매치 엔진 에러 타입

use srcstat_core::error::{PipelineError, SrcstatError};
use srcstat_log_pipeline::EventType;

/// 이벤트 적용 에러
///
/// 모두 이벤트 하나에 국한됩니다. 호출자는 기록 후 다음 이벤트를 계속 처리합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// 선언된 종류와 페이로드 변형이 다름
    #[error("event type mismatch: declared {declared}, payload is {actual}")]
    InvalidType {
        declared: EventType,
        actual: EventType,
    },

    /// 매치 집계와 무관한 이벤트
    #[error("ignored event: {0}")]
    Ignored(EventType),

    /// 파서가 분류하지 못한 라인
    #[error("unhandled event: {0}")]
    Unhandled(EventType),
}

impl MatchError {
    /// 운영상 의미 있는 에러인지 (무시/미분류는 정상 흐름)
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidType { .. })
    }
}

/// 매치 엔진 생명주기 에러
#[derive(Debug, thiserror::Error)]
pub enum MatchEngineError {
    /// 설정 오류
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },

    /// 이벤트 입력 채널이 이미 사용됨
    #[error("event receiver already taken")]
    ReceiverTaken,
}

impl From<MatchEngineError> for SrcstatError {
    fn from(err: MatchEngineError) -> Self {
        match err {
            MatchEngineError::Config { field, reason } => {
                srcstat_core::error::ConfigError::InvalidValue { field, reason }.into()
            }
            MatchEngineError::ReceiverTaken => {
                PipelineError::InitFailed("match engine event receiver already taken".to_owned())
                    .into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_both_types() {
        let err = MatchError::InvalidType {
            declared: EventType::Killed,
            actual: EventType::Damage,
        };
        let msg = err.to_string();
        assert!(msg.contains("Killed"));
        assert!(msg.contains("Damage"));
        assert!(err.is_contract_violation());
        assert!(!MatchError::Ignored(EventType::Cvar).is_contract_violation());
    }

    #[test]
    fn engine_error_converts_into_top_level() {
        let err: SrcstatError = MatchEngineError::Config {
            field: "match.use_real_dmg".to_owned(),
            reason: "must be set".to_owned(),
        }
        .into();
        assert!(matches!(err, SrcstatError::Config(_)));

        let err: SrcstatError = MatchEngineError::ReceiverTaken.into();
        assert!(matches!(err, SrcstatError::Pipeline(_)));
    }
}
