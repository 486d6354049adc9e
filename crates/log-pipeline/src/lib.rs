#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`collector`]: UDP 수신 루프, 패킷 헤더 디코딩, 디스패치
//! - [`parser`]: 로그 라인 패턴 매칭 및 필드 추출
//! - [`event`]: 이벤트 종류 코드와 타입별 이벤트 페이로드
//! - [`types`], [`weapon`]: Steam ID, 팀, 병과, 무기 등 도메인 값 타입
//! - [`buffer`]: 수신/디스패치 태스크 사이의 유한 용량 패킷 큐
//! - [`secret`]: 로그 시크릿 → 서버 식별 테이블
//! - [`reject`]: 미등록 시크릿 경고 로그 쿨다운
//! - [`sink`]: 이벤트 소비자 trait
//! - [`pipeline`]: 리스너 생명주기 (Pipeline trait 구현)
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! UDP socket -> recv loop -> PacketQueue -> dispatch loop -> EventSink
//!                                 |              |
//!                           drop policy    SecretTable + LineParser
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod reject;
pub mod secret;
pub mod sink;
pub mod types;
pub mod weapon;

pub mod collector;
pub mod parser;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{LogPipeline, LogPipelineBuilder};

// 설정
pub use config::{DropPolicy, PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::{LogPipelineError, PacketError, ParseError};

// 이벤트
pub use event::{Event, EventType, ParseResult, ServerEvent, ServerIdentity, SourcePlayer};

// 파서
pub use parser::LineParser;

// 수집기
pub use collector::{RawLog, SrcdsListener};

// 서버 식별 / 싱크
pub use secret::SecretTable;
pub use sink::{EventSink, NullSink};

// 버퍼
pub use buffer::{PacketBuffer, PacketQueue};

// 도메인 값 타입
pub use types::{PlayerClass, SteamId, Team};
pub use weapon::Weapon;
