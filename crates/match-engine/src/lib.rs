#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`state`]: 매치 상태 머신과 이벤트 적용 규칙
//! - [`sums`]: 플레이어/메딕/팀/라운드 누적 구조체
//! - [`summary`]: 직렬화용 매치 요약
//! - [`worker`]: 서버별 매치 소유 태스크
//! - [`router`]: 서버 ID 기준 워커 라우팅
//! - [`engine`]: 생명주기 (Pipeline trait 구현)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! ServerEvent -> MatchEngine -> MatchRouter -> MatchWorker(server_id) -> Match::apply
//!                                                    |
//!                                            CompletedMatch -> downstream
//! ```

pub mod engine;
pub mod error;
pub mod router;
pub mod state;
pub mod summary;
pub mod sums;
pub mod worker;

// Engine
pub use engine::{MatchEngine, MatchEngineBuilder};

// Error
pub use error::{MatchEngineError, MatchError};

// Match
pub use state::{Match, MatchState};
pub use summary::{MatchSummary, MedicSummary, PlayerSummary};
pub use sums::{ChatMessage, ClassSums, MedicSum, PlayerSum, PointCapture, RoundSum, TeamPair, TeamSum, WeaponSum};

// Workers
pub use router::MatchRouter;
pub use worker::{CompletedMatch, MatchWorker};
