//! 로그 토큰 도메인 타입
//!
//! SteamID, 팀, 병과, 메디건, 픽업 아이템, 크리티컬 종류, 좌표처럼
//! 로그 라인에 반복해서 등장하는 작은 값들의 타입과 문자열 파싱을 정의합니다.
//! 모든 `FromStr` 구현은 패닉하지 않으며 실패 시 [`ParseError`]를 반환합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// SteamID64 계산 기준값 (개인 계정, 공용 유니버스)
const STEAM64_BASE: u64 = 76_561_197_960_265_728;

/// 봇과 인증 대기 플레이어에게 부여하는 예약 SteamID
pub const BOT_SID: SteamId = SteamId(807);

/// SteamID64 값
///
/// `[U:1:N]`(SteamID3), `STEAM_X:Y:Z`(SteamID2), 64비트 정수 문자열을 모두 받아
/// 하나의 64비트 값으로 정규화합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteamId(u64);

impl SteamId {
    /// 64비트 값으로 SteamID를 생성합니다.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// 계정 ID(SteamID3의 N)로 SteamID를 생성합니다.
    pub const fn from_account_id(account_id: u32) -> Self {
        Self(STEAM64_BASE + account_id as u64)
    }

    /// 64비트 값을 반환합니다.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// 봇 예약값인지 확인합니다.
    pub fn is_bot(self) -> bool {
        self == BOT_SID
    }

    /// SteamID3 표기(`[U:1:N]`)를 반환합니다. 봇은 `BOT`.
    pub fn steam3(self) -> String {
        if self.is_bot() || self.0 < STEAM64_BASE {
            return "BOT".to_owned();
        }
        format!("[U:1:{}]", self.0 - STEAM64_BASE)
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SteamId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidSteamId {
            value: s.to_owned(),
        };
        let trimmed = s.trim();

        if matches!(trimmed, "BOT" | "STEAM_ID_PENDING") {
            return Ok(BOT_SID);
        }

        // [U:1:68745073]
        let steam3 = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(trimmed);
        if let Some(account) = steam3.strip_prefix("U:1:") {
            let id = account.parse::<u32>().map_err(|_| invalid())?;
            return Ok(Self::from_account_id(id));
        }

        // STEAM_0:1:22649331
        if let Some(rest) = trimmed.strip_prefix("STEAM_") {
            let mut parts = rest.split(':');
            let (Some(_universe), Some(y), Some(z), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid());
            };
            let y = y.parse::<u32>().map_err(|_| invalid())?;
            let z = z.parse::<u32>().map_err(|_| invalid())?;
            if y > 1 {
                return Err(invalid());
            }
            // Z*2+Y 는 32비트 계정 ID
            let account = z
                .checked_mul(2)
                .and_then(|v| v.checked_add(y))
                .ok_or_else(invalid)?;
            return Ok(Self::from_account_id(account));
        }

        let raw = trimmed.parse::<u64>().map_err(|_| invalid())?;
        if raw < STEAM64_BASE {
            return Err(invalid());
        }
        Ok(Self(raw))
    }
}

/// 팀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Team {
    /// 미배정
    #[default]
    Unassigned,
    /// 관전자
    Spec,
    /// 레드
    Red,
    /// 블루
    Blu,
}

impl Team {
    /// 상대 팀을 반환합니다. 레드/블루가 아니면 자기 자신.
    pub fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blu,
            Self::Blu => Self::Red,
            other => other,
        }
    }

    /// 실제 플레이 팀(레드/블루)인지 확인합니다.
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Red | Self::Blu)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unassigned => "UNASSIGNED",
            Self::Spec => "SPEC",
            Self::Red => "RED",
            Self::Blu => "BLU",
        };
        f.write_str(s)
    }
}

impl FromStr for Team {
    type Err = ParseError;

    /// 빈 문자열은 `Unassigned`로 해석합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "blue" | "blu" => Ok(Self::Blu),
            "spectator" | "spec" => Ok(Self::Spec),
            "" | "unassigned" | "unknown" => Ok(Self::Unassigned),
            _ => Err(ParseError::InvalidToken {
                field: "team",
                value: s.to_owned(),
            }),
        }
    }
}

/// 병과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerClass {
    Spectator,
    Scout,
    Soldier,
    Pyro,
    Demo,
    Heavy,
    Engineer,
    Medic,
    Sniper,
    Spy,
    /// 한 라운드에 여러 병과를 사용
    Multi,
}

impl PlayerClass {
    /// 실제 전투 병과 9종
    pub const PLAYABLE: [Self; 9] = [
        Self::Scout,
        Self::Soldier,
        Self::Pyro,
        Self::Demo,
        Self::Heavy,
        Self::Engineer,
        Self::Medic,
        Self::Sniper,
        Self::Spy,
    ];
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Spectator => "spectator",
            Self::Scout => "scout",
            Self::Soldier => "soldier",
            Self::Pyro => "pyro",
            Self::Demo => "demoman",
            Self::Heavy => "heavyweapons",
            Self::Engineer => "engineer",
            Self::Medic => "medic",
            Self::Sniper => "sniper",
            Self::Spy => "spy",
            Self::Multi => "multi",
        };
        f.write_str(s)
    }
}

impl FromStr for PlayerClass {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scout" => Ok(Self::Scout),
            "soldier" => Ok(Self::Soldier),
            "pyro" => Ok(Self::Pyro),
            "demoman" | "demo" => Ok(Self::Demo),
            "heavyweapons" | "heavy" => Ok(Self::Heavy),
            "engineer" => Ok(Self::Engineer),
            "medic" => Ok(Self::Medic),
            "sniper" => Ok(Self::Sniper),
            "spy" => Ok(Self::Spy),
            "spectator" | "spec" | "undefined" => Ok(Self::Spectator),
            "multi" => Ok(Self::Multi),
            _ => Err(ParseError::InvalidToken {
                field: "class",
                value: s.to_owned(),
            }),
        }
    }
}

/// 메디건 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Medigun {
    /// 기본 메디건 (무적 우버)
    #[default]
    Uber,
    Kritzkrieg,
    Vaccinator,
    QuickFix,
}

impl fmt::Display for Medigun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uber => "medigun",
            Self::Kritzkrieg => "kritzkrieg",
            Self::Vaccinator => "vaccinator",
            Self::QuickFix => "quickfix",
        };
        f.write_str(s)
    }
}

impl FromStr for Medigun {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medigun" | "uber" => Ok(Self::Uber),
            "kritzkrieg" => Ok(Self::Kritzkrieg),
            "vaccinator" => Ok(Self::Vaccinator),
            "quickfix" => Ok(Self::QuickFix),
            _ => Err(ParseError::InvalidToken {
                field: "medigun",
                value: s.to_owned(),
            }),
        }
    }
}

/// 픽업 아이템
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupItem {
    HpSmall,
    HpMedium,
    HpLarge,
    AmmoSmall,
    AmmoMedium,
    AmmoLarge,
}

impl PickupItem {
    /// 로그 아이템 이름을 해석합니다. 알 수 없는 아이템은 `None`.
    pub fn from_log_name(name: &str) -> Option<Self> {
        match name {
            "medkit_small" => Some(Self::HpSmall),
            "medkit_medium" => Some(Self::HpMedium),
            "medkit_large" => Some(Self::HpLarge),
            "ammopack_small" | "tf_ammo_pack" => Some(Self::AmmoSmall),
            "ammopack_medium" => Some(Self::AmmoMedium),
            "ammopack_large" => Some(Self::AmmoLarge),
            _ => None,
        }
    }

    /// 체력 회복 아이템인지 확인합니다.
    pub fn is_health(self) -> bool {
        matches!(self, Self::HpSmall | Self::HpMedium | Self::HpLarge)
    }
}

/// 크리티컬 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CritType {
    #[default]
    NonCrit,
    Mini,
    Crit,
}

impl CritType {
    /// `crit` 키 값을 해석합니다. 인식하지 못한 값은 `NonCrit`.
    pub fn from_log_value(value: &str) -> Self {
        match value {
            "crit" => Self::Crit,
            "mini" => Self::Mini,
            _ => Self::NonCrit,
        }
    }
}

/// 3차원 좌표
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FromStr for Position {
    type Err = ParseError;

    /// `"X Y Z"` 형식. 정확히 세 개의 숫자가 아니면 `InvalidPosition`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidPosition {
            value: s.to_owned(),
        };
        let mut parts = s.split_whitespace().map(str::parse::<f64>);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None)
                if x.is_finite() && y.is_finite() && z.is_finite() =>
            {
                Ok(Self { x, y, z })
            }
            _ => Err(invalid()),
        }
    }
}
