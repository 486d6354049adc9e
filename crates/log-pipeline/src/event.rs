//! 이벤트 분류 체계
//!
//! [`EventType`]은 파서가 만들어내는 모든 이벤트 종류의 닫힌 열거형이며,
//! [`Event`]의 각 변형은 정확히 하나의 `EventType`에 대응합니다.
//! 라인 파서의 결과는 [`ParseResult`] (선언된 종류 + 페이로드)이고,
//! 리스너는 여기에 서버 식별 정보를 붙여 [`ServerEvent`]로 전달합니다.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{CritType, Medigun, PickupItem, PlayerClass, Position, SteamId, Team};
use crate::weapon::Weapon;

macro_rules! event_types {
    ($($variant:ident = $code:literal),+ $(,)?) => {
        /// 이벤트 종류 (안정적인 숫자 코드 포함)
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub enum EventType {
            $($variant,)+
        }

        impl EventType {
            /// 모든 이벤트 종류
            pub const ALL: &'static [EventType] = &[$(EventType::$variant,)+];

            /// 숫자 코드를 반환합니다.
            pub fn code(self) -> u16 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// 숫자 코드에서 이벤트 종류를 찾습니다.
            pub fn from_code(code: u16) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// 이름 문자열
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

event_types! {
    IgnoredMsg = 0,
    UnknownMsg = 1,

    Say = 10,
    SayTeam = 11,
    Killed = 12,
    KillAssist = 13,
    Suicide = 14,
    ShotFired = 15,
    ShotHit = 16,
    Damage = 17,
    Domination = 18,
    Revenge = 19,
    Pickup = 20,
    EmptyUber = 21,
    MedicDeath = 22,
    MedicDeathEx = 23,
    LostUberAdv = 24,
    ChargeReady = 25,
    ChargeDeployed = 26,
    ChargeEnded = 27,
    Healed = 28,
    Extinguished = 29,
    BuiltObject = 30,
    CarryObject = 31,
    KilledObject = 32,
    DetonatedObject = 33,
    DropObject = 34,
    FirstHealAfterSpawn = 35,
    CaptureBlocked = 36,
    PointCaptured = 48,
    JoinedTeam = 49,
    ChangeClass = 50,
    SpawnedAs = 51,
    JarateAttack = 52,
    MilkAttack = 53,
    GasAttack = 54,
    KilledCustom = 55,

    WRoundOvertime = 100,
    WRoundStart = 101,
    WRoundWin = 102,
    WRoundLen = 103,
    WTeamScore = 104,
    WTeamFinalScore = 105,
    WGameOver = 106,
    WPaused = 107,
    WResumed = 108,
    WMiniRoundWin = 110,
    WMiniRoundLen = 111,
    WMiniRoundSelected = 112,
    WMiniRoundStart = 113,
    WRoundSetupBegin = 114,
    WIntermissionWinLimit = 115,

    LogStart = 1000,
    LogStop = 1001,
    Cvar = 1002,
    Rcon = 1003,
    Connected = 1004,
    Disconnected = 1005,
    Validated = 1006,
    Entered = 1007,
    MapLoad = 1008,
    ServerConfigExec = 1009,
    SteamAuth = 1010,
    MapStarted = 1011,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 행위자 플레이어 (`Name<Index><SteamID><Team>`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePlayer {
    /// 닉네임
    pub name: String,
    /// 서버 내 플레이어 인덱스
    pub pid: u32,
    /// SteamID (봇은 예약값)
    pub sid: SteamId,
    /// 팀
    pub team: Team,
    /// 봇 여부
    pub bot: bool,
}

/// 대상 플레이어 -- 형식은 행위자와 같습니다.
pub type TargetPlayer = SourcePlayer;

// ─── 페이로드 ──────────────────────────────────────────────────────

/// 패턴에 매칭되지 않았지만 로그 접두어는 유효한 라인
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IgnoredMsgEvt {
    pub created_on: DateTime<Utc>,
    pub message: String,
}

/// 로그 접두어조차 없는 라인. 타임스탬프를 알 수 없습니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownMsgEvt {
    pub message: String,
}

/// 시각 외에 데이터가 없는 월드/서버 이벤트
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldEvt {
    pub created_on: DateTime<Utc>,
}

/// 행위자만 있는 이벤트 (validated, entered, chargeready, empty_uber)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogStartEvt {
    pub created_on: DateTime<Utc>,
    pub file: String,
    pub game: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvarEvt {
    pub created_on: DateTime<Utc>,
    pub cvar: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RconEvt {
    pub created_on: DateTime<Utc>,
    pub ip: String,
    pub cmd: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectedEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub address: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisconnectedEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SayEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedTeamEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub new_team: Team,
}

/// `spawned as` / `changed role to`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub class: PlayerClass,
}

/// `shot_fired` / `shot_hit`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub weapon: Weapon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    /// 구형 로그 형식에는 대상이 없습니다.
    pub target: Option<TargetPlayer>,
    pub damage: i64,
    /// `realdamage`가 없으면 `damage`와 같습니다.
    pub real_damage: i64,
    pub weapon: Weapon,
    /// 흡혈 무기 등으로 회복한 양
    pub healing: i64,
    pub crit: CritType,
    pub airshot: bool,
    pub headshot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KilledEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub target: TargetPlayer,
    pub weapon: Weapon,
    pub attacker_position: Position,
    pub victim_position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KilledCustomEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub target: TargetPlayer,
    pub weapon: Weapon,
    /// `backstab`, `headshot`, `feign_death` 등
    pub custom_kill: String,
    pub attacker_position: Position,
    pub victim_position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillAssistEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub target: TargetPlayer,
    pub assister_position: Position,
    pub attacker_position: Position,
    pub victim_position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuicideEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub weapon: Weapon,
    pub attacker_position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealedEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub target: TargetPlayer,
    pub healing: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    /// 로그에 기록된 아이템 이름 그대로
    pub item_name: String,
    /// 알려진 체력/탄약 아이템이면 `Some`
    pub item: Option<PickupItem>,
    pub healing: i64,
}

/// `domination` / `revenge`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominationEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub target: TargetPlayer,
    pub assist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeDeployedEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub medigun: Medigun,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeEndedEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    /// 초
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LostUberAdvEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    /// 잃은 우버 우위 시간 (초)
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicDeathEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    /// 사망한 메딕
    pub target: TargetPlayer,
    pub healing: i64,
    /// 사망 시 우버 충전 완료 상태였는지 (드롭)
    pub had_uber: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicDeathExEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub uber_pct: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtinguishedEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub target: TargetPlayer,
    pub weapon: Weapon,
    pub attacker_position: Position,
    pub victim_position: Position,
}

/// 건물 설치/운반/내려놓기/자폭
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub object: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KilledObjectEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    /// 건물 주인 (`objectowner`)
    pub target: Option<TargetPlayer>,
    pub object: String,
    pub weapon: Weapon,
    pub attacker_position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstHealAfterSpawnEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    /// 스폰 후 첫 치유까지 걸린 시간 (초)
    pub time: f64,
}

/// 점령에 참여한 플레이어 한 명
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturePlayer {
    pub player: SourcePlayer,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointCapturedEvt {
    pub created_on: DateTime<Utc>,
    pub team: Team,
    pub cp: i32,
    pub cp_name: String,
    pub num_cappers: i32,
    /// 최대 5명
    pub players: Vec<CapturePlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureBlockedEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub cp: i32,
    pub cp_name: String,
    pub position: Position,
}

/// jarate / milk / gas 공격
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrowableAttackEvt {
    pub created_on: DateTime<Utc>,
    pub source: SourcePlayer,
    pub target: TargetPlayer,
    pub weapon: Weapon,
    pub attacker_position: Position,
    pub victim_position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundWinEvt {
    pub created_on: DateTime<Utc>,
    pub winner: Team,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiniRoundWinEvt {
    pub created_on: DateTime<Utc>,
    pub winner: Team,
    pub round: String,
}

/// `Round_Length` / `Mini_Round_Length`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundLenEvt {
    pub created_on: DateTime<Utc>,
    /// 초
    pub seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiniRoundSelectedEvt {
    pub created_on: DateTime<Utc>,
    pub round: String,
}

/// `current score` / `final score`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScoreEvt {
    pub created_on: DateTime<Utc>,
    pub team: Team,
    pub score: i32,
    pub players: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameOverEvt {
    pub created_on: DateTime<Utc>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntermissionWinLimitEvt {
    pub created_on: DateTime<Utc>,
    pub team: Team,
}

/// `Loading map` / `Started map`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEvt {
    pub created_on: DateTime<Utc>,
    pub map: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfigExecEvt {
    pub created_on: DateTime<Utc>,
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteamAuthEvt {
    pub created_on: DateTime<Utc>,
    pub reason: String,
}

// ─── Event ─────────────────────────────────────────────────────────

/// 이벤트 페이로드. 변형 이름은 대응하는 [`EventType`]과 같습니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    IgnoredMsg(IgnoredMsgEvt),
    UnknownMsg(UnknownMsgEvt),

    Say(SayEvt),
    SayTeam(SayEvt),
    Killed(KilledEvt),
    KillAssist(KillAssistEvt),
    Suicide(SuicideEvt),
    ShotFired(ShotEvt),
    ShotHit(ShotEvt),
    Damage(DamageEvt),
    Domination(DominationEvt),
    Revenge(DominationEvt),
    Pickup(PickupEvt),
    EmptyUber(PlayerEvt),
    MedicDeath(MedicDeathEvt),
    MedicDeathEx(MedicDeathExEvt),
    LostUberAdv(LostUberAdvEvt),
    ChargeReady(PlayerEvt),
    ChargeDeployed(ChargeDeployedEvt),
    ChargeEnded(ChargeEndedEvt),
    Healed(HealedEvt),
    Extinguished(ExtinguishedEvt),
    BuiltObject(ObjectEvt),
    CarryObject(ObjectEvt),
    KilledObject(KilledObjectEvt),
    DetonatedObject(ObjectEvt),
    DropObject(ObjectEvt),
    FirstHealAfterSpawn(FirstHealAfterSpawnEvt),
    CaptureBlocked(CaptureBlockedEvt),
    PointCaptured(PointCapturedEvt),
    JoinedTeam(JoinedTeamEvt),
    ChangeClass(ClassEvt),
    SpawnedAs(ClassEvt),
    JarateAttack(ThrowableAttackEvt),
    MilkAttack(ThrowableAttackEvt),
    GasAttack(ThrowableAttackEvt),
    KilledCustom(KilledCustomEvt),

    WRoundOvertime(WorldEvt),
    WRoundStart(WorldEvt),
    WRoundWin(RoundWinEvt),
    WRoundLen(RoundLenEvt),
    WTeamScore(TeamScoreEvt),
    WTeamFinalScore(TeamScoreEvt),
    WGameOver(GameOverEvt),
    WPaused(WorldEvt),
    WResumed(WorldEvt),
    WMiniRoundWin(MiniRoundWinEvt),
    WMiniRoundLen(RoundLenEvt),
    WMiniRoundSelected(MiniRoundSelectedEvt),
    WMiniRoundStart(WorldEvt),
    WRoundSetupBegin(WorldEvt),
    WIntermissionWinLimit(IntermissionWinLimitEvt),

    LogStart(LogStartEvt),
    LogStop(WorldEvt),
    Cvar(CvarEvt),
    Rcon(RconEvt),
    Connected(ConnectedEvt),
    Disconnected(DisconnectedEvt),
    Validated(PlayerEvt),
    Entered(PlayerEvt),
    MapLoad(MapEvt),
    ServerConfigExec(ServerConfigExecEvt),
    SteamAuth(SteamAuthEvt),
    MapStarted(MapEvt),
}

impl Event {
    /// 페이로드 변형이 나타내는 이벤트 종류
    pub fn event_type(&self) -> EventType {
        match self {
            Self::IgnoredMsg(_) => EventType::IgnoredMsg,
            Self::UnknownMsg(_) => EventType::UnknownMsg,
            Self::Say(_) => EventType::Say,
            Self::SayTeam(_) => EventType::SayTeam,
            Self::Killed(_) => EventType::Killed,
            Self::KillAssist(_) => EventType::KillAssist,
            Self::Suicide(_) => EventType::Suicide,
            Self::ShotFired(_) => EventType::ShotFired,
            Self::ShotHit(_) => EventType::ShotHit,
            Self::Damage(_) => EventType::Damage,
            Self::Domination(_) => EventType::Domination,
            Self::Revenge(_) => EventType::Revenge,
            Self::Pickup(_) => EventType::Pickup,
            Self::EmptyUber(_) => EventType::EmptyUber,
            Self::MedicDeath(_) => EventType::MedicDeath,
            Self::MedicDeathEx(_) => EventType::MedicDeathEx,
            Self::LostUberAdv(_) => EventType::LostUberAdv,
            Self::ChargeReady(_) => EventType::ChargeReady,
            Self::ChargeDeployed(_) => EventType::ChargeDeployed,
            Self::ChargeEnded(_) => EventType::ChargeEnded,
            Self::Healed(_) => EventType::Healed,
            Self::Extinguished(_) => EventType::Extinguished,
            Self::BuiltObject(_) => EventType::BuiltObject,
            Self::CarryObject(_) => EventType::CarryObject,
            Self::KilledObject(_) => EventType::KilledObject,
            Self::DetonatedObject(_) => EventType::DetonatedObject,
            Self::DropObject(_) => EventType::DropObject,
            Self::FirstHealAfterSpawn(_) => EventType::FirstHealAfterSpawn,
            Self::CaptureBlocked(_) => EventType::CaptureBlocked,
            Self::PointCaptured(_) => EventType::PointCaptured,
            Self::JoinedTeam(_) => EventType::JoinedTeam,
            Self::ChangeClass(_) => EventType::ChangeClass,
            Self::SpawnedAs(_) => EventType::SpawnedAs,
            Self::JarateAttack(_) => EventType::JarateAttack,
            Self::MilkAttack(_) => EventType::MilkAttack,
            Self::GasAttack(_) => EventType::GasAttack,
            Self::KilledCustom(_) => EventType::KilledCustom,
            Self::WRoundOvertime(_) => EventType::WRoundOvertime,
            Self::WRoundStart(_) => EventType::WRoundStart,
            Self::WRoundWin(_) => EventType::WRoundWin,
            Self::WRoundLen(_) => EventType::WRoundLen,
            Self::WTeamScore(_) => EventType::WTeamScore,
            Self::WTeamFinalScore(_) => EventType::WTeamFinalScore,
            Self::WGameOver(_) => EventType::WGameOver,
            Self::WPaused(_) => EventType::WPaused,
            Self::WResumed(_) => EventType::WResumed,
            Self::WMiniRoundWin(_) => EventType::WMiniRoundWin,
            Self::WMiniRoundLen(_) => EventType::WMiniRoundLen,
            Self::WMiniRoundSelected(_) => EventType::WMiniRoundSelected,
            Self::WMiniRoundStart(_) => EventType::WMiniRoundStart,
            Self::WRoundSetupBegin(_) => EventType::WRoundSetupBegin,
            Self::WIntermissionWinLimit(_) => EventType::WIntermissionWinLimit,
            Self::LogStart(_) => EventType::LogStart,
            Self::LogStop(_) => EventType::LogStop,
            Self::Cvar(_) => EventType::Cvar,
            Self::Rcon(_) => EventType::Rcon,
            Self::Connected(_) => EventType::Connected,
            Self::Disconnected(_) => EventType::Disconnected,
            Self::Validated(_) => EventType::Validated,
            Self::Entered(_) => EventType::Entered,
            Self::MapLoad(_) => EventType::MapLoad,
            Self::ServerConfigExec(_) => EventType::ServerConfigExec,
            Self::SteamAuth(_) => EventType::SteamAuth,
            Self::MapStarted(_) => EventType::MapStarted,
        }
    }

    /// 이벤트 발생 시각. `UnknownMsg`만 `None`입니다.
    pub fn created_on(&self) -> Option<DateTime<Utc>> {
        let ts = match self {
            Self::UnknownMsg(_) => return None,
            Self::IgnoredMsg(e) => e.created_on,
            Self::Say(e) | Self::SayTeam(e) => e.created_on,
            Self::Killed(e) => e.created_on,
            Self::KillAssist(e) => e.created_on,
            Self::Suicide(e) => e.created_on,
            Self::ShotFired(e) | Self::ShotHit(e) => e.created_on,
            Self::Damage(e) => e.created_on,
            Self::Domination(e) | Self::Revenge(e) => e.created_on,
            Self::Pickup(e) => e.created_on,
            Self::EmptyUber(e) | Self::ChargeReady(e) | Self::Validated(e) | Self::Entered(e) => {
                e.created_on
            }
            Self::MedicDeath(e) => e.created_on,
            Self::MedicDeathEx(e) => e.created_on,
            Self::LostUberAdv(e) => e.created_on,
            Self::ChargeDeployed(e) => e.created_on,
            Self::ChargeEnded(e) => e.created_on,
            Self::Healed(e) => e.created_on,
            Self::Extinguished(e) => e.created_on,
            Self::BuiltObject(e)
            | Self::CarryObject(e)
            | Self::DetonatedObject(e)
            | Self::DropObject(e) => e.created_on,
            Self::KilledObject(e) => e.created_on,
            Self::FirstHealAfterSpawn(e) => e.created_on,
            Self::CaptureBlocked(e) => e.created_on,
            Self::PointCaptured(e) => e.created_on,
            Self::JoinedTeam(e) => e.created_on,
            Self::ChangeClass(e) | Self::SpawnedAs(e) => e.created_on,
            Self::JarateAttack(e) | Self::MilkAttack(e) | Self::GasAttack(e) => e.created_on,
            Self::KilledCustom(e) => e.created_on,
            Self::WRoundOvertime(e)
            | Self::WRoundStart(e)
            | Self::WPaused(e)
            | Self::WResumed(e)
            | Self::WMiniRoundStart(e)
            | Self::WRoundSetupBegin(e)
            | Self::LogStop(e) => e.created_on,
            Self::WRoundWin(e) => e.created_on,
            Self::WRoundLen(e) | Self::WMiniRoundLen(e) => e.created_on,
            Self::WTeamScore(e) | Self::WTeamFinalScore(e) => e.created_on,
            Self::WGameOver(e) => e.created_on,
            Self::WMiniRoundWin(e) => e.created_on,
            Self::WMiniRoundSelected(e) => e.created_on,
            Self::WIntermissionWinLimit(e) => e.created_on,
            Self::LogStart(e) => e.created_on,
            Self::Cvar(e) => e.created_on,
            Self::Rcon(e) => e.created_on,
            Self::Connected(e) => e.created_on,
            Self::Disconnected(e) => e.created_on,
            Self::MapLoad(e) | Self::MapStarted(e) => e.created_on,
            Self::ServerConfigExec(e) => e.created_on,
            Self::SteamAuth(e) => e.created_on,
        };
        Some(ts)
    }
}

/// 라인 파서 결과: 선언된 이벤트 종류와 페이로드
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    pub event_type: EventType,
    pub event: Event,
}

impl ParseResult {
    /// 페이로드 변형에서 종류를 유도하여 결과를 만듭니다.
    pub fn new(event: Event) -> Self {
        Self {
            event_type: event.event_type(),
            event,
        }
    }

    /// 선언된 종류와 페이로드 변형이 일치하는지 확인합니다.
    pub fn is_consistent(&self) -> bool {
        self.event_type == self.event.event_type()
    }
}

/// 로그 시크릿으로 식별된 서버
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ServerIdentity {
    pub server_id: i64,
    pub server_name: String,
}

/// 서버 식별 정보가 붙은 파싱 결과
#[derive(Debug, Clone, Serialize)]
pub struct ServerEvent {
    pub server: Arc<ServerIdentity>,
    pub result: ParseResult,
}

impl ServerEvent {
    pub fn server_id(&self) -> i64 {
        self.server.server_id
    }

    pub fn event_type(&self) -> EventType {
        self.result.event_type
    }
}
