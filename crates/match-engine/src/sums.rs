//! 매치 누적 집계 구조체
//!
//! 플레이어/메딕/팀/라운드 단위의 카운터입니다. 비율(K/D, 명중률 등)은
//! 저장하지 않고 접근자에서 매번 계산합니다.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use srcstat_log_pipeline::types::{Medigun, PlayerClass, Position, SteamId, Team};
use srcstat_log_pipeline::Weapon;

/// 점령 기록
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointCapture {
    pub cp: i32,
    pub cp_name: String,
    pub position: Position,
}

/// 점령 저지 기록
pub type CaptureBlock = PointCapture;

/// 무기별 집계
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeaponSum {
    pub kills: u32,
    pub damage: i64,
    pub shots: u32,
    pub hits: u32,
    pub airshots: u32,
    pub headshots: u32,
    pub backstabs: u32,
}

impl WeaponSum {
    pub fn accuracy(&self) -> f64 {
        ratio(self.hits, self.shots)
    }
}

/// 플레이어 한 명의 매치 누적 통계
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSum {
    pub steam_id: SteamId,
    /// 마지막으로 본 닉네임
    pub name: String,
    /// 마지막으로 본 팀
    pub team: Team,
    /// 세션 시작 시각. 매치 시작 전에 들어온 플레이어는 첫 라운드 시작 시 채워집니다.
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub kills: u32,
    pub assists: u32,
    pub deaths: u32,
    pub suicides: u32,
    pub dominations: u32,
    pub dominated: u32,
    pub revenges: u32,
    pub damage: i64,
    pub damage_taken: i64,
    pub healing: i64,
    pub healing_taken: i64,
    pub health_packs: u32,
    /// 체력 팩으로 회복한 양
    pub pack_healing: i64,
    pub backstabs: u32,
    pub headshots: u32,
    pub airshots: u32,
    pub shots: u32,
    pub hits: u32,
    pub extinguishes: u32,
    pub buildings_built: u32,
    /// 스스로 폭파
    pub buildings_detonated: u32,
    /// 상대 건물 파괴
    pub buildings_destroyed: u32,
    /// 운반 중 파괴됨
    pub buildings_dropped: u32,
    pub buildings_carried: u32,
    pub captures: Vec<PointCapture>,
    pub captures_blocked: Vec<CaptureBlock>,
    /// 사용한 병과 (등장 순서, 중복 없음)
    pub classes: Vec<PlayerClass>,
    /// 현재 병과
    pub current_class: Option<PlayerClass>,
    pub weapons: BTreeMap<Weapon, WeaponSum>,
}

impl PlayerSum {
    pub(crate) fn new(steam_id: SteamId) -> Self {
        Self {
            steam_id,
            name: String::new(),
            team: Team::Unassigned,
            time_start: None,
            time_end: None,
            kills: 0,
            assists: 0,
            deaths: 0,
            suicides: 0,
            dominations: 0,
            dominated: 0,
            revenges: 0,
            damage: 0,
            damage_taken: 0,
            healing: 0,
            healing_taken: 0,
            health_packs: 0,
            pack_healing: 0,
            backstabs: 0,
            headshots: 0,
            airshots: 0,
            shots: 0,
            hits: 0,
            extinguishes: 0,
            buildings_built: 0,
            buildings_detonated: 0,
            buildings_destroyed: 0,
            buildings_dropped: 0,
            buildings_carried: 0,
            captures: Vec::new(),
            captures_blocked: Vec::new(),
            classes: Vec::new(),
            current_class: None,
            weapons: BTreeMap::new(),
        }
    }

    /// 세션 시작 시각이 없으면 `now`로 채웁니다.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if self.time_start.is_none() {
            self.time_start = Some(now);
        }
    }

    pub(crate) fn weapon_mut(&mut self, weapon: Weapon) -> &mut WeaponSum {
        self.weapons.entry(weapon).or_default()
    }

    /// 사망이 없으면 킬 수 그대로
    pub fn kd(&self) -> f64 {
        if self.deaths == 0 {
            return f64::from(self.kills);
        }
        f64::from(self.kills) / f64::from(self.deaths)
    }

    /// (킬 + 어시스트) / 사망
    pub fn kad(&self) -> f64 {
        let ka = self.kills + self.assists;
        if self.deaths == 0 {
            return f64::from(ka);
        }
        f64::from(ka) / f64::from(self.deaths)
    }

    /// 명중률 (0.0 ~ 1.0)
    pub fn accuracy(&self) -> f64 {
        ratio(self.hits, self.shots)
    }

    /// 세션 길이. 시작/종료가 모두 있어야 합니다.
    pub fn session_length(&self) -> Option<chrono::Duration> {
        Some(self.time_end? - self.time_start?)
    }
}

/// 메딕 한 명의 누적 통계
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicSum {
    pub steam_id: SteamId,
    pub healing: i64,
    /// 메디건 종류별 우버 사용 횟수
    pub charges: HashMap<Medigun, u32>,
    /// 우버를 채운 상태로 사망
    pub drops: u32,
    /// 95% 초과 100% 미만 충전 상태로 사망
    pub near_full_charge_deaths: u32,
    /// 30초를 넘는 우버 우위 상실
    pub major_adv_lost: u32,
    /// 가장 크게 잃은 우버 우위 (초)
    pub biggest_adv_lost: i64,
    /// 스폰 후 첫 치유까지 걸린 시간 목록 (초)
    pub first_heal_after_spawn: Vec<f64>,
    /// 우버 지속 시간 목록 (초)
    pub charge_lengths: Vec<f64>,
}

impl MedicSum {
    pub(crate) fn new(steam_id: SteamId) -> Self {
        let charges = [
            Medigun::Uber,
            Medigun::Kritzkrieg,
            Medigun::Vaccinator,
            Medigun::QuickFix,
        ]
        .into_iter()
        .map(|m| (m, 0))
        .collect();

        Self {
            steam_id,
            healing: 0,
            charges,
            drops: 0,
            near_full_charge_deaths: 0,
            major_adv_lost: 0,
            biggest_adv_lost: 0,
            first_heal_after_spawn: Vec::new(),
            charge_lengths: Vec::new(),
        }
    }

    pub fn total_charges(&self) -> u32 {
        self.charges.values().sum()
    }

    /// 평균 우버 지속 시간. 기록이 없으면 `None`.
    pub fn avg_uber_length(&self) -> Option<f64> {
        mean(&self.charge_lengths)
    }

    /// 평균 스폰 후 첫 치유 시간
    pub fn avg_first_heal(&self) -> Option<f64> {
        mean(&self.first_heal_after_spawn)
    }
}

/// 팀 누적 통계
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSum {
    pub team: Team,
    pub kills: u32,
    pub damage: i64,
    pub charges: u32,
    pub drops: u32,
    pub caps: u32,
    /// 라운드 첫 점령을 가져간 횟수
    pub mid_fights: u32,
}

impl TeamSum {
    pub(crate) fn new(team: Team) -> Self {
        Self {
            team,
            kills: 0,
            damage: 0,
            charges: 0,
            drops: 0,
            caps: 0,
            mid_fights: 0,
        }
    }
}

/// 팀별 정수 쌍
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamPair {
    pub red: i64,
    pub blu: i64,
}

impl TeamPair {
    /// 레드/블루가 아닌 팀은 무시합니다.
    pub(crate) fn add(&mut self, team: Team, amount: i64) {
        match team {
            Team::Red => self.red += amount,
            Team::Blu => self.blu += amount,
            Team::Unassigned | Team::Spec => {}
        }
    }

    pub(crate) fn set(&mut self, team: Team, value: i64) {
        match team {
            Team::Red => self.red = value,
            Team::Blu => self.blu = value,
            Team::Unassigned | Team::Spec => {}
        }
    }

    pub fn get(&self, team: Team) -> i64 {
        match team {
            Team::Red => self.red,
            Team::Blu => self.blu,
            Team::Unassigned | Team::Spec => 0,
        }
    }
}

/// 라운드 한 개의 집계
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSum {
    pub started_at: DateTime<Utc>,
    /// `Round_Length`로 보고된 길이 (초)
    pub length: Option<f64>,
    pub score: TeamPair,
    pub kills: TeamPair,
    pub damage: TeamPair,
    pub ubers: TeamPair,
    pub winner: Option<Team>,
    /// 라운드 첫 점령 팀
    pub mid_fight: Option<Team>,
    pub overtime: bool,
}

impl RoundSum {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            length: None,
            score: TeamPair::default(),
            kills: TeamPair::default(),
            damage: TeamPair::default(),
            ubers: TeamPair::default(),
            winner: None,
            mid_fight: None,
            overtime: false,
        }
    }
}

/// 채팅 한 줄
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub steam_id: SteamId,
    pub name: String,
    pub message: String,
    /// 팀 채팅 여부
    pub team_only: bool,
    pub created_on: DateTime<Utc>,
}

/// 병과별 카운터
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassSums {
    pub counts: BTreeMap<PlayerClass, u32>,
}

impl ClassSums {
    pub(crate) fn bump(&mut self, class: PlayerClass) {
        *self.counts.entry(class).or_insert(0) += 1;
    }

    pub fn get(&self, class: PlayerClass) -> u32 {
        self.counts.get(&class).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

fn ratio(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    f64::from(part) / f64::from(whole)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
