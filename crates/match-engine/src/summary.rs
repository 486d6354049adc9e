//! 매치 요약 DTO
//!
//! 맵 키 대신 정렬된 `Vec`을 사용하므로 JSON으로 그대로 내보낼 수 있습니다.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use srcstat_log_pipeline::types::{PlayerClass, Team};

use crate::state::{Match, MatchState};
use crate::sums::{TeamPair, TeamSum};

/// 플레이어 한 줄 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub steam_id: String,
    pub name: String,
    pub team: Team,
    pub classes: Vec<PlayerClass>,
    pub kills: u32,
    pub assists: u32,
    pub deaths: u32,
    pub damage: i64,
    pub damage_taken: i64,
    pub healing: i64,
    pub kd: f64,
    pub kad: f64,
    /// 세션 길이 (초)
    pub play_time: Option<i64>,
}

/// 메딕 한 줄 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicSummary {
    pub steam_id: String,
    pub healing: i64,
    pub charges: u32,
    pub drops: u32,
    pub avg_uber_length: Option<f64>,
    pub biggest_adv_lost: i64,
}

/// 매치 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub server_id: i64,
    pub title: String,
    pub map_name: String,
    pub created_on: DateTime<Utc>,
    pub state: MatchState,
    pub rounds: usize,
    /// 라운드 승리 수
    pub round_wins: TeamPair,
    /// 마지막으로 보고된 팀 점수
    pub final_score: TeamPair,
    pub player_count: usize,
    pub kills: u32,
    pub assists: u32,
    pub damage: i64,
    pub healing: i64,
    pub airshots: u32,
    pub teams: Vec<TeamSum>,
    /// 킬 수 내림차순
    pub players: Vec<PlayerSummary>,
    pub medics: Vec<MedicSummary>,
    pub chat_messages: usize,
}

impl MatchSummary {
    pub(crate) fn from_match(m: &Match) -> Self {
        let mut round_wins = TeamPair::default();
        for winner in m.rounds().iter().filter_map(|r| r.winner) {
            round_wins.add(winner, 1);
        }
        let final_score = m.rounds().last().map(|r| r.score).unwrap_or_default();

        let (mut kills, mut assists, mut damage, mut healing, mut airshots) = (0, 0, 0, 0, 0);
        for p in m.players() {
            kills += p.kills;
            assists += p.assists;
            damage += p.damage;
            healing += p.healing;
            airshots += p.airshots;
        }

        let players = m
            .top_players()
            .into_iter()
            .map(|p| PlayerSummary {
                steam_id: p.steam_id.steam3(),
                name: p.name.clone(),
                team: p.team,
                classes: p.classes.clone(),
                kills: p.kills,
                assists: p.assists,
                deaths: p.deaths,
                damage: p.damage,
                damage_taken: p.damage_taken,
                healing: p.healing,
                kd: p.kd(),
                kad: p.kad(),
                play_time: p.session_length().map(|d| d.num_seconds()),
            })
            .collect();

        let mut medics: Vec<MedicSummary> = m
            .medics()
            .map(|s| MedicSummary {
                steam_id: s.steam_id.steam3(),
                healing: s.healing,
                charges: s.total_charges(),
                drops: s.drops,
                avg_uber_length: s.avg_uber_length(),
                biggest_adv_lost: s.biggest_adv_lost,
            })
            .collect();
        medics.sort_by(|a, b| b.healing.cmp(&a.healing));

        Self {
            match_id: m.match_id,
            server_id: m.server_id,
            title: m.title.clone(),
            map_name: m.map_name.clone(),
            created_on: m.created_on,
            state: m.state(),
            rounds: m.rounds().len(),
            round_wins,
            final_score,
            player_count: m.player_count(),
            kills,
            assists,
            damage,
            healing,
            airshots,
            teams: m.teams().cloned().collect(),
            players,
            medics,
            chat_messages: m.chat().len(),
        }
    }

    /// 라운드 승수로 본 승리 팀. 동률이면 `None`.
    pub fn winner(&self) -> Option<Team> {
        match self.round_wins.red.cmp(&self.round_wins.blu) {
            std::cmp::Ordering::Greater => Some(Team::Red),
            std::cmp::Ordering::Less => Some(Team::Blu),
            std::cmp::Ordering::Equal => None,
        }
    }
}
