//! 매치 상태 머신 -- 한 서버의 이벤트 스트림을 순서대로 적용합니다.
//!
//! # 상태 전이
//! ```text
//! NotStarted --RoundStart--> InRound --RoundWin--> BetweenRounds --RoundStart--> InRound
//!      \                        |                        |
//!       `------------------- GameOver ------------------'--> Over
//! ```
//!
//! # 적용 정책
//! - 생명주기 이벤트(채팅, 팀 참가, 접속/입장/퇴장, 맵, 병과)는 상태와 무관하게 기록합니다.
//! - 라운드 정보 이벤트(길이, 점수, 연장전)는 현재 라운드가 있으면 기록합니다.
//! - 그 외 게임플레이 이벤트는 `InRound`일 때만 집계하고, 그렇지 않으면 조용히 버립니다.
//!
//! `Match`는 동기화되지 않습니다. 한 매치는 한 태스크만 소유해야 합니다
//! ([`MatchWorker`](crate::worker::MatchWorker) 참고).

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use srcstat_log_pipeline::event::*;
use srcstat_log_pipeline::types::{PlayerClass, SteamId, Team};
use srcstat_log_pipeline::{EventType, ParseResult, Weapon};

use crate::error::MatchError;
use crate::summary::MatchSummary;
use crate::sums::{
    ChatMessage, ClassSums, MedicSum, PlayerSum, PointCapture, RoundSum, TeamSum,
};

/// 큰 우버 우위 상실 기준 (초)
const MAJOR_ADV_LOST_SECS: i64 = 30;

/// 매치 생명주기 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchState {
    /// 첫 라운드 시작 전 (워밍업)
    NotStarted,
    /// 라운드 사이
    BetweenRounds,
    /// 라운드 진행 중
    InRound,
    /// 게임 종료. 더 이상 통계를 집계하지 않습니다.
    Over,
}

/// 매치 집계 루트
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub match_id: Uuid,
    pub server_id: i64,
    pub title: String,
    pub map_name: String,
    pub created_on: DateTime<Utc>,
    state: MatchState,
    use_real_dmg: bool,
    players: HashMap<SteamId, PlayerSum>,
    medics: HashMap<SteamId, MedicSum>,
    teams: BTreeMap<Team, TeamSum>,
    rounds: Vec<RoundSum>,
    chat: Vec<ChatMessage>,
    class_kills: HashMap<SteamId, ClassSums>,
    class_kill_assists: HashMap<SteamId, ClassSums>,
    class_deaths: HashMap<SteamId, ClassSums>,
}

impl Match {
    /// 새 매치를 만듭니다.
    ///
    /// `use_real_dmg`는 매치 수명 동안 고정됩니다.
    pub fn new(server_id: i64, title: impl Into<String>, use_real_dmg: bool) -> Self {
        Self {
            match_id: Uuid::new_v4(),
            server_id,
            title: title.into(),
            map_name: String::new(),
            created_on: Utc::now(),
            state: MatchState::NotStarted,
            use_real_dmg,
            players: HashMap::new(),
            medics: HashMap::new(),
            teams: BTreeMap::new(),
            rounds: Vec::new(),
            chat: Vec::new(),
            class_kills: HashMap::new(),
            class_kill_assists: HashMap::new(),
            class_deaths: HashMap::new(),
        }
    }

    // ─── 상태 조회 ─────────────────────────────────────────────────

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// 첫 라운드가 시작되었고 아직 게임이 끝나지 않음
    pub fn in_match(&self) -> bool {
        matches!(self.state, MatchState::BetweenRounds | MatchState::InRound)
    }

    pub fn in_round(&self) -> bool {
        self.state == MatchState::InRound
    }

    pub fn is_over(&self) -> bool {
        self.state == MatchState::Over
    }

    pub fn use_real_dmg(&self) -> bool {
        self.use_real_dmg
    }

    /// 현재 라운드 인덱스 (라운드가 없으면 `None`)
    pub fn current_round_index(&self) -> Option<usize> {
        self.rounds.len().checked_sub(1)
    }

    pub fn player(&self, sid: SteamId) -> Option<&PlayerSum> {
        self.players.get(&sid)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerSum> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn medic(&self, sid: SteamId) -> Option<&MedicSum> {
        self.medics.get(&sid)
    }

    pub fn medics(&self) -> impl Iterator<Item = &MedicSum> {
        self.medics.values()
    }

    pub fn team(&self, team: Team) -> Option<&TeamSum> {
        self.teams.get(&team)
    }

    pub fn teams(&self) -> impl Iterator<Item = &TeamSum> {
        self.teams.values()
    }

    pub fn rounds(&self) -> &[RoundSum] {
        &self.rounds
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn class_kills(&self, sid: SteamId) -> Option<&ClassSums> {
        self.class_kills.get(&sid)
    }

    pub fn class_kill_assists(&self, sid: SteamId) -> Option<&ClassSums> {
        self.class_kill_assists.get(&sid)
    }

    pub fn class_deaths(&self, sid: SteamId) -> Option<&ClassSums> {
        self.class_deaths.get(&sid)
    }

    /// 킬 수 내림차순 플레이어 목록. 동률은 SteamID 순.
    pub fn top_players(&self) -> Vec<&PlayerSum> {
        let mut players: Vec<&PlayerSum> = self.players.values().collect();
        players.sort_by(|a, b| b.kills.cmp(&a.kills).then(a.steam_id.cmp(&b.steam_id)));
        players
    }

    /// 요약 DTO
    pub fn summary(&self) -> MatchSummary {
        MatchSummary::from_match(self)
    }

    // ─── 적용 ──────────────────────────────────────────────────────

    /// 파싱 결과 하나를 매치에 적용합니다.
    ///
    /// 게임플레이 이벤트가 라운드 밖에서 들어오면 아무것도 바꾸지 않고 [`MatchError::Ignored`]를 반환합니다.
    pub fn apply(&mut self, result: &ParseResult) -> Result<(), MatchError> {
        if !result.is_consistent() {
            return Err(MatchError::InvalidType {
                declared: result.event_type,
                actual: result.event.event_type(),
            });
        }

        match &result.event {
            Event::IgnoredMsg(_) => return Err(MatchError::Ignored(EventType::IgnoredMsg)),
            Event::UnknownMsg(_) => return Err(MatchError::Unhandled(EventType::UnknownMsg)),

            // 생명주기
            Event::Say(e) => {
                self.add_chat(e, false);
                return Ok(());
            }
            Event::SayTeam(e) => {
                self.add_chat(e, true);
                return Ok(());
            }
            Event::JoinedTeam(e) => {
                let now = e.created_on;
                let in_match = self.in_match();
                let player = self.player_mut(&e.source, now, in_match);
                player.team = e.new_team;
                return Ok(());
            }
            Event::SpawnedAs(e) | Event::ChangeClass(e) => {
                self.add_class(e);
                return Ok(());
            }
            Event::Connected(e) => {
                let in_match = self.in_match();
                self.player_mut(&e.source, e.created_on, in_match).time_end = None;
                return Ok(());
            }
            Event::Entered(e) => {
                let in_match = self.in_match();
                self.player_mut(&e.source, e.created_on, in_match);
                return Ok(());
            }
            Event::Disconnected(e) => {
                if let Some(player) = self.players.get_mut(&e.source.sid) {
                    player.time_end = Some(e.created_on);
                }
                return Ok(());
            }
            Event::MapLoad(e) | Event::MapStarted(e) => {
                self.map_name.clone_from(&e.map);
                return Ok(());
            }

            // 라운드 경계
            Event::WRoundStart(e) | Event::WMiniRoundStart(e) => {
                self.round_start(e.created_on);
                return Ok(());
            }
            Event::WRoundWin(e) => {
                self.round_win(e.winner);
                return Ok(());
            }
            Event::WMiniRoundWin(e) => {
                self.round_win(e.winner);
                return Ok(());
            }
            Event::WGameOver(e) => {
                self.game_over(e.created_on);
                return Ok(());
            }

            // 라운드 정보
            Event::WRoundLen(e) | Event::WMiniRoundLen(e) => {
                if let Some(round) = self.rounds.last_mut() {
                    round.length = Some(e.seconds);
                }
                return Ok(());
            }
            Event::WTeamScore(e) | Event::WTeamFinalScore(e) => {
                if let Some(round) = self.rounds.last_mut() {
                    round.score.set(e.team, i64::from(e.score));
                }
                return Ok(());
            }
            Event::WRoundOvertime(_) => {
                if let Some(round) = self.rounds.last_mut() {
                    round.overtime = true;
                }
                return Ok(());
            }

            // 매치 집계와 무관한 서버 이벤트
            Event::LogStart(_)
            | Event::LogStop(_)
            | Event::Cvar(_)
            | Event::Rcon(_)
            | Event::Validated(_)
            | Event::ServerConfigExec(_)
            | Event::SteamAuth(_)
            | Event::WPaused(_)
            | Event::WResumed(_)
            | Event::WMiniRoundSelected(_)
            | Event::WRoundSetupBegin(_)
            | Event::WIntermissionWinLimit(_) => {
                return Err(MatchError::Ignored(result.event_type));
            }

            _ => {}
        }

        if !self.in_round() {
            return Err(MatchError::Ignored(result.event_type));
        }

        self.apply_gameplay(&result.event);
        Ok(())
    }

    /// 라운드 진행 중에만 호출됩니다.
    fn apply_gameplay(&mut self, event: &Event) {
        match event {
            Event::Damage(e) => self.damage(e),
            Event::Killed(e) => {
                self.kill(&e.source, &e.target, e.weapon, e.created_on);
            }
            Event::KilledCustom(e) => self.killed_custom(e),
            Event::KillAssist(e) => {
                let player = self.player_mut(&e.source, e.created_on, true);
                player.assists += 1;
                let class = player.current_class;
                if let Some(class) = class {
                    self.class_kill_assists
                        .entry(e.source.sid)
                        .or_default()
                        .bump(class);
                }
            }
            Event::Suicide(e) => {
                self.player_mut(&e.source, e.created_on, true).suicides += 1;
            }
            Event::ShotFired(e) => {
                let player = self.player_mut(&e.source, e.created_on, true);
                player.shots += 1;
                player.weapon_mut(e.weapon).shots += 1;
            }
            Event::ShotHit(e) => {
                let player = self.player_mut(&e.source, e.created_on, true);
                player.hits += 1;
                player.weapon_mut(e.weapon).hits += 1;
            }
            Event::Healed(e) => {
                self.player_mut(&e.source, e.created_on, true).healing += e.healing;
                self.player_mut(&e.target, e.created_on, true).healing_taken += e.healing;
                if let Some(medic) = self.medics.get_mut(&e.source.sid) {
                    medic.healing += e.healing;
                }
            }
            Event::Pickup(e) => {
                if e.item.is_some_and(|item| item.is_health()) {
                    let player = self.player_mut(&e.source, e.created_on, true);
                    player.health_packs += 1;
                    player.pack_healing += e.healing;
                }
            }
            Event::Domination(e) => {
                self.player_mut(&e.source, e.created_on, true).dominations += 1;
                self.player_mut(&e.target, e.created_on, true).dominated += 1;
            }
            Event::Revenge(e) => {
                self.player_mut(&e.source, e.created_on, true).revenges += 1;
            }
            Event::Extinguished(e) => {
                self.player_mut(&e.source, e.created_on, true).extinguishes += 1;
            }
            Event::BuiltObject(e) => {
                self.player_mut(&e.source, e.created_on, true).buildings_built += 1;
            }
            Event::CarryObject(e) => {
                self.player_mut(&e.source, e.created_on, true).buildings_carried += 1;
            }
            Event::DropObject(e) => {
                self.player_mut(&e.source, e.created_on, true).buildings_dropped += 1;
            }
            Event::DetonatedObject(e) => {
                self.player_mut(&e.source, e.created_on, true).buildings_detonated += 1;
            }
            Event::KilledObject(e) => {
                self.player_mut(&e.source, e.created_on, true).buildings_destroyed += 1;
            }
            Event::PointCaptured(e) => self.point_captured(e),
            Event::CaptureBlocked(e) => {
                self.player_mut(&e.source, e.created_on, true)
                    .captures_blocked
                    .push(PointCapture {
                        cp: e.cp,
                        cp_name: e.cp_name.clone(),
                        position: e.position,
                    });
            }
            Event::ChargeDeployed(e) => {
                self.player_mut(&e.source, e.created_on, true);
                *self
                    .medic_mut(e.source.sid)
                    .charges
                    .entry(e.medigun)
                    .or_insert(0) += 1;
                self.team_mut(e.source.team).charges += 1;
                if let Some(round) = self.rounds.last_mut() {
                    round.ubers.add(e.source.team, 1);
                }
            }
            Event::ChargeEnded(e) => {
                self.medic_mut(e.source.sid).charge_lengths.push(e.duration);
            }
            Event::MedicDeath(e) => {
                if e.had_uber {
                    self.medic_mut(e.target.sid).drops += 1;
                    self.team_mut(e.target.team).drops += 1;
                }
            }
            Event::MedicDeathEx(e) => {
                if e.uber_pct > 95 && e.uber_pct < 100 {
                    self.medic_mut(e.source.sid).near_full_charge_deaths += 1;
                }
            }
            Event::LostUberAdv(e) => {
                let medic = self.medic_mut(e.source.sid);
                if e.time > MAJOR_ADV_LOST_SECS {
                    medic.major_adv_lost += 1;
                }
                medic.biggest_adv_lost = medic.biggest_adv_lost.max(e.time);
            }
            Event::FirstHealAfterSpawn(e) => {
                self.medic_mut(e.source.sid).first_heal_after_spawn.push(e.time);
            }

            // 집계 항목이 없는 게임플레이 이벤트
            Event::ChargeReady(_)
            | Event::EmptyUber(_)
            | Event::JarateAttack(_)
            | Event::MilkAttack(_)
            | Event::GasAttack(_) => {}

            other => debug!(event_type = %other.event_type(), "no gameplay handler"),
        }
    }

    // ─── 지연 생성 ─────────────────────────────────────────────────

    /// 플레이어 항목을 찾거나 처음 참조될 때 만듭니다.
    ///
    /// 매치 진행 중에 새로 생긴 플레이어는 세션 시작 시각을 `now`로 채웁니다.
    fn player_mut(&mut self, source: &SourcePlayer, now: DateTime<Utc>, in_match: bool) -> &mut PlayerSum {
        let player = self
            .players
            .entry(source.sid)
            .or_insert_with(|| PlayerSum::new(source.sid));
        player.name.clone_from(&source.name);
        if source.team != Team::Unassigned {
            player.team = source.team;
        }
        if in_match {
            player.touch(now);
        }
        player
    }

    fn medic_mut(&mut self, sid: SteamId) -> &mut MedicSum {
        self.medics.entry(sid).or_insert_with(|| MedicSum::new(sid))
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamSum {
        self.teams.entry(team).or_insert_with(|| TeamSum::new(team))
    }

    // ─── 전이 ──────────────────────────────────────────────────────

    fn round_start(&mut self, now: DateTime<Utc>) {
        if self.is_over() {
            debug!(server_id = self.server_id, "round start after game over ignored");
            return;
        }
        self.state = MatchState::InRound;
        self.rounds.push(RoundSum::new(now));
        for player in self.players.values_mut() {
            player.touch(now);
        }
    }

    fn round_win(&mut self, winner: Team) {
        if !self.in_match() {
            return;
        }
        if let Some(round) = self.rounds.last_mut() {
            round.winner = Some(winner);
        }
        self.state = MatchState::BetweenRounds;
    }

    fn game_over(&mut self, now: DateTime<Utc>) {
        self.state = MatchState::Over;
        for player in self.players.values_mut() {
            if player.time_start.is_some() && player.time_end.is_none() {
                player.time_end = Some(now);
            }
        }
    }

    // ─── 생명주기 ──────────────────────────────────────────────────

    fn add_chat(&mut self, e: &SayEvt, team_only: bool) {
        self.chat.push(ChatMessage {
            steam_id: e.source.sid,
            name: e.source.name.clone(),
            message: e.msg.clone(),
            team_only,
            created_on: e.created_on,
        });
    }

    fn add_class(&mut self, e: &ClassEvt) {
        if e.class == PlayerClass::Spectator {
            return;
        }
        let in_match = self.in_match();
        let player = self.player_mut(&e.source, e.created_on, in_match);
        player.current_class = Some(e.class);
        if player.classes.contains(&e.class) {
            return;
        }
        player.classes.push(e.class);
        if e.class == PlayerClass::Medic {
            self.medic_mut(e.source.sid);
        }
    }

    // ─── 게임플레이 ────────────────────────────────────────────────

    fn damage(&mut self, e: &DamageEvt) {
        let amount = if self.use_real_dmg {
            e.real_damage
        } else {
            e.damage
        };

        let player = self.player_mut(&e.source, e.created_on, true);
        player.damage += amount;
        if e.airshot {
            player.airshots += 1;
        }
        let weapon = player.weapon_mut(e.weapon);
        weapon.damage += amount;
        if e.airshot {
            weapon.airshots += 1;
        }
        if e.headshot {
            weapon.headshots += 1;
        }

        if let Some(target) = &e.target {
            self.player_mut(target, e.created_on, true).damage_taken += amount;
        }
        self.team_mut(e.source.team).damage += amount;
        if let Some(round) = self.rounds.last_mut() {
            round.damage.add(e.source.team, amount);
        }
    }

    /// 실제 사망으로 이어진 킬 한 건
    fn kill(
        &mut self,
        source: &SourcePlayer,
        target: &TargetPlayer,
        weapon: Weapon,
        now: DateTime<Utc>,
    ) {
        let killer = self.player_mut(source, now, true);
        killer.kills += 1;
        killer.weapon_mut(weapon).kills += 1;
        let killer_class = killer.current_class;

        let victim = self.player_mut(target, now, true);
        victim.deaths += 1;
        let victim_class = victim.current_class;

        if let Some(class) = killer_class {
            self.class_kills.entry(source.sid).or_default().bump(class);
        }
        if let Some(class) = victim_class {
            self.class_deaths.entry(target.sid).or_default().bump(class);
        }

        self.team_mut(source.team).kills += 1;
        if let Some(round) = self.rounds.last_mut() {
            round.kills.add(source.team, 1);
        }
    }

    fn killed_custom(&mut self, e: &KilledCustomEvt) {
        match e.custom_kill.as_str() {
            // 데드 링어 가짜 죽음은 킬/데스가 아님
            "feign_death" => return,
            "backstab" => {
                let player = self.player_mut(&e.source, e.created_on, true);
                player.backstabs += 1;
                player.weapon_mut(e.weapon).backstabs += 1;
            }
            "headshot" => {
                let player = self.player_mut(&e.source, e.created_on, true);
                player.headshots += 1;
                player.weapon_mut(e.weapon).headshots += 1;
            }
            other => debug!(custom_kill = other, "unrecognised custom kill"),
        }
        self.kill(&e.source, &e.target, e.weapon, e.created_on);
    }

    fn point_captured(&mut self, e: &PointCapturedEvt) {
        for capper in &e.players {
            self.player_mut(&capper.player, e.created_on, true)
                .captures
                .push(PointCapture {
                    cp: e.cp,
                    cp_name: e.cp_name.clone(),
                    position: capper.position,
                });
        }

        let mut first_cap = false;
        if let Some(round) = self.rounds.last_mut()
            && round.mid_fight.is_none()
        {
            round.mid_fight = Some(e.team);
            first_cap = true;
        }

        let team = self.team_mut(e.team);
        team.caps += 1;
        if first_cap {
            team.mid_fights += 1;
        }
    }
}
