//! 라인 패턴 테이블
//!
//! 순서가 곧 우선순위입니다. 더 구체적인 패턴은 그것을 포함하는 느슨한 패턴보다
//! 앞에 있어야 합니다 (대상 있는 damage > 대상 없는 damage, customkill > killed,
//! 키/값 있는 pickup > 없는 pickup).
//!
//! 패턴 본문은 공통 접두어(`L <date>: `) 뒤 부분만 적고, 다음 자리표시자를 씁니다.
//! - `{player}`: 행위자 토큰 (`name`, `pid`, `sid`, `team`)
//! - `{target}`: 대상 토큰 (`name2`, `pid2`, `sid2`, `team2`)
//! - `{kv}`: 라인 끝까지의 `(key "value")` 목록 (`keypairs`)

use crate::error::ParseError;
use crate::event::*;
use crate::parser::fields::Fields;
use crate::parser::token;
use crate::types::{CritType, PickupItem};

/// 이벤트 생성자
pub type BuildFn = fn(&Fields) -> Result<Event, ParseError>;

/// 모든 라인 공통 접두어
pub const PREFIX: &str = r"^L\s(?P<created_on>.+?):\s+";

const PLAYER: &str = r#""(?P<name>.+?)<(?P<pid>\d+)><(?P<sid>.+?)><(?P<team>Unassigned|Red|Blue|Spectator|unknown)?>""#;
const TARGET: &str = r#""(?P<name2>.+?)<(?P<pid2>\d+)><(?P<sid2>.+?)><(?P<team2>Unassigned|Red|Blue|Spectator|unknown)?>""#;
const KV: &str = r"\s+(?P<keypairs>.+)$";

/// 패턴 하나
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub event_type: EventType,
    pub body: &'static str,
    pub build: BuildFn,
}

impl Rule {
    const fn new(event_type: EventType, body: &'static str, build: BuildFn) -> Self {
        Self {
            event_type,
            body,
            build,
        }
    }

    /// 접두어와 자리표시자를 펼친 완성 패턴
    pub fn pattern(&self) -> String {
        let body = self
            .body
            .replace("{player}", PLAYER)
            .replace("{target}", TARGET)
            .replace("{kv}", KV);
        format!("{PREFIX}{body}")
    }
}

/// 우선순위 순서의 패턴 테이블
pub fn rules() -> Vec<Rule> {
    use EventType as T;

    vec![
        Rule::new(T::LogStart, r"[Ll]og file started{kv}", log_start),
        Rule::new(T::LogStop, r"[Ll]og file closed\.?$", log_stop),
        Rule::new(T::Cvar, r#"server_cvar:\s+"(?P<cvar>.+?)"\s+"(?P<value>.*)"$"#, cvar),
        Rule::new(T::Rcon, r#"[Rr][Cc][Oo][Nn] from "(?P<ip>.+?)": command "(?P<cmd>.*)"$"#, rcon),
        Rule::new(T::ShotFired, r#"{player}\s+triggered "shot_fired"{kv}"#, shot_fired),
        Rule::new(T::ShotHit, r#"{player}\s+triggered "shot_hit"{kv}"#, shot_hit),
        Rule::new(T::Damage, r#"{player}\s+triggered "[dD]amage" against {target}{kv}"#, damage),
        Rule::new(T::Damage, r#"{player}\s+triggered "[dD]amage"{kv}"#, damage),
        Rule::new(
            T::KilledCustom,
            r#"{player}\s+[Kk]illed {target} with "(?P<weapon>.+?)"\s+\(customkill "(?P<customkill>.+?)"\)(?:\s+(?P<keypairs>.+))?$"#,
            killed_custom,
        ),
        Rule::new(
            T::Killed,
            r#"{player}\s+[Kk]illed {target} with "(?P<weapon>.+?)"(?:\s+(?P<keypairs>.+))?$"#,
            killed,
        ),
        Rule::new(T::Healed, r#"{player}\s+triggered "[hH]ealed" against {target}{kv}"#, healed),
        Rule::new(T::KillAssist, r#"{player}\s+triggered "kill assist" against {target}{kv}"#, kill_assist),
        Rule::new(T::Pickup, r#"{player}\s+picked up item "(?P<item>[^"]+)"{kv}"#, pickup),
        Rule::new(T::Pickup, r#"{player}\s+picked up item "(?P<item>[^"]+)""#, pickup),
        Rule::new(T::SpawnedAs, r#"{player}\s+spawned as "(?P<class>\S+)"$"#, spawned_as),
        Rule::new(T::Validated, r"{player}\s+STEAM USERID [vV]alidated$", validated),
        Rule::new(T::Connected, r#"{player}\s+[Cc]onnected, address(?:\s+"(?P<address>.*?)")?$"#, connected),
        Rule::new(T::Entered, r"{player}\s+[Ee]ntered the game$", entered),
        Rule::new(
            T::JoinedTeam,
            r#"{player}\s+joined team "(?P<new_team>Red|Blue|Spectator|Unassigned)"$"#,
            joined_team,
        ),
        Rule::new(T::ChangeClass, r#"{player}\s+changed role to "(?P<class>.+?)""#, change_class),
        Rule::new(
            T::Suicide,
            r#"{player}\s+committed [Ss]uicide with "(?P<weapon>.+?)"(?:\s+(?P<keypairs>.+))?$"#,
            suicide,
        ),
        Rule::new(T::ChargeReady, r#"{player}\s+triggered "chargeready""#, charge_ready),
        Rule::new(
            T::ChargeDeployed,
            r#"{player}\s+triggered "chargedeployed"(?:\s+\(medigun "(?P<medigun>.+?)"\))?"#,
            charge_deployed,
        ),
        Rule::new(
            T::ChargeEnded,
            r#"{player}\s+triggered "chargeended"\s+\(duration "(?P<duration>.+?)"\)"#,
            charge_ended,
        ),
        Rule::new(T::Domination, r#"{player}\s+triggered "[Dd]omination" against {target}"#, domination),
        Rule::new(
            T::Revenge,
            r#"{player}\s+triggered "[Rr]evenge" against {target}(?:\s*\(assist "(?P<assist>\d+)"\))?"#,
            revenge,
        ),
        Rule::new(T::Say, r#"{player}\s+[Ss]ay\s+"(?P<msg>.*)"$"#, say),
        Rule::new(T::SayTeam, r#"{player}\s+say_team\s+"(?P<msg>.*)"$"#, say_team),
        Rule::new(T::EmptyUber, r#"{player}\s+triggered "empty_uber""#, empty_uber),
        Rule::new(T::LostUberAdv, r#"{player}\s+triggered "lost_uber_advantage"{kv}"#, lost_uber_adv),
        Rule::new(T::MedicDeath, r#"{player}\s+triggered "medic_death" against {target}{kv}"#, medic_death),
        Rule::new(T::MedicDeathEx, r#"{player}\s+triggered "medic_death_ex"{kv}"#, medic_death_ex),
        Rule::new(
            T::Extinguished,
            r#"{player}\s+triggered "player_extinguished" against {target} with "(?P<weapon>.+?)"{kv}"#,
            extinguished,
        ),
        Rule::new(T::BuiltObject, r#"{player}\s+triggered "player_builtobject"{kv}"#, built_object),
        Rule::new(T::CarryObject, r#"{player}\s+triggered "player_carryobject"{kv}"#, carry_object),
        Rule::new(T::DropObject, r#"{player}\s+triggered "player_dropobject"{kv}"#, drop_object),
        Rule::new(T::KilledObject, r#"{player}\s+triggered "killedobject"{kv}"#, killed_object),
        Rule::new(T::DetonatedObject, r#"{player}\s+triggered "object_detonated"{kv}"#, detonated_object),
        Rule::new(
            T::FirstHealAfterSpawn,
            r#"{player}\s+triggered "first_heal_after_spawn"{kv}"#,
            first_heal_after_spawn,
        ),
        Rule::new(T::PointCaptured, r#"Team "(?P<team>.+?)" triggered "pointcaptured"{kv}"#, point_captured),
        Rule::new(T::CaptureBlocked, r#"{player}\s+triggered "captureblocked"{kv}"#, capture_blocked),
        Rule::new(
            T::Disconnected,
            r#"{player}\s+[Dd]isconnected \(reason "(?P<reason>(?s:.*))$"#,
            disconnected,
        ),
        Rule::new(T::WRoundOvertime, r#"World triggered "Round_Overtime""#, round_overtime),
        Rule::new(T::WRoundStart, r#"World triggered "Round_Start""#, round_start),
        Rule::new(T::WRoundStart, r#"World triggered "Round_Setup_End""#, round_start),
        Rule::new(T::WRoundWin, r#"World triggered "Round_Win"{kv}"#, round_win),
        Rule::new(T::WRoundLen, r#"World triggered "Round_Length"{kv}"#, round_len),
        Rule::new(T::WGameOver, r#"World triggered "Game_Over" reason "(?P<reason>.+?)""#, game_over),
        Rule::new(
            T::WTeamScore,
            r#"Team "(?P<team>Red|Blue)" current score "(?P<score>\d+)" with "(?P<players>\d+)" players"#,
            team_score,
        ),
        Rule::new(
            T::WTeamFinalScore,
            r#"Team "(?P<team>Red|Blue)" final score "(?P<score>\d+)" with "(?P<players>\d+)" players"#,
            team_final_score,
        ),
        Rule::new(T::WPaused, r#"World triggered "Game_Paused""#, paused),
        Rule::new(T::WResumed, r#"World triggered "Game_Unpaused""#, resumed),
        Rule::new(T::MapLoad, r#"Loading map "(?P<map>.+?)"$"#, map_load),
        Rule::new(T::MapStarted, r#"Started map "(?P<map>.+?)""#, map_started),
        Rule::new(
            T::ServerConfigExec,
            r"Executing dedicated server config file (?P<config>.+?)$",
            server_config_exec,
        ),
        Rule::new(T::SteamAuth, r"STEAMAUTH: (?P<reason>.+?)$", steam_auth),
        Rule::new(
            T::JarateAttack,
            r#"{player}\s+triggered "jarate_attack" against {target} with "(?P<weapon>.+?)"{kv}"#,
            jarate_attack,
        ),
        Rule::new(
            T::MilkAttack,
            r#"{player}\s+triggered "milk_attack" against {target} with "(?P<weapon>.+?)"{kv}"#,
            milk_attack,
        ),
        Rule::new(
            T::GasAttack,
            r#"{player}\s+triggered "gas_attack" against {target} with "(?P<weapon>.+?)"{kv}"#,
            gas_attack,
        ),
        Rule::new(T::WMiniRoundWin, r#"World triggered "Mini_Round_Win"{kv}"#, mini_round_win),
        Rule::new(T::WMiniRoundLen, r#"World triggered "Mini_Round_Length"{kv}"#, mini_round_len),
        Rule::new(T::WRoundSetupBegin, r#"World triggered "Round_Setup_Begin""#, round_setup_begin),
        Rule::new(
            T::WMiniRoundSelected,
            r#"World triggered "Mini_Round_Selected"{kv}"#,
            mini_round_selected,
        ),
        Rule::new(T::WMiniRoundStart, r#"World triggered "Mini_Round_Start""#, mini_round_start),
        Rule::new(T::IgnoredMsg, r#"(?P<message>"(?:.+?)"\s=\s"(?:.*)")$"#, ignored),
        Rule::new(T::IgnoredMsg, r"(?P<message>server cvars (?:start|end).*)$", ignored),
        Rule::new(T::IgnoredMsg, r"(?P<message>\[META\].*)$", ignored),
        Rule::new(
            T::WIntermissionWinLimit,
            r#"Team\s"(?P<team>RED|BLUE)"\striggered\s"Intermission_Win_Limit"$"#,
            intermission_win_limit,
        ),
    ]
}

// ─── 생성자 ────────────────────────────────────────────────────────

fn world(f: &Fields) -> Result<WorldEvt, ParseError> {
    Ok(WorldEvt {
        created_on: f.date()?,
    })
}

fn player_evt(f: &Fields) -> Result<PlayerEvt, ParseError> {
    Ok(PlayerEvt {
        created_on: f.date()?,
        source: f.source()?,
    })
}

fn log_start(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::LogStart(LogStartEvt {
        created_on: f.date()?,
        file: f.text_or_default("file"),
        game: f.text_or_default("game"),
        version: f.text_or_default("version"),
    }))
}

fn log_stop(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::LogStop(world(f)?))
}

fn cvar(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Cvar(CvarEvt {
        created_on: f.date()?,
        cvar: f.text("cvar")?.to_owned(),
        value: f.text_or_default("value"),
    }))
}

fn rcon(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Rcon(RconEvt {
        created_on: f.date()?,
        ip: f.text("ip")?.to_owned(),
        cmd: f.text_or_default("cmd"),
    }))
}

fn shot(f: &Fields) -> Result<ShotEvt, ParseError> {
    Ok(ShotEvt {
        created_on: f.date()?,
        source: f.source()?,
        weapon: f.weapon(),
    })
}

fn shot_fired(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::ShotFired(shot(f)?))
}

fn shot_hit(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::ShotHit(shot(f)?))
}

fn damage(f: &Fields) -> Result<Event, ParseError> {
    let damage = f.num("damage")?;
    Ok(Event::Damage(DamageEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.opt_target()?,
        damage,
        real_damage: f.num_or("realdamage", damage)?,
        weapon: f.weapon(),
        healing: f.num_or("healing", 0)?,
        crit: f.get("crit").map(CritType::from_log_value).unwrap_or_default(),
        airshot: f.flag("airshot"),
        headshot: f.flag("headshot"),
    }))
}

fn killed(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Killed(KilledEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.target()?,
        weapon: f.weapon(),
        attacker_position: f.position("attacker_position")?,
        victim_position: f.position("victim_position")?,
    }))
}

fn killed_custom(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::KilledCustom(KilledCustomEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.target()?,
        weapon: f.weapon(),
        custom_kill: f.text("customkill")?.to_owned(),
        attacker_position: f.position("attacker_position")?,
        victim_position: f.position("victim_position")?,
    }))
}

fn healed(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Healed(HealedEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.target()?,
        healing: f.num("healing")?,
    }))
}

fn kill_assist(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::KillAssist(KillAssistEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.target()?,
        assister_position: f.position("assister_position")?,
        attacker_position: f.position("attacker_position")?,
        victim_position: f.position("victim_position")?,
    }))
}

fn pickup(f: &Fields) -> Result<Event, ParseError> {
    let item_name = f.text("item")?.to_owned();
    Ok(Event::Pickup(PickupEvt {
        created_on: f.date()?,
        source: f.source()?,
        item: PickupItem::from_log_name(&item_name),
        item_name,
        healing: f.num_or("healing", 0)?,
    }))
}

fn spawned_as(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::SpawnedAs(ClassEvt {
        created_on: f.date()?,
        source: f.source()?,
        class: f.text("class")?.parse()?,
    }))
}

fn change_class(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::ChangeClass(ClassEvt {
        created_on: f.date()?,
        source: f.source()?,
        class: f.text("class")?.parse()?,
    }))
}

fn validated(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Validated(player_evt(f)?))
}

fn entered(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Entered(player_evt(f)?))
}

fn connected(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Connected(ConnectedEvt {
        created_on: f.date()?,
        source: f.source()?,
        address: f.get("address").filter(|a| !a.is_empty()).map(str::to_owned),
        port: f.opt_num("port")?,
    }))
}

fn joined_team(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::JoinedTeam(JoinedTeamEvt {
        created_on: f.date()?,
        source: f.source()?,
        new_team: f.team("new_team")?,
    }))
}

fn suicide(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Suicide(SuicideEvt {
        created_on: f.date()?,
        source: f.source()?,
        weapon: f.weapon(),
        attacker_position: f.position("attacker_position")?,
    }))
}

fn charge_ready(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::ChargeReady(player_evt(f)?))
}

fn charge_deployed(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::ChargeDeployed(ChargeDeployedEvt {
        created_on: f.date()?,
        source: f.source()?,
        // 모르는 메디건 이름은 기본 우버로 취급
        medigun: f
            .get("medigun")
            .and_then(|m| m.parse().ok())
            .unwrap_or_default(),
    }))
}

fn charge_ended(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::ChargeEnded(ChargeEndedEvt {
        created_on: f.date()?,
        source: f.source()?,
        duration: f.num("duration")?,
    }))
}

fn domination(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Domination(DominationEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.target()?,
        assist: false,
    }))
}

fn revenge(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Revenge(DominationEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.target()?,
        assist: f.flag("assist"),
    }))
}

fn say_evt(f: &Fields) -> Result<SayEvt, ParseError> {
    Ok(SayEvt {
        created_on: f.date()?,
        source: f.source()?,
        msg: f.text_or_default("msg"),
    })
}

fn say(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Say(say_evt(f)?))
}

fn say_team(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::SayTeam(say_evt(f)?))
}

fn empty_uber(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::EmptyUber(player_evt(f)?))
}

fn lost_uber_adv(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::LostUberAdv(LostUberAdvEvt {
        created_on: f.date()?,
        source: f.source()?,
        time: f.num("time")?,
    }))
}

fn medic_death(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::MedicDeath(MedicDeathEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.target()?,
        healing: f.num_or("healing", 0)?,
        had_uber: f.flag("ubercharge"),
    }))
}

fn medic_death_ex(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::MedicDeathEx(MedicDeathExEvt {
        created_on: f.date()?,
        source: f.source()?,
        uber_pct: f.num("uberpct")?,
    }))
}

fn extinguished(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Extinguished(ExtinguishedEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.target()?,
        weapon: f.weapon(),
        attacker_position: f.position("attacker_position")?,
        victim_position: f.position("victim_position")?,
    }))
}

fn object_evt(f: &Fields) -> Result<ObjectEvt, ParseError> {
    Ok(ObjectEvt {
        created_on: f.date()?,
        source: f.source()?,
        object: f.text_or_default("object"),
        position: f.position("position")?,
    })
}

fn built_object(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::BuiltObject(object_evt(f)?))
}

fn carry_object(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::CarryObject(object_evt(f)?))
}

fn drop_object(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::DropObject(object_evt(f)?))
}

fn detonated_object(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::DetonatedObject(object_evt(f)?))
}

fn killed_object(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::KilledObject(KilledObjectEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.opt_target()?,
        object: f.text_or_default("object"),
        weapon: f.weapon(),
        attacker_position: f.position("attacker_position")?,
    }))
}

fn first_heal_after_spawn(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::FirstHealAfterSpawn(FirstHealAfterSpawnEvt {
        created_on: f.date()?,
        source: f.source()?,
        time: f.num("time")?,
    }))
}

/// 점령 인원 최대치
const MAX_CAPPERS: usize = 5;

fn point_captured(f: &Fields) -> Result<Event, ParseError> {
    let mut players = Vec::new();
    for i in 1..=MAX_CAPPERS {
        let Some(raw) = f.get(&format!("player{i}")) else {
            continue;
        };
        players.push(CapturePlayer {
            player: token::parse_player_token(raw)?,
            position: f.position(&format!("position{i}"))?,
        });
    }

    Ok(Event::PointCaptured(PointCapturedEvt {
        created_on: f.date()?,
        team: f.team("team")?,
        cp: f.num("cp")?,
        cp_name: f.text_or_default("cpname"),
        num_cappers: f.num_or("numcappers", players.len() as i32)?,
        players,
    }))
}

fn capture_blocked(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::CaptureBlocked(CaptureBlockedEvt {
        created_on: f.date()?,
        source: f.source()?,
        cp: f.num("cp")?,
        cp_name: f.text_or_default("cpname"),
        position: f.position("position")?,
    }))
}

fn disconnected(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::Disconnected(DisconnectedEvt {
        created_on: f.date()?,
        source: f.source()?,
        reason: f.text_or_default("reason"),
    }))
}

fn round_overtime(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WRoundOvertime(world(f)?))
}

fn round_start(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WRoundStart(world(f)?))
}

fn round_win(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WRoundWin(RoundWinEvt {
        created_on: f.date()?,
        winner: f.team("winner")?,
    }))
}

fn round_len(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WRoundLen(RoundLenEvt {
        created_on: f.date()?,
        seconds: f.num("seconds")?,
    }))
}

fn game_over(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WGameOver(GameOverEvt {
        created_on: f.date()?,
        reason: f.text_or_default("reason"),
    }))
}

fn team_score_evt(f: &Fields) -> Result<TeamScoreEvt, ParseError> {
    Ok(TeamScoreEvt {
        created_on: f.date()?,
        team: f.team("team")?,
        score: f.num("score")?,
        players: f.num("players")?,
    })
}

fn team_score(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WTeamScore(team_score_evt(f)?))
}

fn team_final_score(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WTeamFinalScore(team_score_evt(f)?))
}

fn paused(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WPaused(world(f)?))
}

fn resumed(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WResumed(world(f)?))
}

fn map_load(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::MapLoad(MapEvt {
        created_on: f.date()?,
        map: f.text("map")?.to_owned(),
    }))
}

fn map_started(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::MapStarted(MapEvt {
        created_on: f.date()?,
        map: f.text("map")?.to_owned(),
    }))
}

fn server_config_exec(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::ServerConfigExec(ServerConfigExecEvt {
        created_on: f.date()?,
        config: f.text_or_default("config"),
    }))
}

fn steam_auth(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::SteamAuth(SteamAuthEvt {
        created_on: f.date()?,
        reason: f.text_or_default("reason"),
    }))
}

fn throwable(f: &Fields) -> Result<ThrowableAttackEvt, ParseError> {
    Ok(ThrowableAttackEvt {
        created_on: f.date()?,
        source: f.source()?,
        target: f.target()?,
        weapon: f.weapon(),
        attacker_position: f.position("attacker_position")?,
        victim_position: f.position("victim_position")?,
    })
}

fn jarate_attack(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::JarateAttack(throwable(f)?))
}

fn milk_attack(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::MilkAttack(throwable(f)?))
}

fn gas_attack(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::GasAttack(throwable(f)?))
}

fn mini_round_win(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WMiniRoundWin(MiniRoundWinEvt {
        created_on: f.date()?,
        winner: f.team("winner")?,
        round: f.text_or_default("round"),
    }))
}

fn mini_round_len(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WMiniRoundLen(RoundLenEvt {
        created_on: f.date()?,
        seconds: f.num("seconds")?,
    }))
}

fn round_setup_begin(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WRoundSetupBegin(world(f)?))
}

fn mini_round_selected(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WMiniRoundSelected(MiniRoundSelectedEvt {
        created_on: f.date()?,
        round: f.text_or_default("round"),
    }))
}

fn mini_round_start(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WMiniRoundStart(world(f)?))
}

fn ignored(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::IgnoredMsg(IgnoredMsgEvt {
        created_on: f.date()?,
        message: f.text_or_default("message"),
    }))
}

fn intermission_win_limit(f: &Fields) -> Result<Event, ParseError> {
    Ok(Event::WIntermissionWinLimit(IntermissionWinLimitEvt {
        created_on: f.date()?,
        team: f.team("team")?,
    }))
}
