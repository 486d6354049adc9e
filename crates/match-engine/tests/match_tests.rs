//! 통합 테스트 -- 파싱된 로그를 매치에 적용한 집계 결과 검증

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use tokio::sync::mpsc;

use srcstat_core::config::MatchConfig;
use srcstat_core::pipeline::Pipeline;
use srcstat_log_pipeline::event::*;
use srcstat_log_pipeline::types::Position;
use srcstat_log_pipeline::{LineParser, PlayerClass, SteamId, Team, Weapon};
use srcstat_match_engine::{Match, MatchEngineBuilder, MatchError, MatchState};

const EXAMPLE_LOG: &str = r##"L 02/21/2021 - 06:22:23: asdf
L 02/21/2021 - 06:22:23: Log file started (file "logs/L0221034.log") (game "/home/tf2server/serverfiles/tf") (version "6300758")
L 02/21/2021 - 06:22:23: server_cvar: "sm_nextmap" "pl_frontier_final"
L 02/21/2021 - 06:22:24: RCON from "23.239.22.163:42004": command "status"
L 02/21/2021 - 06:22:31: "Hacksaw<12><[U:1:68745073]><>" Entered the game
L 02/21/2021 - 06:22:35: "Hacksaw<12><[U:1:68745073]><Unassigned>" joined team "Red"
L 02/21/2021 - 06:22:36: "Hacksaw<12><[U:1:68745073]><Red>" changed role to "scout"
L 02/21/2021 - 06:23:04: "Dzefersons14<8><[U:1:1080653073]><Blue>" committed Suicide with "world" (attacker_position "-1189 2513 -423")
L 02/21/2021 - 06:23:11: World triggered "Round_Start"
L 02/21/2021 - 06:23:44: "Desmos Calculator<10><[U:1:1132396177]><Red>" triggered "medic_death" against "Dzefersons14<8><[U:1:1080653073]><Blue>" (healing "135") (ubercharge "0")
L 02/21/2021 - 06:23:44: "Desmos Calculator<10><[U:1:1132396177]><Red>" Killed "Dzefersons14<8><[U:1:1080653073]><Blue>" with "spy_cicle" (customkill "backstab") (attacker_position "217 -54 -302") (victim_position "203 -2 -319")
L 02/21/2021 - 06:23:44: "Hacksaw<12><[U:1:68745073]><Red>" triggered "kill assist" against "Dzefersons14<8><[U:1:1080653073]><Blue>" (assister_position "-476 154 -254") (attacker_position "217 -54 -302") (victim_position "203 -2 -319")
L 02/21/2021 - 06:24:14: Team "Red" triggered "pointcaptured" (cp "0") (cpname "#koth_viaduct_cap") (numcappers "1") (player1 "Hacksaw<12><[U:1:68745073]><Red>") (position1 "101 98 -313")
L 02/21/2021 - 06:24:22: "amogus gaming<13><[U:1:1089803558]><>" Connected, address "139.47.95.130:47949"
L 02/21/2021 - 06:24:23: "amogus gaming<13><[U:1:1089803558]><>" STEAM USERID Validated
L 02/21/2021 - 06:26:33: "Desmos Calculator<10><[U:1:1132396177]><Red>" triggered "killedobject" (object "OBJ_SENTRYGUN") (weapon "obj_attachment_sapper") (objectowner "idk<9><[U:1:1170132017]><Blue>") (attacker_position "2 -579 -255")
L 02/21/2021 - 06:30:45: "idk<9><[U:1:1170132017]><Blue>" triggered "player_carryobject" (object "OBJ_SENTRYGUN") (position "1074 -2279 -423")
L 02/21/2021 - 06:32:00: "idk<9><[U:1:1170132017]><Blue>" triggered "player_dropobject" (object "OBJ_SENTRYGUN") (position "339 -419 -255")
L 02/21/2021 - 06:32:30: "idk<9><[U:1:1170132017]><Blue>" triggered "player_builtobject" (object "OBJ_SENTRYGUN") (position "880 -152 -255")
L 02/21/2021 - 06:29:49: World triggered "Round_Win" (winner "Red")
L 02/21/2021 - 06:29:49: World triggered "Round_Length" (seconds "398.10")
L 02/21/2021 - 06:29:49: Team "Red" current score "1" with "2" players
L 02/21/2021 - 06:29:57: "Hacksaw<12><[U:1:68745073]><Red>" Say "gg"
L 02/21/2021 - 06:29:59: "Desmos Calculator<10><[U:1:1132396177]><Red>" say_team "gg"
L 02/21/2021 - 06:33:41: "Desmos Calculator<10><[U:1:1132396177]><Red>" triggered "Domination" against "Dzefersons14<8><[U:1:1080653073]><Blue>"
L 02/21/2021 - 06:33:43: "Cybermorphic<15><[U:1:901503117]><Unassigned>" Disconnected (reason "Disconnect by user.")
L 02/21/2021 - 06:35:37: "Dzefersons14<8><[U:1:1080653073]><Blue>" triggered "Revenge" against "Desmos Calculator<10><[U:1:1132396177]><Red>"
L 02/21/2021 - 06:37:20: World triggered "Round_Overtime"
L 02/21/2021 - 06:40:19: "potato<16><[U:1:385661040]><Red>" triggered "captureblocked" (cp "0") (cpname "#koth_viaduct_cap") (position "-163 324 -272")
L 02/21/2021 - 06:42:13: World triggered "Game_Over" reason "Reached Win Limit"
L 02/21/2021 - 06:42:13: Team "Red" final score "2" with "3" players
L 02/21/2021 - 06:42:13: Team "RED" triggered "Intermission_Win_Limit"
L 02/21/2021 - 06:42:33: [META] Loaded 0 plugins (1 already loaded)
L 02/21/2021 - 06:42:33: Log file closed."##;

const HACKSAW: u32 = 68_745_073;
const DZEFERSONS: u32 = 1_080_653_073;
const DESMOS: u32 = 1_132_396_177;
const IDK: u32 = 1_170_132_017;
const POTATO: u32 = 385_661_040;
const CYBERMORPHIC: u32 = 901_503_117;

fn sid(account: u32) -> SteamId {
    SteamId::from_account_id(account)
}

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_613_888_543 + secs, 0).unwrap()
}

fn player(account: u32, team: Team) -> SourcePlayer {
    SourcePlayer {
        name: format!("p{account}"),
        pid: account,
        sid: sid(account),
        team,
        bot: false,
    }
}

fn killed(a: &SourcePlayer, b: &SourcePlayer) -> ParseResult {
    ParseResult::new(Event::Killed(KilledEvt {
        created_on: ts(20),
        source: a.clone(),
        target: b.clone(),
        weapon: Weapon::Scattergun,
        attacker_position: Position::default(),
        victim_position: Position::default(),
    }))
}

fn joined(p: &SourcePlayer) -> ParseResult {
    ParseResult::new(Event::JoinedTeam(JoinedTeamEvt {
        created_on: ts(0),
        source: SourcePlayer {
            team: Team::Unassigned,
            ..p.clone()
        },
        new_team: p.team,
    }))
}

fn round_start() -> ParseResult {
    ParseResult::new(Event::WRoundStart(WorldEvt { created_on: ts(10) }))
}

fn round_win(winner: Team) -> ParseResult {
    ParseResult::new(Event::WRoundWin(RoundWinEvt {
        created_on: ts(100),
        winner,
    }))
}

fn replay(log: &str) -> (Match, Vec<MatchError>) {
    let parser = LineParser::new().unwrap();
    let mut m = Match::new(1, "example", true);
    let mut errors = Vec::new();
    for line in log.lines() {
        let result = parser.parse(line).unwrap();
        if let Err(e) = m.apply(&result) {
            errors.push(e);
        }
    }
    (m, errors)
}

// ─── 시나리오 ──────────────────────────────────────────────────────

#[test]
fn kill_inside_round_is_counted() {
    let a = player(1, Team::Red);
    let b = player(2, Team::Blu);
    let mut m = Match::new(1, "scenario", true);

    for step in [
        joined(&a),
        joined(&b),
        round_start(),
        killed(&a, &b),
        round_win(Team::Red),
    ] {
        m.apply(&step).unwrap();
    }

    assert_eq!(m.rounds().len(), 1);
    assert_eq!(m.rounds()[0].winner, Some(Team::Red));
    assert_eq!(m.player(a.sid).unwrap().kills, 1);
    assert_eq!(m.player(b.sid).unwrap().deaths, 1);
    assert_eq!(m.team(Team::Red).unwrap().kills, 1);
    assert_eq!(m.state(), MatchState::BetweenRounds);
}

#[test]
fn kill_before_first_round_is_ignored() {
    let a = player(1, Team::Red);
    let b = player(2, Team::Blu);
    let mut m = Match::new(1, "warmup", true);
    m.apply(&joined(&a)).unwrap();
    m.apply(&joined(&b)).unwrap();

    assert_eq!(
        m.apply(&killed(&a, &b)),
        Err(MatchError::Ignored(EventType::Killed))
    );

    assert_eq!(m.player(a.sid).unwrap().kills, 0);
    assert_eq!(m.player(b.sid).unwrap().deaths, 0);
    assert!(m.team(Team::Red).is_none());
    assert!(m.rounds().is_empty());
}

#[test]
fn kill_between_rounds_is_ignored() {
    let a = player(1, Team::Red);
    let b = player(2, Team::Blu);
    let mut m = Match::new(1, "humiliation", true);
    m.apply(&round_start()).unwrap();
    m.apply(&round_win(Team::Red)).unwrap();

    assert_eq!(
        m.apply(&killed(&a, &b)),
        Err(MatchError::Ignored(EventType::Killed))
    );

    assert!(m.player(a.sid).is_none());
    assert_eq!(m.rounds()[0].kills.red, 0);
}

// ─── 예제 로그 재생 ────────────────────────────────────────────────

#[test]
fn example_log_aggregates() {
    let (m, errors) = replay(EXAMPLE_LOG);

    assert_eq!(m.state(), MatchState::Over);
    assert_eq!(m.rounds().len(), 1);

    let round = &m.rounds()[0];
    assert_eq!(round.winner, Some(Team::Red));
    assert_eq!(round.length, Some(398.10));
    assert_eq!(round.mid_fight, Some(Team::Red));
    assert_eq!(round.kills.red, 1);
    // 최종 점수가 라운드 점수를 덮어씀
    assert_eq!(round.score.red, 2);

    let hacksaw = m.player(sid(HACKSAW)).unwrap();
    assert_eq!(hacksaw.team, Team::Red);
    assert_eq!(hacksaw.classes, vec![PlayerClass::Scout]);
    assert_eq!(hacksaw.assists, 1);
    assert_eq!(hacksaw.captures.len(), 1);
    assert_eq!(hacksaw.captures[0].cp_name, "#koth_viaduct_cap");
    // 라운드 시작 시각으로 채워짐
    assert_eq!(
        hacksaw.time_start,
        DateTime::parse_from_rfc3339("2021-02-21T06:23:11Z")
            .ok()
            .map(|t| t.with_timezone(&Utc))
    );
    assert!(hacksaw.time_end.is_some());
    assert_eq!(
        m.class_kill_assists(sid(HACKSAW)).unwrap().get(PlayerClass::Scout),
        1
    );

    let desmos = m.player(sid(DESMOS)).unwrap();
    assert_eq!((desmos.kills, desmos.backstabs), (1, 1));
    assert_eq!(desmos.buildings_destroyed, 1);
    assert_eq!(desmos.weapons[&Weapon::Spycicle].kills, 1);
    // 라운드 종료 후 도미네이션은 집계하지 않음
    assert_eq!(desmos.dominations, 0);

    let dzefersons = m.player(sid(DZEFERSONS)).unwrap();
    assert_eq!(dzefersons.deaths, 1);
    // 워밍업 중 자살은 집계하지 않음
    assert_eq!(dzefersons.suicides, 0);
    assert_eq!(dzefersons.revenges, 0);

    let idk = m.player(sid(IDK)).unwrap();
    assert_eq!(
        (idk.buildings_carried, idk.buildings_dropped, idk.buildings_built),
        (1, 1, 1)
    );

    assert!(m.player(sid(POTATO)).is_none());
    assert!(m.player(sid(CYBERMORPHIC)).is_none());

    let red = m.team(Team::Red).unwrap();
    assert_eq!((red.kills, red.caps, red.mid_fights), (1, 1, 1));

    assert_eq!(m.chat().len(), 2);
    assert!(m.chat()[1].team_only);

    // 서버 잡음과 라운드 밖 게임플레이는 Ignored, 미분류 라인은 없음
    assert!(errors.iter().all(|e| matches!(e, MatchError::Ignored(_))));
    assert_eq!(errors.len(), 12);
    for skipped in [
        EventType::Suicide,
        EventType::Domination,
        EventType::Revenge,
        EventType::CaptureBlocked,
    ] {
        assert!(errors.contains(&MatchError::Ignored(skipped)), "{skipped}");
    }
}

#[test]
fn example_log_summary() {
    let (m, _) = replay(EXAMPLE_LOG);
    let summary = m.summary();

    assert_eq!(summary.winner(), Some(Team::Red));
    assert_eq!(summary.final_score.red, 2);
    assert_eq!(summary.players[0].steam_id, "[U:1:1132396177]");
    assert_eq!(summary.players[0].kills, 1);
    assert_eq!(summary.player_count, m.player_count());
    assert_eq!(summary.kills, m.players().map(|p| p.kills).sum::<u32>());
    assert_eq!(summary.damage, m.players().map(|p| p.damage).sum::<i64>());

    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"state\":\"Over\""));
}

// ─── 엔진 ──────────────────────────────────────────────────────────

#[tokio::test]
async fn engine_emits_completed_match_per_server() {
    let (tx, rx) = mpsc::channel(64);
    let (mut engine, mut completed_rx) = MatchEngineBuilder::new()
        .config(MatchConfig {
            use_real_dmg: Some(true),
            ..MatchConfig::default()
        })
        .event_receiver(rx)
        .build()
        .unwrap();
    engine.start().await.unwrap();

    let parser = LineParser::new().unwrap();
    let server = std::sync::Arc::new(ServerIdentity {
        server_id: 42,
        server_name: "koth".to_owned(),
    });
    for line in EXAMPLE_LOG.lines() {
        tx.send(ServerEvent {
            server: server.clone(),
            result: parser.parse(line).unwrap(),
        })
        .await
        .unwrap();
    }

    let done = tokio::time::timeout(std::time::Duration::from_secs(5), completed_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.summary.server_id, 42);
    assert_eq!(done.summary.title, "koth");
    assert_eq!(done.detail.rounds().len(), 1);

    engine.stop().await.unwrap();
}

// ─── 속성 테스트 ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Step {
    Start,
    Win,
    Kill(usize, usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => Just(Step::Start),
        1 => Just(Step::Win),
        6 => (0usize..4, 0usize..4).prop_map(|(a, b)| Step::Kill(a, b)),
    ]
}

proptest! {
    #[test]
    fn kills_equal_kill_events_inside_rounds(steps in prop::collection::vec(step(), 0..64)) {
        let roster: Vec<SourcePlayer> = (0..4u32)
            .map(|i| player(i + 1, if i % 2 == 0 { Team::Red } else { Team::Blu }))
            .collect();
        let mut m = Match::new(1, "prop", true);
        let mut in_round = false;
        let mut expected = 0u32;
        let mut expected_red = 0i64;

        for s in &steps {
            match s {
                Step::Start => {
                    m.apply(&round_start()).unwrap();
                    in_round = true;
                }
                Step::Win => {
                    m.apply(&round_win(Team::Blu)).unwrap();
                    in_round = false;
                }
                Step::Kill(a, b) => {
                    let applied = m.apply(&killed(&roster[*a], &roster[*b]));
                    if !in_round {
                        prop_assert_eq!(applied, Err(MatchError::Ignored(EventType::Killed)));
                    } else {
                        prop_assert!(applied.is_ok());
                        expected += 1;
                        if roster[*a].team == Team::Red {
                            expected_red += 1;
                        }
                    }
                }
            }
        }

        let kills: u32 = m.players().map(|p| p.kills).sum();
        let deaths: u32 = m.players().map(|p| p.deaths).sum();
        let round_red: i64 = m.rounds().iter().map(|r| r.kills.red).sum();
        prop_assert_eq!(kills, expected);
        prop_assert_eq!(deaths, expected);
        prop_assert_eq!(round_red, expected_red);
    }

    #[test]
    fn warmup_kills_never_count(kills in prop::collection::vec((0usize..4, 0usize..4), 0..32)) {
        let roster: Vec<SourcePlayer> = (0..4u32).map(|i| player(i + 1, Team::Red)).collect();
        let mut m = Match::new(1, "warmup", false);
        for (a, b) in kills {
            prop_assert_eq!(
                m.apply(&killed(&roster[a], &roster[b])),
                Err(MatchError::Ignored(EventType::Killed))
            );
        }
        prop_assert_eq!(m.player_count(), 0);
        prop_assert!(m.rounds().is_empty());
    }
}
