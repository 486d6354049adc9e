//! 토큰 서브 파서
//!
//! 로그 라인 안에서 반복되는 작은 조각(날짜, 플레이어 토큰)을 타입 값으로 변환합니다.
//! 모든 함수는 순수 함수이며 패닉하지 않습니다.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::ParseError;
use crate::event::SourcePlayer;
use crate::types::{SteamId, Team};

/// 로그 타임스탬프 형식 (`MM/DD/YYYY - HH:MM:SS`)
pub const LOG_DATE_FORMAT: &str = "%m/%d/%Y - %H:%M:%S";

/// 로그 타임스탬프를 UTC 시각으로 해석합니다.
///
/// 실패하면 `InvalidDate`를 반환합니다. 현재 시각으로 대체하지 않습니다.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), LOG_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ParseError::InvalidDate {
            value: value.to_owned(),
        })
}

/// 플레이어 토큰의 원시 구성 요소
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerParts<'a> {
    pub name: &'a str,
    pub pid: &'a str,
    pub sid: &'a str,
    pub team: &'a str,
}

/// `Name<Index><SteamID><Team>` 토큰을 구성 요소로 나눕니다.
///
/// 이름에 `<`가 들어갈 수 있으므로 오른쪽부터 자릅니다. 양끝 따옴표는 무시합니다.
pub fn split_player_token(token: &str) -> Option<PlayerParts<'_>> {
    let token = token.trim().trim_matches('"');
    let body = token.strip_suffix('>')?;

    let mut fields = body.rsplitn(3, "><");
    let team = fields.next()?;
    let sid = fields.next()?;
    let head = fields.next()?;
    let (name, pid) = head.rsplit_once('<')?;

    if name.is_empty() || pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(PlayerParts {
        name,
        pid,
        sid,
        team,
    })
}

/// 구성 요소로부터 플레이어를 만듭니다.
pub fn player_from_parts(parts: PlayerParts<'_>) -> Result<SourcePlayer, ParseError> {
    let pid = parts
        .pid
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidNumber {
            field: "pid".to_owned(),
            value: parts.pid.to_owned(),
        })?;
    let sid: SteamId = parts.sid.parse()?;
    let team: Team = parts.team.parse()?;

    Ok(SourcePlayer {
        name: parts.name.to_owned(),
        pid,
        sid,
        team,
        bot: sid.is_bot(),
    })
}

/// 플레이어 토큰 전체를 파싱합니다.
pub fn parse_player_token(token: &str) -> Result<SourcePlayer, ParseError> {
    let parts = split_player_token(token).ok_or_else(|| ParseError::InvalidToken {
        field: "player",
        value: token.to_owned(),
    })?;
    player_from_parts(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn date_is_utc() {
        let ts = parse_date("02/21/2021 - 06:22:23").unwrap();
        assert_eq!(ts.year(), 2021);
        assert_eq!(ts.month(), 2);
        assert_eq!(ts.day(), 21);
        assert_eq!(ts.hour(), 6);
        assert_eq!(ts.minute(), 22);
        assert_eq!(ts.second(), 23);
    }

    #[test]
    fn bad_date_is_an_error() {
        for value in ["", "2021-02-21 06:22:23", "13/40/2021 - 06:22:23", "02/21/2021"] {
            assert!(
                matches!(parse_date(value), Err(ParseError::InvalidDate { .. })),
                "{value:?} should fail"
            );
        }
    }

    #[test]
    fn split_handles_angle_brackets_in_name() {
        let parts = split_player_token("\"<<cool>><3<12><[U:1:68745073]><Red>\"").unwrap();
        assert_eq!(parts.name, "<<cool>><3");
        assert_eq!(parts.pid, "12");
        assert_eq!(parts.sid, "[U:1:68745073]");
        assert_eq!(parts.team, "Red");
    }

    #[test]
    fn player_token_with_empty_team() {
        let player = parse_player_token("Hacksaw<12><[U:1:68745073]><>").unwrap();
        assert_eq!(player.name, "Hacksaw");
        assert_eq!(player.pid, 12);
        assert_eq!(player.sid, SteamId::from_account_id(68_745_073));
        assert_eq!(player.team, Team::Unassigned);
        assert!(!player.bot);
    }

    #[test]
    fn bot_token_sets_flag() {
        let player = parse_player_token("Numbers<3><BOT><Blue>").unwrap();
        assert!(player.bot);
        assert!(player.sid.is_bot());
        assert_eq!(player.team, Team::Blu);
    }

    #[test]
    fn malformed_tokens_fail() {
        assert!(parse_player_token("no brackets").is_err());
        assert!(parse_player_token("Name<x><[U:1:1]><Red>").is_err());
        assert!(parse_player_token("Name<1><garbage><Red>").is_err());
        assert!(parse_player_token("Name<1><[U:1:1]><Purple>").is_err());
    }
}
