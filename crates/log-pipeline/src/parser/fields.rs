//! 캡처 필드 맵과 키/값 추출기
//!
//! 패턴의 이름 있는 그룹과 `(key "value")` 쌍을 하나의 문자열 맵으로 모은 뒤,
//! 이벤트 생성자가 타입별 접근자로 값을 꺼내 씁니다.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::ParseError;
use crate::event::{SourcePlayer, TargetPlayer};
use crate::parser::token::{self, PlayerParts};
use crate::types::{Position, Team};
use crate::weapon::Weapon;

/// `(key "value")` 쌍 패턴
const KV_PATTERN: &str = r#"\((?P<key>.+?)\s+"(?P<value>[^"]*)"\)"#;

/// 키/값 쌍 추출기
///
/// 이벤트 타입과 무관한 범용 도우미입니다. 알려지지 않은 키도 그대로 수집하므로
/// 엔진이 새 필드를 추가해도 파서 수정 없이 맵에서 꺼낼 수 있습니다.
#[derive(Debug, Clone)]
pub struct KvExtractor {
    rx: Regex,
}

impl KvExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            rx: Regex::new(KV_PATTERN)?,
        })
    }

    /// 텍스트에서 모든 쌍을 등장 순서대로 반환합니다.
    pub fn pairs<'t>(&self, text: &'t str) -> impl Iterator<Item = (&'t str, &'t str)> {
        self.rx.captures_iter(text).filter_map(|caps| {
            let key = caps.name("key")?.as_str();
            let value = caps.name("value")?.as_str();
            Some((key, value))
        })
    }

    /// 텍스트의 쌍을 맵에 추가합니다. 이미 있는 키는 덮어쓰지 않습니다.
    pub fn extend_into(&self, text: &str, out: &mut HashMap<String, String>) {
        for (key, value) in self.pairs(text) {
            out.entry(key.to_owned())
                .or_insert_with(|| value.to_owned());
        }
    }
}

/// 한 라인에서 캡처한 문자열 필드
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    values: HashMap<String, String>,
}

impl Fields {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// 특수 키를 정규화합니다.
    ///
    /// - `objectowner`: 플레이어 토큰을 `name2`/`pid2`/`sid2`/`team2`로 분해
    /// - `address`: `ip:port`를 `address`와 `port`로 분리
    /// - `reason`: 줄바꿈이 섞인 사유 끝의 `")` 제거
    pub fn normalize(&mut self) {
        if let Some(owner) = self.values.get("objectowner").cloned()
            && let Some(PlayerParts {
                name,
                pid,
                sid,
                team,
            }) = token::split_player_token(&owner)
        {
            for (key, value) in [("name2", name), ("pid2", pid), ("sid2", sid), ("team2", team)] {
                self.values.insert(key.to_owned(), value.to_owned());
            }
        }

        if let Some(address) = self.values.get("address").cloned()
            && let Some((ip, port)) = address.rsplit_once(':')
        {
            self.values.insert("address".to_owned(), ip.to_owned());
            self.values.insert("port".to_owned(), port.to_owned());
        }

        if let Some(reason) = self.values.get_mut("reason") {
            let trimmed = reason.trim_end_matches(['\r', '\n']);
            let trimmed = trimmed.strip_suffix("\")").unwrap_or(trimmed);
            *reason = trimmed.to_owned();
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 모든 필드 (키 순서 무관)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 필수 문자열 필드
    pub fn text(&self, key: &str) -> Result<&str, ParseError> {
        self.get(key).ok_or_else(|| ParseError::MissingField {
            field: key.to_owned(),
        })
    }

    pub fn text_or_default(&self, key: &str) -> String {
        self.get(key).map(str::to_owned).unwrap_or_default()
    }

    /// 필수 숫자 필드
    pub fn num<T: FromStr>(&self, key: &str) -> Result<T, ParseError> {
        let raw = self.text(key)?;
        parse_number(key, raw)
    }

    /// 없으면 `default`, 있으나 잘못된 값이면 에러
    pub fn num_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, ParseError> {
        Ok(self.opt_num(key)?.unwrap_or(default))
    }

    pub fn opt_num<T: FromStr>(&self, key: &str) -> Result<Option<T>, ParseError> {
        self.get(key).map(|raw| parse_number(key, raw)).transpose()
    }

    /// 좌표 필드. 없으면 원점, 형식이 틀리면 `InvalidPosition`.
    pub fn position(&self, key: &str) -> Result<Position, ParseError> {
        match self.get(key) {
            Some(raw) => raw.parse(),
            None => Ok(Position::default()),
        }
    }

    /// `"1"`이면 참
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }

    /// `weapon` 필드. 없거나 모르는 이름이면 `UnknownWeapon`.
    pub fn weapon(&self) -> Weapon {
        self.get("weapon")
            .map(Weapon::from_log_name)
            .unwrap_or(Weapon::UnknownWeapon)
    }

    /// 팀 필드. 없으면 `Unassigned`.
    pub fn team(&self, key: &str) -> Result<Team, ParseError> {
        match self.get(key) {
            Some(raw) => raw.parse(),
            None => Ok(Team::Unassigned),
        }
    }

    /// `created_on`
    pub fn date(&self) -> Result<DateTime<Utc>, ParseError> {
        token::parse_date(self.text("created_on")?)
    }

    /// 행위자 (`name`/`pid`/`sid`/`team`)
    pub fn source(&self) -> Result<SourcePlayer, ParseError> {
        self.player("")
    }

    /// 대상 (`name2`/`pid2`/`sid2`/`team2`)
    pub fn target(&self) -> Result<TargetPlayer, ParseError> {
        self.player("2")
    }

    /// 대상이 있을 때만 파싱합니다.
    pub fn opt_target(&self) -> Result<Option<TargetPlayer>, ParseError> {
        if self.contains("name2") {
            self.target().map(Some)
        } else {
            Ok(None)
        }
    }

    fn player(&self, suffix: &str) -> Result<SourcePlayer, ParseError> {
        let name_key = format!("name{suffix}");
        let pid_key = format!("pid{suffix}");
        let sid_key = format!("sid{suffix}");
        let team_key = format!("team{suffix}");

        token::player_from_parts(PlayerParts {
            name: self.text(&name_key)?,
            pid: self.text(&pid_key)?,
            sid: self.text(&sid_key)?,
            team: self.get(&team_key).unwrap_or(""),
        })
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::InvalidNumber {
        field: key.to_owned(),
        value: raw.to_owned(),
    })
}
