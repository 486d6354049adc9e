//! 라인 파서 -- 우선순위 순서의 정규식 디스패치
//!
//! [`LineParser`]는 [`rules`] 테이블의 모든 패턴을 하나의 [`RegexSet`]으로 묶어
//! 한 번에 후보를 찾고, 가장 앞선(가장 구체적인) 패턴으로 캡처를 수행합니다.
//! 캡처 결과는 [`Fields`]로 모여 패턴별 생성자가 타입 이벤트로 변환합니다.
//!
//! # 사용 예시
//! ```
//! use srcstat_log_pipeline::event::EventType;
//! use srcstat_log_pipeline::parser::LineParser;
//!
//! let parser = LineParser::new().unwrap();
//! let result = parser
//!     .parse(r#"L 02/21/2021 - 06:22:24: rcon from "23.239.22.163:42004": command "status""#)
//!     .unwrap();
//! assert_eq!(result.event_type, EventType::Rcon);
//! ```

pub mod fields;
pub mod rules;
pub mod token;

pub use fields::{Fields, KvExtractor};
pub use token::{parse_date, parse_player_token};

use std::collections::HashMap;

use regex::{Regex, RegexSet};

use crate::error::{LogPipelineError, ParseError};
use crate::event::{Event, EventType, IgnoredMsgEvt, ParseResult, UnknownMsgEvt};
use rules::{BuildFn, PREFIX};

struct CompiledRule {
    event_type: EventType,
    regex: Regex,
    build: BuildFn,
}

/// 로그 라인 파서
///
/// 내부 상태는 컴파일된 정규식뿐이므로 `Arc`로 여러 태스크가 공유할 수 있습니다.
/// 같은 입력에는 항상 같은 결과를 돌려줍니다.
pub struct LineParser {
    prefix: Regex,
    set: RegexSet,
    rules: Vec<CompiledRule>,
    kv: KvExtractor,
}

impl LineParser {
    /// 패턴 테이블을 컴파일합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        let table = rules::rules();
        let patterns: Vec<String> = table.iter().map(|r| r.pattern()).collect();

        let set = RegexSet::new(&patterns)?;
        let compiled = table
            .iter()
            .zip(&patterns)
            .map(|(rule, pattern)| {
                Ok(CompiledRule {
                    event_type: rule.event_type,
                    regex: Regex::new(pattern)?,
                    build: rule.build,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        tracing::debug!(rules = compiled.len(), "line parser compiled");

        Ok(Self {
            prefix: Regex::new(PREFIX)?,
            set,
            rules: compiled,
            kv: KvExtractor::new()?,
        })
    }

    /// 등록된 패턴 수
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// 라인 하나를 파싱합니다.
    ///
    /// 어떤 패턴에도 맞지 않는 라인은 에러가 아니라 `IgnoredMsg`(접두어 유효) 또는
    /// `UnknownMsg`(접두어도 없음)로 반환됩니다. 패턴에 맞았지만 날짜/숫자/좌표
    /// 필드가 잘못된 경우에만 [`ParseError`]를 반환합니다.
    pub fn parse(&self, line: &str) -> Result<ParseResult, ParseError> {
        let line = line.trim_end_matches(['\r', '\n', '\0']);

        let Some(index) = self.set.matches(line).iter().next() else {
            return self.fallback(line);
        };
        let rule = &self.rules[index];
        let Some(caps) = rule.regex.captures(line) else {
            return self.fallback(line);
        };

        let mut values = HashMap::new();
        for name in rule.regex.capture_names().flatten() {
            if let Some(m) = caps.name(name) {
                values.insert(name.to_owned(), m.as_str().to_owned());
            }
        }
        if let Some(pairs) = values.remove("keypairs") {
            self.kv.extend_into(&pairs, &mut values);
        }

        let mut fields = Fields::new(values);
        fields.normalize();

        let event = (rule.build)(&fields)?;
        Ok(ParseResult {
            event_type: rule.event_type,
            event,
        })
    }

    fn fallback(&self, line: &str) -> Result<ParseResult, ParseError> {
        let event = match self.prefix.captures(line) {
            Some(caps) => {
                let created_on = caps
                    .name("created_on")
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                let rest = caps.get(0).map_or(line, |m| &line[m.end()..]);
                Event::IgnoredMsg(IgnoredMsgEvt {
                    created_on: parse_date(created_on)?,
                    message: rest.to_owned(),
                })
            }
            None => Event::UnknownMsg(UnknownMsgEvt {
                message: line.to_owned(),
            }),
        };
        Ok(ParseResult::new(event))
    }
}

impl std::fmt::Debug for LineParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineParser")
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    fn parser() -> LineParser {
        LineParser::new().unwrap()
    }

    #[test]
    fn log_start_fields() {
        let result = parser()
            .parse(r#"L 02/21/2021 - 06:22:23: Log file started (file "logs/L0221034.log") (game "/home/tf2server/serverfiles/tf") (version "6300758")"#)
            .unwrap();
        assert_eq!(result.event_type, EventType::LogStart);
        let Event::LogStart(evt) = result.event else {
            panic!("wrong payload: {:?}", result.event);
        };
        assert_eq!(evt.file, "logs/L0221034.log");
        assert_eq!(evt.game, "/home/tf2server/serverfiles/tf");
        assert_eq!(evt.version, "6300758");
    }

    #[test]
    fn rcon_command() {
        let result = parser()
            .parse(r#"L 02/21/2021 - 06:22:24: rcon from "23.239.22.163:42004": command "status""#)
            .unwrap();
        assert_eq!(result.event_type, EventType::Rcon);
        let Event::Rcon(evt) = result.event else {
            panic!("wrong payload");
        };
        assert_eq!(evt.cmd, "status");
        assert_eq!(evt.ip, "23.239.22.163:42004");
    }

    #[test]
    fn unmatched_with_prefix_is_ignored() {
        let result = parser().parse("L 02/21/2021 - 06:22:23: asdf").unwrap();
        assert_eq!(result.event_type, EventType::IgnoredMsg);
        let Event::IgnoredMsg(evt) = result.event else {
            panic!("wrong payload");
        };
        assert_eq!(evt.message, "asdf");
    }

    #[test]
    fn garbage_is_unknown() {
        let result = parser().parse("definitely not a log line").unwrap();
        assert_eq!(result.event_type, EventType::UnknownMsg);
        assert_eq!(result.event.created_on(), None);
    }

    #[test]
    fn bad_date_in_prefix_fails_line() {
        let err = parser()
            .parse(r#"L 99/99/2021 - 06:22:23: World triggered "Round_Start""#)
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { .. }));
    }

    #[test]
    fn damage_with_empty_weapon_keeps_real_damage() {
        let result = parser()
            .parse(r#"L 02/21/2021 - 06:24:01: "A<1><[U:1:1]><Red>" triggered "damage" against "B<2><[U:1:2]><Blue>" (damage "27") (weapon "") (realdamage "20")"#)
            .unwrap();
        let Event::Damage(evt) = result.event else {
            panic!("wrong payload: {:?}", result.event);
        };
        assert_eq!((evt.damage, evt.real_damage), (27, 20));
    }

    #[test]
    fn oversized_steam_id2_fails_line() {
        let err = parser()
            .parse(r#"L 02/21/2021 - 06:22:23: "x<1><STEAM_0:0:18446744073709551615><Red>" say "hi""#)
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidSteamId { .. }));
    }

    #[test]
    fn trailing_line_terminator_ignored() {
        let p = parser();
        let plain = p.parse(r#"L 02/21/2021 - 06:23:11: World triggered "Round_Start""#).unwrap();
        let crlf = p
            .parse("L 02/21/2021 - 06:23:11: World triggered \"Round_Start\"\r\n")
            .unwrap();
        assert_eq!(plain, crlf);
        assert_eq!(plain.event_type, EventType::WRoundStart);
    }

    #[test]
    fn setup_end_maps_to_round_start() {
        let result = parser()
            .parse(r#"L 02/21/2021 - 06:23:11: World triggered "Round_Setup_End""#)
            .unwrap();
        assert_eq!(result.event_type, EventType::WRoundStart);
    }

    #[test]
    fn declared_type_always_matches_payload() {
        let p = parser();
        for line in [
            r#"L 02/21/2021 - 06:29:49: World triggered "Round_Win" (winner "Red")"#,
            r#"L 02/21/2021 - 06:22:23: "sv_cheats" = "0""#,
            "L 02/21/2021 - 06:42:33: [META] Loaded 0 plugins (1 already loaded)",
            r#"L 02/21/2021 - 06:42:13: Team "RED" triggered "Intermission_Win_Limit""#,
        ] {
            let result = p.parse(line).unwrap();
            assert!(result.is_consistent(), "{line}");
        }
    }
}
