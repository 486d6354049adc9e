#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use srcstat_log_pipeline::LineParser;
use srcstat_match_engine::Match;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    use_real_dmg: bool,
    /// 로그 접두어 뒤에 붙는 본문
    bodies: Vec<String>,
}

fn parser() -> &'static LineParser {
    static PARSER: OnceLock<LineParser> = OnceLock::new();
    PARSER.get_or_init(|| LineParser::new().expect("built-in rules must compile"))
}

fuzz_target!(|input: FuzzInput| {
    let mut m = Match::new(1, "fuzz", input.use_real_dmg);

    for body in input.bodies.iter().take(256) {
        let line = format!("L 02/21/2021 - 06:22:23: {body}");
        if let Ok(result) = parser().parse(&line) {
            let _ = m.apply(&result);
        }
    }

    // 집계 불변식
    let kills: u32 = m.players().map(|p| p.kills).sum();
    let deaths: u32 = m.players().map(|p| p.deaths).sum();
    assert_eq!(kills, deaths);
});
