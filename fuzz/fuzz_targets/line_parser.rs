#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use srcstat_log_pipeline::LineParser;

fn parser() -> &'static LineParser {
    static PARSER: OnceLock<LineParser> = OnceLock::new();
    PARSER.get_or_init(|| LineParser::new().expect("built-in rules must compile"))
}

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(result) = parser().parse(line) {
        assert!(result.is_consistent());
    }
});
