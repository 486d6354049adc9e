#![no_main]

use libfuzzer_sys::fuzz_target;
use srcstat_log_pipeline::collector::decode_packet;

fuzz_target!(|data: &[u8]| {
    // 임의 바이트열에서 패닉이 없어야 한다
    let _ = decode_packet(data);
});
