#![no_main]

use httplog_monitor::parser::AccessLogParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(parser) = AccessLogParser::new() else {
        return;
    };

    // 수집 루프와 같은 방식으로 디코딩: 손실 변환 후 앞뒤 공백 제거
    let line = String::from_utf8_lossy(data);

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    let _ = parser.parse(line.trim());
});
