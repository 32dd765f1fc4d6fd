#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use httplog_monitor::parser::{section_of, AccessLogParser};

/// 퍼저용 구조적 입력 -- 형식은 맞추고 필드값만 흔든다
#[derive(Arbitrary, Debug)]
struct FuzzLine {
    client: String,
    user: String,
    timestamp: String,
    method: String,
    path: String,
    status: u16,
    size: Option<u64>,
    trailer: String,
}

fuzz_target!(|input: FuzzLine| {
    let Ok(parser) = AccessLogParser::new() else {
        return;
    };

    let size = input
        .size
        .map_or_else(|| "-".to_owned(), |size| size.to_string());
    let line = format!(
        r#"{} - {} [{}] "{} {} HTTP/1.1" {} {}{}"#,
        input.client, input.user, input.timestamp, input.method, input.path, input.status, size,
        input.trailer
    );

    if let Ok(entry) = parser.parse(&line) {
        // 섹션은 항상 경로의 첫 세그먼트이며 '/'를 포함하지 않는다
        assert_eq!(entry.section, section_of(&entry.resource));
        assert!(!entry.section.contains('/'));
    }
});
