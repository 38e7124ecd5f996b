#![no_main]

use integrador_mailbox::{IntegradorError, IntegradorResponseParser, ResponseParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    match IntegradorResponseParser.parse(&raw) {
        Ok(response) => {
            assert_eq!(response.raw, raw);
            assert!(raw.contains("<Integrador"));
        }
        Err(error) => assert!(matches!(error, IntegradorError::MalformedResponse(_))),
    }
});
